use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::AdminUser;

/// The signed-in admin, derived from the stored tokens.
pub struct SessionManager {
    api: ApiClient,
    user: Option<AdminUser>,
}

impl SessionManager {
    pub fn new(api: ApiClient) -> Self {
        Self { api, user: None }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn user(&self) -> Option<&AdminUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Re-establish the session at start-up.
    ///
    /// With no stored access token nothing is sent. Otherwise the backend
    /// verifies the token; on any failure both tokens are dropped.
    pub async fn restore(&mut self) -> Option<&AdminUser> {
        if !self.api.tokens().has_tokens() {
            debug!("No stored access token, starting signed out");
            self.user = None;
            return None;
        }

        match self.api.verify().await {
            Ok(user) => {
                info!(user = %user.display_name(), "Session restored");
                self.user = Some(user);
            }
            Err(e) => {
                warn!(error = %e, "Stored session could not be verified");
                self.clear_tokens();
                self.user = None;
            }
        }
        self.user.as_ref()
    }

    /// Log in and store the returned token pair
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&AdminUser, ApiError> {
        let response = self.api.login(email, password).await?;
        self.api
            .tokens()
            .set_tokens(&response.tokens())
            .map_err(|e| ApiError::TokenStore(format!("{:#}", e)))?;

        let user = match response.user {
            Some(user) => user,
            None => self.api.verify().await?,
        };
        info!(user = %user.display_name(), "Logged in");
        Ok(&*self.user.insert(user))
    }

    /// Log out. The backend call is best effort; local tokens are always
    /// cleared.
    pub async fn logout(&mut self) {
        let refresh = self.api.tokens().get_refresh().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read refresh token for logout");
            None
        });
        if let Err(e) = self.api.logout(refresh.as_deref()).await {
            debug!(error = %e, "Ignoring logout error");
        }
        self.clear_tokens();
        self.user = None;
        info!("Logged out");
    }

    fn clear_tokens(&self) {
        if let Err(e) = self.api.tokens().clear() {
            warn!(error = %e, "Failed to clear stored tokens");
        }
    }
}
