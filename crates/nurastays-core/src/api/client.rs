//! API client for the Nura Stays REST backend.
//!
//! `ApiClient` attaches the stored access token to every request and, when
//! the backend answers 401, refreshes the access token once and resends the
//! request once. If the refresh itself fails both tokens are cleared and the
//! login redirect hook fires.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::request::{Body, MultipartBody, PendingRequest, RequestOptions};
use super::ApiError;
use crate::auth::{LogRedirect, LoginRedirect, TokenStore};
use crate::config::Config;
use crate::models::{QueryParams, RefreshRequest, RefreshResponse};

/// Token refresh route, relative to the base URL
pub const REFRESH_PATH: &str = "admin/token/refresh/";

/// API client for the Nura Stays backend.
/// Clone is cheap - the connection pool, token store and redirect hook are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    login_path: String,
    tokens: Arc<dyn TokenStore>,
    redirect: Arc<dyn LoginRedirect>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("login_path", &self.login_path)
            .field("authenticated", &self.tokens.has_tokens())
            .finish()
    }
}

impl ApiClient {
    /// Create a client from configuration. The redirect hook defaults to
    /// logging; see `with_redirect`.
    pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let base_url = config
            .base_url()
            .map_err(|e| ApiError::InvalidRequest(format!("{:#}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            login_path: config.login_path.clone(),
            tokens,
            redirect: Arc::new(LogRedirect),
        })
    }

    /// Replace the hook fired on unrecoverable authentication failure
    pub fn with_redirect(mut self, redirect: Arc<dyn LoginRedirect>) -> Self {
        self.redirect = redirect;
        self
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid path {}: {}", path, e)))
    }

    // ===== Request pipeline =====

    /// Issue a request and decode the response body.
    ///
    /// A 401 is answered with at most one refresh-and-resend; every other
    /// failure is returned unchanged.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(PendingRequest::new(method, path, options))
            .await?;
        Self::decode(response, path).await
    }

    async fn execute(&self, mut pending: PendingRequest) -> Result<Response, ApiError> {
        let access = self.tokens.get_access().map_err(token_store_error)?;

        match self.send(&pending, access.as_deref()).await {
            Err(ApiError::Unauthorized) if !pending.retried => {
                pending.retried = true;
                debug!(method = %pending.method, path = %pending.path, "401 received, attempting token refresh");

                let access = self.refresh_access().await?;
                self.send(&pending, Some(&access)).await
            }
            outcome => outcome,
        }
    }

    /// One attempt: build, send and check the status.
    async fn send(&self, pending: &PendingRequest, access: Option<&str>) -> Result<Response, ApiError> {
        let url = self.url(&pending.path)?;

        let mut headers = pending.options.headers.clone();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = access {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidRequest("Access token is not a valid header value".into()))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let mut builder = self
            .client
            .request(pending.method.clone(), url)
            .headers(headers);
        if !pending.options.params.is_empty() {
            builder = builder.query(&pending.options.params);
        }
        builder = match pending.options.body {
            Body::Empty => builder,
            Body::Json(ref value) => builder.json(value),
            Body::Multipart(ref body) => builder.multipart(body.to_form()?),
        };

        debug!(
            method = %pending.method,
            path = %pending.path,
            authenticated = access.is_some(),
            retried = pending.retried,
            "Sending request"
        );
        let response = builder.send().await?;
        Self::check_response(response).await
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Without a refresh token this fails straight away and leaves storage
    /// alone. A failed refresh clears both tokens and fires the redirect hook.
    async fn refresh_access(&self) -> Result<String, ApiError> {
        let Some(refresh) = self.tokens.get_refresh().map_err(token_store_error)? else {
            debug!("No refresh token stored, not refreshing");
            return Err(ApiError::Unauthorized);
        };

        match self.call_refresh(&refresh).await {
            Ok(access) => {
                if let Err(e) = self.tokens.set_access(&access) {
                    warn!(error = %e, "Failed to persist refreshed access token");
                }
                debug!("Access token refreshed");
                Ok(access)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                if let Err(e) = self.tokens.clear() {
                    warn!(error = %e, "Failed to clear stored tokens");
                }
                self.redirect.redirect(&self.login_path);
                Err(ApiError::Unauthorized)
            }
        }
    }

    async fn call_refresh(&self, refresh: &str) -> Result<String, ApiError> {
        let response: RefreshResponse = self
            .post_unauthenticated(REFRESH_PATH, &RefreshRequest { refresh })
            .await?;
        Ok(response.access)
    }

    /// POST outside the token pipeline: no bearer header, no refresh on 401.
    /// Only the refresh call goes through here.
    async fn post_unauthenticated<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .post(self.url(path)?)
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Self::decode(response, path).await
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Decode a JSON body. An empty body (204, bare DELETE) decodes as JSON
    /// `null`, so `()` and `Option<_>` targets work.
    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e)))
    }

    // ===== Typed helpers =====

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, RequestOptions::new()).await
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        params: QueryParams,
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, RequestOptions::new().params(params))
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, RequestOptions::new().json(body)?)
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::PUT, path, RequestOptions::new().json(body)?)
            .await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::PATCH, path, RequestOptions::new().json(body)?)
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let _: Option<serde_json::Value> = self
            .request(Method::DELETE, path, RequestOptions::new())
            .await?;
        Ok(())
    }

    /// Send a `multipart/form-data` body (image and photo uploads)
    pub async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: MultipartBody,
    ) -> Result<T, ApiError> {
        self.request(method, path, RequestOptions::new().multipart(body))
            .await
    }
}

fn token_store_error(e: anyhow::Error) -> ApiError {
    ApiError::TokenStore(format!("{:#}", e))
}
