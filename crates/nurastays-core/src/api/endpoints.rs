//! Typed wrappers for the backend routes.
//!
//! Paths are relative to the configured base URL and keep the backend's
//! trailing slashes.

use reqwest::Method;
use tracing::debug;

use super::request::{FilePart, MultipartBody};
use super::{ApiClient, ApiError};
use crate::models::{
    AdminUser, ContactSubmission, DashboardStats, Lead, LeadFilter, LeadUpdate, LoginRequest,
    LoginResponse, Page, Property, PropertyFilter, PropertyForm, PropertyImage, Review,
    ReviewFilter, ReviewForm, ReviewStats, TeamMember, TeamMemberForm, VerifyResponse,
};

/// Form field used for property image uploads
const PROPERTY_IMAGE_FIELD: &str = "images";

/// Form field used for the team member photo
const TEAM_PHOTO_FIELD: &str = "photo";

impl ApiClient {
    // ===== Public catalog =====

    pub async fn properties(&self, filter: &PropertyFilter) -> Result<Page<Property>, ApiError> {
        self.get_with("properties/", filter.to_params()).await
    }

    pub async fn featured_properties(&self) -> Result<Vec<Property>, ApiError> {
        let page: Page<Property> = self.get("properties/featured/").await?;
        Ok(page.into_results())
    }

    pub async fn property_by_slug(&self, slug: &str) -> Result<Property, ApiError> {
        self.get(&format!("properties/{}/", slug)).await
    }

    pub async fn reviews(&self, filter: &ReviewFilter) -> Result<Page<Review>, ApiError> {
        self.get_with("reviews/", filter.to_params()).await
    }

    pub async fn reviews_for_property(&self, property_id: i64) -> Result<Vec<Review>, ApiError> {
        let page: Page<Review> = self
            .get(&format!("reviews/property/{}/", property_id))
            .await?;
        Ok(page.into_results())
    }

    pub async fn review_stats(&self) -> Result<ReviewStats, ApiError> {
        self.get("reviews/stats/").await
    }

    pub async fn team(&self) -> Result<Vec<TeamMember>, ApiError> {
        let page: Page<TeamMember> = self.get("team/").await?;
        Ok(page.into_results())
    }

    /// Submit the public contact form. The backend's acknowledgement is
    /// returned as-is.
    pub async fn submit_contact(
        &self,
        submission: &ContactSubmission,
    ) -> Result<serde_json::Value, ApiError> {
        self.post("contact/", submission).await
    }

    // ===== Admin auth =====

    /// Exchange credentials for a token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("admin/login/", &body).await
    }

    pub async fn logout(&self, refresh: Option<&str>) -> Result<(), ApiError> {
        let _: Option<serde_json::Value> = self
            .post("admin/logout/", &serde_json::json!({ "refresh": refresh }))
            .await?;
        Ok(())
    }

    pub async fn verify(&self) -> Result<AdminUser, ApiError> {
        let response: VerifyResponse = self.get("admin/verify/").await?;
        Ok(response.user)
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("admin/dashboard/stats/").await
    }

    // ===== Admin properties =====

    pub async fn admin_properties(
        &self,
        filter: Option<&PropertyFilter>,
    ) -> Result<Page<Property>, ApiError> {
        let params = filter.map(PropertyFilter::to_params).unwrap_or_default();
        self.get_with("admin/properties/", params).await
    }

    pub async fn create_property(&self, form: &PropertyForm) -> Result<Property, ApiError> {
        self.post("admin/properties/", form).await
    }

    pub async fn update_property(&self, id: i64, form: &PropertyForm) -> Result<Property, ApiError> {
        self.put(&format!("admin/properties/{}/", id), form).await
    }

    /// Flip a listing's visibility, keeping every other field as it is
    pub async fn toggle_property_active(&self, property: &Property) -> Result<Property, ApiError> {
        let mut form = PropertyForm::from(property);
        form.is_active = !property.is_active;
        self.update_property(property.id, &form).await
    }

    pub async fn delete_property(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("admin/properties/{}/", id)).await
    }

    /// Upload one or more gallery images as `multipart/form-data`
    pub async fn upload_property_images(
        &self,
        property_id: i64,
        files: Vec<FilePart>,
    ) -> Result<Vec<PropertyImage>, ApiError> {
        if files.is_empty() {
            return Err(ApiError::InvalidRequest("No images to upload".into()));
        }
        debug!(property_id, count = files.len(), "Uploading property images");

        let body = files.into_iter().fold(MultipartBody::new(), |body, mut file| {
            file.field = PROPERTY_IMAGE_FIELD.to_string();
            body.file(file)
        });
        let page: Page<PropertyImage> = self
            .send_multipart(
                Method::POST,
                &format!("admin/properties/{}/images/", property_id),
                body,
            )
            .await?;
        Ok(page.into_results())
    }

    pub async fn delete_property_image(&self, property_id: i64, image_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("admin/properties/{}/images/{}/", property_id, image_id))
            .await
    }

    // ===== Admin reviews =====

    pub async fn admin_reviews(&self, filter: Option<&ReviewFilter>) -> Result<Page<Review>, ApiError> {
        let params = filter.map(ReviewFilter::to_params).unwrap_or_default();
        self.get_with("admin/reviews/", params).await
    }

    pub async fn create_review(&self, form: &ReviewForm) -> Result<Review, ApiError> {
        self.post("admin/reviews/", form).await
    }

    pub async fn update_review(&self, id: i64, form: &ReviewForm) -> Result<Review, ApiError> {
        self.put(&format!("admin/reviews/{}/", id), form).await
    }

    pub async fn toggle_review_approved(&self, review: &Review) -> Result<Review, ApiError> {
        let mut form = ReviewForm::from(review);
        form.is_approved = !review.is_approved;
        self.update_review(review.id, &form).await
    }

    pub async fn delete_review(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("admin/reviews/{}/", id)).await
    }

    // ===== Admin team =====

    pub async fn admin_team(&self) -> Result<Vec<TeamMember>, ApiError> {
        let page: Page<TeamMember> = self.get("admin/team/").await?;
        Ok(page.into_results())
    }

    pub async fn create_team_member(&self, form: &TeamMemberForm) -> Result<TeamMember, ApiError> {
        self.send_multipart(Method::POST, "admin/team/", team_member_body(form)?)
            .await
    }

    pub async fn update_team_member(
        &self,
        id: i64,
        form: &TeamMemberForm,
    ) -> Result<TeamMember, ApiError> {
        self.send_multipart(
            Method::PUT,
            &format!("admin/team/{}/", id),
            team_member_body(form)?,
        )
        .await
    }

    pub async fn delete_team_member(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("admin/team/{}/", id)).await
    }

    // ===== Admin leads =====

    pub async fn admin_leads(&self, filter: &LeadFilter) -> Result<Page<Lead>, ApiError> {
        self.get_with("admin/leads/", filter.to_params()).await
    }

    pub async fn update_lead(&self, id: i64, update: &LeadUpdate) -> Result<Lead, ApiError> {
        self.patch(&format!("admin/leads/{}/", id), update).await
    }

    /// Mark a lead read if it was unread, and vice versa
    pub async fn toggle_lead_read(&self, lead: &Lead) -> Result<Lead, ApiError> {
        self.update_lead(lead.id, &LeadUpdate::read(!lead.is_read))
            .await
    }

    pub async fn delete_lead(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("admin/leads/{}/", id)).await
    }
}

/// Team members go up as multipart; social links travel as a JSON string.
fn team_member_body(form: &TeamMemberForm) -> Result<MultipartBody, ApiError> {
    let social_links = serde_json::to_string(&form.social_links.normalized())
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode social links: {}", e)))?;

    let mut body = MultipartBody::new()
        .text("name", form.name.clone())
        .text("role", form.role.clone())
        .text("bio", form.bio.clone())
        .text("order_index", form.order_index.to_string())
        .text("social_links", social_links);

    if let Some(ref photo) = form.photo {
        body = body.file(FilePart::new(
            TEAM_PHOTO_FIELD,
            photo.file_name.clone(),
            photo.mime.clone(),
            photo.bytes.clone(),
        ));
    }
    Ok(body)
}
