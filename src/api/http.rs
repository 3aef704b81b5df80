use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::auth::TokenCell;
use crate::config::AppConfig;

use super::types::{
    AnalysisResponse, ImageAnalysisRequest, ProfileResponse, RecipeRequest, SuggestionsResponse,
    UserProfile,
};
use super::{ApiError, RecipeApi};

/// Production client. Holds a shared view of the access token so sign-in
/// and sign-out take effect on the next request.
pub struct HttpApi {
    client: Client,
    base_url: Url,
    token: TokenCell,
}

impl HttpApi {
    pub fn new(config: &AppConfig, token: TokenCell) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    /// A poisoned token lock reads as "no token"; the request then fails
    /// with the backend's usual auth status.
    fn bearer(&self) -> Option<String> {
        self.token.read().ok().and_then(|token| token.clone())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.bearer() {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }
}

#[async_trait]
impl RecipeApi for HttpApi {
    async fn fetch_profile(&self) -> Result<Option<UserProfile>, ApiError> {
        let request_id = Uuid::new_v4();
        let url = self.endpoint("/api/user-profile")?;
        debug!(%request_id, %url, "fetching user profile");

        let response = self.authorize(self.client.get(url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%request_id, %status, "profile request failed");
            return Err(ApiError::Status(status.as_u16()));
        }

        let body: ProfileResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        debug!(%request_id, has_profile = body.profile.is_some(), "profile fetched");
        Ok(body.profile)
    }

    async fn suggest_recipes(&self, request: &RecipeRequest) -> Result<String, ApiError> {
        let request_id = Uuid::new_v4();
        let url = self.endpoint("/api/ai-recipe-suggestions")?;
        debug!(%request_id, %url, ingredients = request.ingredients.len(), "requesting recipe suggestions");

        let response = self
            .authorize(self.client.post(url))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%request_id, %status, "suggestions request failed");
            return Err(ApiError::Status(status.as_u16()));
        }

        let body: SuggestionsResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(body.suggestions)
    }

    async fn analyze_image(&self, request: &ImageAnalysisRequest) -> Result<String, ApiError> {
        let request_id = Uuid::new_v4();
        let url = self.endpoint("/api/image-to-recipe")?;
        // The payload is a full data URL; log its size, never its content.
        debug!(%request_id, %url, payload_chars = request.image_base64.len(), "requesting image analysis");

        let response = self
            .authorize(self.client.post(url))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%request_id, %status, "image analysis request failed");
            return Err(ApiError::Status(status.as_u16()));
        }

        let body: AnalysisResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(body.analysis)
    }
}
