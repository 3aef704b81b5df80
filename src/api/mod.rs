//! Typed client for the Smart Recipe backend.

use async_trait::async_trait;
use thiserror::Error;

pub mod http;
pub mod mock;
pub mod types;

pub use http::HttpApi;
pub use mock::MockApi;
pub use types::{ImageAnalysisRequest, RecipeRequest, UserProfile};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned HTTP {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// The three backend endpoints the screen talks to, enabling mockability
/// in tests.
#[async_trait]
pub trait RecipeApi: Send + Sync {
    /// `GET /api/user-profile`. `None` means the account exists but has no
    /// profile record yet.
    async fn fetch_profile(&self) -> Result<Option<UserProfile>, ApiError>;

    /// `POST /api/ai-recipe-suggestions`.
    async fn suggest_recipes(&self, request: &RecipeRequest) -> Result<String, ApiError>;

    /// `POST /api/image-to-recipe`.
    async fn analyze_image(&self, request: &ImageAnalysisRequest) -> Result<String, ApiError>;
}
