use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::types::{ImageAnalysisRequest, RecipeRequest, UserProfile};
use super::{ApiError, RecipeApi};

#[derive(Clone)]
enum MockOutcome<T> {
    Ok(T),
    Status(u16),
}

impl<T: Clone> MockOutcome<T> {
    fn to_result(&self) -> Result<T, ApiError> {
        match self {
            MockOutcome::Ok(value) => Ok(value.clone()),
            MockOutcome::Status(status) => Err(ApiError::Status(*status)),
        }
    }
}

/// In-memory API for tests: programmable responses plus call recording.
///
/// Unprogrammed AI endpoints fail with HTTP 500, so a test asserting
/// "no request was made" cannot pass while one quietly succeeds.
pub struct MockApi {
    profile: MockOutcome<Option<UserProfile>>,
    suggestions: MockOutcome<String>,
    analysis: MockOutcome<String>,
    profile_calls: AtomicUsize,
    suggest_calls: AtomicUsize,
    analyze_calls: AtomicUsize,
    last_recipe_request: Mutex<Option<RecipeRequest>>,
    last_image_request: Mutex<Option<ImageAnalysisRequest>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            profile: MockOutcome::Ok(None),
            suggestions: MockOutcome::Status(500),
            analysis: MockOutcome::Status(500),
            profile_calls: AtomicUsize::new(0),
            suggest_calls: AtomicUsize::new(0),
            analyze_calls: AtomicUsize::new(0),
            last_recipe_request: Mutex::new(None),
            last_image_request: Mutex::new(None),
        }
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = MockOutcome::Ok(Some(profile));
        self
    }

    pub fn with_missing_profile(mut self) -> Self {
        self.profile = MockOutcome::Ok(None);
        self
    }

    pub fn with_profile_status(mut self, status: u16) -> Self {
        self.profile = MockOutcome::Status(status);
        self
    }

    pub fn with_suggestions(mut self, text: &str) -> Self {
        self.suggestions = MockOutcome::Ok(text.to_string());
        self
    }

    pub fn with_suggestions_status(mut self, status: u16) -> Self {
        self.suggestions = MockOutcome::Status(status);
        self
    }

    pub fn with_analysis(mut self, text: &str) -> Self {
        self.analysis = MockOutcome::Ok(text.to_string());
        self
    }

    pub fn with_analysis_status(mut self, status: u16) -> Self {
        self.analysis = MockOutcome::Status(status);
        self
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn suggest_calls(&self) -> usize {
        self.suggest_calls.load(Ordering::SeqCst)
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn last_recipe_request(&self) -> Option<RecipeRequest> {
        self.last_recipe_request.lock().ok().and_then(|g| g.clone())
    }

    pub fn last_image_request(&self) -> Option<ImageAnalysisRequest> {
        self.last_image_request.lock().ok().and_then(|g| g.clone())
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecipeApi for MockApi {
    async fn fetch_profile(&self) -> Result<Option<UserProfile>, ApiError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.profile.to_result()
    }

    async fn suggest_recipes(&self, request: &RecipeRequest) -> Result<String, ApiError> {
        self.suggest_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_recipe_request.lock() {
            *guard = Some(request.clone());
        }
        self.suggestions.to_result()
    }

    async fn analyze_image(&self, request: &ImageAnalysisRequest) -> Result<String, ApiError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_image_request.lock() {
            *guard = Some(request.clone());
        }
        self.analysis.to_result()
    }
}
