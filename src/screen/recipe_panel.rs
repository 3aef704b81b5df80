use tracing::error;

use crate::api::RecipeRequest;

/// Shown verbatim for any failed generation, whatever the cause.
pub const GENERATION_FAILED: &str = "Failed to generate recipe suggestions. Please try again.";

/// State behind the Recipe Generator tab.
#[derive(Debug, Default)]
pub struct RecipePanel {
    pub ingredients: String,
    pub preferences: String,
    loading: bool,
    suggestions: Option<String>,
}

/// Splits a comma-separated ingredient list, trimming each entry. Empty
/// entries are kept, so a trailing comma yields a trailing "".
pub fn parse_ingredients(input: &str) -> Vec<String> {
    input.split(',').map(|i| i.trim().to_string()).collect()
}

impl RecipePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn suggestions(&self) -> Option<&str> {
        self.suggestions.as_deref()
    }

    pub fn set_ingredients(&mut self, text: &str) {
        self.ingredients = text.to_string();
    }

    pub fn set_preferences(&mut self, text: &str) {
        self.preferences = text.to_string();
    }

    /// Starts a generation, returning the request to send. Blank
    /// ingredient text and an in-flight generation both return None
    /// without touching any state.
    pub fn begin_generate(&mut self) -> Option<RecipeRequest> {
        if self.loading || self.ingredients.trim().is_empty() {
            return None;
        }
        self.loading = true;
        Some(RecipeRequest {
            ingredients: parse_ingredients(&self.ingredients),
            preferences: self.preferences.clone(),
        })
    }

    /// Records the outcome of a generation. Failures collapse to the
    /// fixed message; the cause goes to the log only.
    pub fn finish_generate(&mut self, result: Result<String, String>) {
        self.loading = false;
        self.suggestions = Some(match result {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "recipe generation failed");
                GENERATION_FAILED.to_string()
            }
        });
    }
}
