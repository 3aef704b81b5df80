use std::path::{Path, PathBuf};

use tracing::error;

/// Shown verbatim for any failed analysis, whatever the cause.
pub const ANALYSIS_FAILED: &str = "Failed to analyze image. Please try again.";

/// State behind the Image to Recipe tab.
#[derive(Debug, Default)]
pub struct ImagePanel {
    selected_image: Option<PathBuf>,
    analysis: Option<String>,
    loading: bool,
}

impl ImagePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_image(&self) -> Option<&Path> {
        self.selected_image.as_deref()
    }

    pub fn analysis(&self) -> Option<&str> {
        self.analysis.as_deref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Records a picked image and marks the analysis as in flight.
    pub fn begin_analysis(&mut self, path: PathBuf) {
        self.selected_image = Some(path);
        self.loading = true;
    }

    /// Records the outcome of an analysis. Failures collapse to the
    /// fixed message; the cause goes to the log only.
    pub fn finish_analysis(&mut self, result: Result<String, String>) {
        self.loading = false;
        self.analysis = Some(match result {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "image analysis failed");
                ANALYSIS_FAILED.to_string()
            }
        });
    }
}
