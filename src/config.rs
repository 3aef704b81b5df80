use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        // Get backend base URL from env or use default
        let base_url = env::var("SMART_RECIPE_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // Get request timeout from env or use default
        let request_timeout = env::var("SMART_RECIPE_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        // Get data directory from env or use default
        let data_dir = env::var("SMART_RECIPE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        Self {
            base_url,
            request_timeout,
            data_dir,
        }
    }
}
