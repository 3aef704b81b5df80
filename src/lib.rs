pub mod api;
pub mod auth;
pub mod commands;
pub mod config;
pub mod picker;
pub mod screen;

// Re-export commonly used items
pub use api::{HttpApi, MockApi, RecipeApi};
pub use auth::{AuthSession, FileAuth};
pub use config::AppConfig;
pub use screen::Screen;
