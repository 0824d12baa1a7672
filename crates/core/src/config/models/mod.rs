pub mod app_config;
pub mod console;

// Re-export main types for easier imports
pub use app_config::ConsoleConfig;
pub use console::{ApiConfig, PreviewConfig};
