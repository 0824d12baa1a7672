pub mod models;

pub use models::{ApiConfig, ConsoleConfig, PreviewConfig};
