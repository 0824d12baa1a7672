pub mod config;
pub mod errors;
pub mod logging;

pub use config::{ApiConfig, ConsoleConfig, PreviewConfig};
pub use errors::*;
pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
