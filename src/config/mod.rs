pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::{QuoteError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, validate_positive_number, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

/// 預設工作目錄：系統暫存目錄下的 trip-quote
pub fn default_work_dir() -> String {
    std::env::temp_dir()
        .join("trip-quote")
        .to_string_lossy()
        .into_owned()
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "trip-quote")]
#[command(about = "Serve the trip quote form and generate Word quote documents")]
pub struct CliConfig {
    #[arg(long, default_value = "127.0.0.1:8501")]
    pub bind: String,

    /// Directory for per-request spool files
    #[arg(long, default_value_t = default_work_dir())]
    pub work_dir: String,

    #[arg(long, default_value = "20")]
    pub max_upload_mb: usize,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn bind_addr(&self) -> &str {
        &self.bind
    }

    fn work_dir(&self) -> &str {
        &self.work_dir
    }

    fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.bind
            .parse::<std::net::SocketAddr>()
            .map_err(|e| QuoteError::ConfigValidationError {
                field: "bind".to_string(),
                message: format!("Invalid socket address '{}': {}", self.bind, e),
            })?;
        validate_path("work_dir", &self.work_dir)?;
        validate_positive_number("max_upload_mb", self.max_upload_mb, 1)?;
        Ok(())
    }
}
