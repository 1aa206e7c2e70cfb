pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{builder::build_quote, engine::QuoteEngine};
pub use crate::domain::model::{FormInput, GeneratedQuote, Upload};
pub use crate::utils::error::{QuoteError, Result};
