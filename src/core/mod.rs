pub mod builder;
pub mod engine;
pub mod images;
pub mod outline;

pub use crate::domain::model::{FormInput, GeneratedQuote, PriceLineItem, Upload};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
