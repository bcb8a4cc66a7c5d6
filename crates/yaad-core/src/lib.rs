pub mod config;
pub mod error;
pub mod normalize;
pub mod types;

pub use config::YaadConfig;
pub use error::{Result, YaadError};
pub use normalize::NameNormalizer;
pub use types::*;
