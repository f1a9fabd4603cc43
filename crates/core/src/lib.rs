pub mod config;
pub mod document;
pub mod error;
pub mod knowledge;

pub use config::Config;
pub use document::*;
pub use error::*;
pub use knowledge::*;
