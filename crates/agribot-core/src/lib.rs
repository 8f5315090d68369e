pub mod config;
pub mod error;
pub mod types;

pub use config::AgribotConfig;
pub use error::{AgribotError, Result};
pub use types::*;
