pub mod config;
pub mod error;
pub mod precision;
pub mod types;


pub use config::*;
pub use error::*;
pub use types::*;
