pub mod config;
pub mod error;
pub mod logging;
pub mod tables;
pub mod validation;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use tables::*;
pub use validation::*;
