pub mod error;
pub mod logger;
pub mod processes;
pub mod validation;
