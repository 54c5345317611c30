pub mod config;
pub mod models;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod passport_validator;

pub use config::PipelineConfig;
pub use passport_validator::{PassportValidator, ScanReport};
