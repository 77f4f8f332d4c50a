mod app;
pub mod args;
pub mod categorize;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod store;
mod utils;

#[cfg(test)]
mod test;

pub use app::{App, CategorizationStatus};
pub use config::{Config, InferenceSettings};
pub use error::{Error, ErrorType, Result};
