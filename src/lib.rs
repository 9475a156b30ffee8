pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod ingest;
pub mod model;
pub mod server;


pub use api::Mode;
pub use config::{AccessToken, Config, RetryPolicy};
pub use error::{Error, ErrorType, IntoResult, Result};
