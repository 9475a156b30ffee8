//! Command handlers for the peppermint CLI.

mod fetch;
mod serve;

use crate::error::{ErrorType, IntoResult};
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use tracing::info;

pub use fetch::fetch;
pub use serve::serve;

/// The output type for a command: a message for the user and, optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!`.
    pub fn print(&self) {
        info!("{}", self.message);
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to stdout, so
    /// that it can be piped while logs go to stderr.
    pub fn print_json(&self, pretty: bool) -> Result<()> {
        self.print();
        if let Some(structure) = self.structure() {
            let json = if pretty {
                serde_json::to_string_pretty(structure)
            } else {
                serde_json::to_string(structure)
            }
            .context("Unable to serialize command output")
            .pub_result(ErrorType::Service)?;
            println!("{json}");
        }
        Ok(())
    }
}
