//! Access to the Teller API.
//!
//! The `Upstream` trait is the seam between ingestion and the network. `TellerClient` implements it
//! with a mutual-TLS `reqwest` client, and `TestUpstream` implements it with in-memory data so that
//! the app can run top-to-bottom without Teller.

mod teller;
mod test_upstream;
pub mod tls;

use crate::{Config, Result};
use std::sync::Arc;
use tracing::info;

pub use teller::TellerClient;
pub use test_upstream::TestUpstream;

/// An authenticated source of raw response bodies.
#[async_trait::async_trait]
pub trait Upstream: Send + Sync {
    /// Issues a GET to `url` and returns the full response body.
    ///
    /// # Errors
    /// - `Request` if `url` is malformed.
    /// - `Transport` if the connection fails, times out or the body cannot be read.
    /// - `Status` if the upstream answers with a non-success status.
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// Whether we talk to Teller or to in-memory seed data.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Teller,
    Test,
}

impl Mode {
    /// Returns `Mode::Test` if `PEPPERMINT_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Teller`.
    pub fn from_env() -> Self {
        match std::env::var("PEPPERMINT_IN_TEST_MODE") {
            Ok(val) if !val.is_empty() => Mode::Test,
            _ => Mode::Teller,
        }
    }
}

/// Constructs the upstream for `mode`. In `Mode::Teller` this loads the client certificate and key,
/// which happens once per process.
pub async fn upstream(config: &Config, mode: Mode) -> Result<Arc<dyn Upstream>> {
    match mode {
        Mode::Teller => {
            let client =
                tls::client(config.cert_path(), config.key_path(), config.timeout()).await?;
            Ok(Arc::new(TellerClient::new(
                client,
                config.access_token().clone(),
                config.retry(),
            )))
        }
        Mode::Test => {
            info!("Running in test mode against seed data, Teller will not be contacted");
            Ok(Arc::new(TestUpstream::seeded(config.api_url())))
        }
    }
}
