//! Implements the `Upstream` trait against the Teller API.

use crate::api::Upstream;
use crate::config::{AccessToken, RetryPolicy};
use crate::error::{Error, ErrorType, IntoResult};
use crate::Result;
use anyhow::{anyhow, Context};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{trace, warn};
use url::Url;

/// Fetches Teller resources using HTTP Basic auth, with the access token as the username and an
/// empty password. The `reqwest::Client` is expected to carry the mutual-TLS identity, see
/// `tls::client`.
pub struct TellerClient {
    client: Client,
    access_token: AccessToken,
    retry: RetryPolicy,
}

impl TellerClient {
    pub fn new(client: Client, access_token: AccessToken, retry: RetryPolicy) -> Self {
        Self {
            client,
            access_token,
            retry,
        }
    }
}

#[async_trait::async_trait]
impl Upstream for TellerClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(url)
            .with_context(|| format!("Invalid URL '{url}'"))
            .pub_result(ErrorType::Request)?;

        let mut attempt = 0;
        loop {
            trace!("GET {url}");
            let response = self
                .client
                .get(url.clone())
                .header(CONTENT_TYPE, "application/json")
                .basic_auth(self.access_token.expose(), None::<&str>)
                .send()
                .await
                .with_context(|| format!("Request to {url} failed"))
                .pub_result(ErrorType::Transport)?;

            let status = response.status();
            if status.is_server_error() && attempt < self.retry.max_retries() {
                let delay = self.retry.delay(attempt);
                warn!("{url} responded with {status}, retrying in {delay:?}");
                drop(response);
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }
            if !status.is_success() {
                return Err(Error::new(
                    ErrorType::Status,
                    anyhow!("{url} responded with {status}"),
                ));
            }

            // Consuming the response hands the connection back to the pool.
            let body = response
                .bytes()
                .await
                .with_context(|| format!("Unable to read the response body from {url}"))
                .pub_result(ErrorType::Transport)?;
            return Ok(body.to_vec());
        }
    }
}
