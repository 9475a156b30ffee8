//! Runtime configuration.
//!
//! Settings come from the command line with environment-variable fallbacks (see `args::Common`).
//! The `Config` object is built once at startup, validated, and is read-only afterwards.

use crate::args::Common;
use crate::error::{Error, ErrorType, IntoResult};
use crate::Result;
use anyhow::{anyhow, Context};
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.teller.io";
pub const DEFAULT_CERT: &str = "certs/certificate.pem";
pub const DEFAULT_KEY: &str = "certs/private_key.pem";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;
pub const DEFAULT_WORKERS: usize = 4;

const ACCOUNTS: &str = "accounts";

/// The Teller access token. It is sent as the HTTP Basic username and must never show up in logs
/// or error messages, so both `Debug` and `Display` are redacted.
#[derive(Clone, Eq, PartialEq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Fails with a `Config` error if `token` is empty or only whitespace.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::new(
                ErrorType::Config,
                anyhow!("The access token is empty, set ACCESS_TOKEN or pass --access-token"),
            ));
        }
        Ok(Self(token))
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(********)")
    }
}

impl Display for AccessToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("********")
    }
}

/// How many times a 5xx response is retried and how long to wait before the first retry. The
/// wait doubles after each attempt.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// A policy that never retries.
    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// The delay before retry number `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_RETRIES,
            Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        )
    }
}

/// The `Config` object holds the credential context (access token, client certificate and key
/// paths) along with the settings that shape an ingestion pass.
#[derive(Debug, Clone)]
pub struct Config {
    access_token: AccessToken,
    cert_path: PathBuf,
    key_path: PathBuf,
    api_url: Url,
    timeout: Duration,
    retry: RetryPolicy,
    workers: usize,
}

impl Config {
    /// Creates a `Config` with default certificate paths and settings.
    ///
    /// # Errors
    /// - `Config` if the token is empty or `api_url` is not an absolute URL.
    pub fn new(access_token: impl Into<String>, api_url: &str) -> Result<Self> {
        Ok(Self {
            access_token: AccessToken::new(access_token)?,
            cert_path: PathBuf::from(DEFAULT_CERT),
            key_path: PathBuf::from(DEFAULT_KEY),
            api_url: parse_api_url(api_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            workers: DEFAULT_WORKERS,
        })
    }

    /// Builds and validates a `Config` from the command line arguments that all subcommands share.
    pub fn load(common: &Common) -> Result<Self> {
        let token = common.access_token().unwrap_or_default();
        let config = Self::new(token, common.api_url())?
            .with_certificate(common.cert(), common.key())
            .with_timeout(Duration::from_secs(common.timeout_secs()))
            .with_retry(RetryPolicy::new(
                common.max_retries(),
                Duration::from_millis(common.retry_backoff_ms()),
            ))
            .with_workers(common.workers());
        if config.timeout.is_zero() {
            return Err(Error::new(
                ErrorType::Config,
                anyhow!("The request timeout must be greater than zero"),
            ));
        }
        Ok(config)
    }

    pub fn with_certificate(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.cert_path = cert.into();
        self.key_path = key.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the number of account feeds fetched concurrently. Values below 1 are raised to 1.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn cert_path(&self) -> &Path {
        &self.cert_path
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// The API base URL, always ending in `/`.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// The accounts-listing endpoint, `{api_url}/accounts`.
    pub fn accounts_url(&self) -> Url {
        // Joining a plain relative segment onto a base ending in `/` cannot fail.
        self.api_url
            .join(ACCOUNTS)
            .unwrap_or_else(|_| self.api_url.clone())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

/// Parses the API base URL and makes sure its path ends in `/` so that relative links join onto it
/// rather than replacing its last segment.
fn parse_api_url(s: &str) -> Result<Url> {
    let mut url = Url::parse(s)
        .with_context(|| format!("Invalid API URL '{s}'"))
        .pub_result(ErrorType::Config)?;
    if url.cannot_be_a_base() {
        return Err(Error::new(
            ErrorType::Config,
            anyhow!("The API URL '{s}' cannot be used as a base URL"),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
