//! These structs provide the CLI interface for the peppermint CLI.

use crate::config::{
    DEFAULT_API_URL, DEFAULT_CERT, DEFAULT_KEY, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BACKOFF_MS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS,
};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// peppermint: pulls your bank transactions from Teller.
///
/// Teller (https://teller.io) requires mutual TLS, so you need the client certificate and private
/// key that Teller issued for your application, plus an access token for an enrolled user. The
/// token is sent as the HTTP Basic username.
///
/// Only checking and credit card accounts are considered, and only posted transactions are kept.
///
/// Set PEPPERMINT_IN_TEST_MODE to any non-empty value to run against built-in seed data instead of
/// the Teller API.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run one ingestion pass and print the posted transactions as a JSON array to stdout.
    Fetch(FetchArgs),
    /// Run an ingestion pass, then serve the transactions over HTTP.
    ///
    /// GET /transactions returns the last successful ingestion. POST /transactions/refresh runs a
    /// new pass and returns its result. Until a pass succeeds, GET /transactions answers 503.
    Serve(ServeArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The Teller access token of the enrolled user.
    #[arg(long, env = "ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// The PEM client certificate issued by Teller.
    #[arg(long, env = "PEPPERMINT_CERT", default_value = DEFAULT_CERT)]
    cert: PathBuf,

    /// The PEM private key matching --cert.
    #[arg(long, env = "PEPPERMINT_KEY", default_value = DEFAULT_KEY)]
    key: PathBuf,

    /// The base URL of the Teller API.
    #[arg(long, env = "PEPPERMINT_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// How many times a 5xx response from Teller is retried before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Milliseconds to wait before the first retry. Doubles with each retry.
    #[arg(long, default_value_t = DEFAULT_RETRY_BACKOFF_MS)]
    retry_backoff_ms: u64,

    /// How many account transaction feeds are fetched at the same time.
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,
}

impl Common {
    pub fn new(log_level: LevelFilter, access_token: Option<String>) -> Self {
        Self {
            log_level,
            access_token,
            cert: PathBuf::from(DEFAULT_CERT),
            key: PathBuf::from(DEFAULT_KEY),
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn cert(&self) -> &Path {
        &self.cert
    }

    pub fn key(&self) -> &Path {
        &self.key
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_backoff_ms(&self) -> u64 {
        self.retry_backoff_ms
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

/// Args for the `peppermint fetch` command.
#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

impl FetchArgs {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }
}

/// Args for the `peppermint serve` command.
#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    /// The address to listen on.
    #[arg(long, env = "PEPPERMINT_BIND", default_value = DEFAULT_BIND)]
    bind: SocketAddr,

    /// If set, re-run ingestion every this many seconds in addition to on-demand refreshes.
    #[arg(long)]
    refresh_secs: Option<u64>,
}

impl ServeArgs {
    pub fn new(bind: SocketAddr, refresh_secs: Option<u64>) -> Self {
        Self { bind, refresh_secs }
    }

    pub fn bind(&self) -> SocketAddr {
        self.bind
    }

    pub fn refresh_secs(&self) -> Option<u64> {
        self.refresh_secs.filter(|&secs| secs > 0)
    }
}
