//! The transaction-ingestion pipeline.
//!
//! One pass lists the enrolled accounts, keeps the checking and credit card accounts, fetches each
//! of their transaction feeds and keeps only the posted transactions. Results are ordered by
//! account enumeration order, then by feed order within an account. Any failure fails the whole
//! pass; a partial list is never returned.

mod snapshot;

use crate::api::{Mode, Upstream};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Account, Transaction};
use crate::{Config, Error, Result};
use anyhow::{anyhow, Context};
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

pub use snapshot::Snapshot;

/// Fetches the accounts listing at `accounts_url` and returns the accounts whose subtype is
/// `checking` or `credit_card`, in upstream order.
///
/// # Errors
/// - Any error from `upstream`.
/// - `Decode` if the body is not a JSON array of accounts.
pub async fn list_relevant_accounts(
    upstream: &dyn Upstream,
    accounts_url: &str,
) -> Result<Vec<Account>> {
    let body = upstream.get(accounts_url).await?;
    let accounts: Vec<Account> = serde_json::from_slice(&body)
        .context("Unable to decode the accounts listing")
        .pub_result(ErrorType::Decode)?;

    Ok(accounts
        .into_iter()
        .filter(|account| {
            let keep = account.is_relevant();
            if !keep {
                debug!(
                    "Skipping {} account '{}' ({})",
                    account.subtype(),
                    account.name(),
                    account.id()
                );
            }
            keep
        })
        .collect())
}

/// Fetches the transaction feed of every account in `accounts` and returns the posted transactions.
///
/// Relative transaction links are resolved against `api_url`. Up to `workers` feeds are fetched at
/// once, but results are always merged in the order of `accounts`. The first failure stops the
/// collection and drops the fetches still in flight.
///
/// # Errors
/// - `Request` if a transactions link cannot be resolved to a URL.
/// - Any error from `upstream`.
/// - `Decode` if a relevant account has no transactions link, if a feed is not a JSON array of
///   objects, or if a posted transaction in it is malformed.
pub async fn collect_transactions(
    upstream: &dyn Upstream,
    accounts: &[Account],
    api_url: &Url,
    workers: usize,
) -> Result<Vec<Transaction>> {
    let fetches: Vec<_> = accounts
        .iter()
        .map(|account| posted_transactions(upstream, account, api_url))
        .collect();
    let feeds: Vec<Vec<Transaction>> = futures::stream::iter(fetches)
        .buffered(workers.max(1))
        .try_collect()
        .await?;
    Ok(feeds.into_iter().flatten().collect())
}

/// Resolves a transactions link against `api_url`. A leading `/` is relative to the base URL's
/// path, not the host root, so `/a1/tx` against `https://host/v1/` is `https://host/v1/a1/tx`.
fn resolve_link(api_url: &Url, link: &str) -> std::result::Result<Url, url::ParseError> {
    api_url.join(link.trim_start_matches('/'))
}

async fn posted_transactions(
    upstream: &dyn Upstream,
    account: &Account,
    api_url: &Url,
) -> Result<Vec<Transaction>> {
    let link = account.links().transactions();
    if link.is_empty() {
        return Err(Error::new(
            ErrorType::Decode,
            anyhow!("Account {} has no transactions link", account.id()),
        ));
    }
    let url = resolve_link(api_url, link)
        .with_context(|| {
            format!(
                "Invalid transactions link '{link}' for account {}",
                account.id()
            )
        })
        .pub_result(ErrorType::Request)?;

    let body = upstream.get(url.as_str()).await?;
    let (posted, total) = Transaction::decode_posted(&body)
        .with_context(|| format!("Unable to decode transactions for account {}", account.id()))
        .pub_result(ErrorType::Decode)?;

    debug!(
        "Account '{}' ({}): kept {} of {total} transactions",
        account.name(),
        account.id(),
        posted.len()
    );
    Ok(posted)
}

/// Runs ingestion passes. Owns the upstream, which holds the only HTTP client of the process.
pub struct Ingestor {
    upstream: Arc<dyn Upstream>,
    api_url: Url,
    accounts_url: Url,
    workers: usize,
}

impl Ingestor {
    pub fn new(upstream: Arc<dyn Upstream>, config: &Config) -> Self {
        Self {
            upstream,
            api_url: config.api_url().clone(),
            accounts_url: config.accounts_url(),
            workers: config.workers(),
        }
    }

    /// Constructs the upstream for `mode` (loading the client certificate in `Mode::Teller`) and
    /// returns an `Ingestor` that uses it.
    ///
    /// # Errors
    /// - `Config` if the certificate or key cannot be loaded.
    pub async fn connect(config: &Config, mode: Mode) -> Result<Self> {
        let upstream = crate::api::upstream(config, mode).await?;
        Ok(Self::new(upstream, config))
    }

    /// Runs one full pass and returns every posted transaction of every relevant account.
    pub async fn ingest(&self) -> Result<Vec<Transaction>> {
        let accounts =
            list_relevant_accounts(self.upstream.as_ref(), self.accounts_url.as_str()).await?;
        info!("Found {} checking and credit card accounts", accounts.len());

        let transactions = collect_transactions(
            self.upstream.as_ref(),
            &accounts,
            &self.api_url,
            self.workers,
        )
        .await?;
        info!("Collected {} posted transactions", transactions.len());
        Ok(transactions)
    }
}
