//! Implements the `Upstream` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Teller.

use crate::api::Upstream;
use crate::error::{Error, ErrorType};
use crate::Result;
use anyhow::anyhow;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::sync::Mutex;
use url::Url;

/// An implementation of the `Upstream` trait that serves canned bodies keyed by URL and remembers
/// every URL it was asked for. Unknown URLs answer like a 404.
#[derive(Debug, Default)]
pub struct TestUpstream {
    responses: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl TestUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for GET requests to `url`.
    pub fn with_response(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        let _ = self.responses.insert(url.into(), body.into());
        self
    }

    /// Serves `value`, serialized as JSON, for GET requests to `url`.
    pub fn with_json(self, url: impl Into<String>, value: &Value) -> Self {
        self.with_response(url, value.to_string())
    }

    /// The URLs requested so far, in request order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    /// An upstream seeded with one enrollment holding a checking, a savings and a credit card
    /// account, with a mix of posted and pending transactions. Links are built from `api_url`.
    pub fn seeded(api_url: &Url) -> Self {
        let url = |path: &str| {
            api_url
                .join(path)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| format!("{api_url}{path}"))
        };
        let account = |id: &str, name: &str, kind: &str, subtype: &str, last_four: &str| {
            json!({
                "id": id,
                "name": name,
                "type": kind,
                "subtype": subtype,
                "status": "open",
                "currency": "USD",
                "last_four": last_four,
                "enrollment_id": "enr_seed000000000000000",
                "institution": {"id": "seed_cu", "name": "Seed Credit Union"},
                "links": {
                    "self": url(&format!("accounts/{id}")),
                    "transactions": url(&format!("accounts/{id}/transactions")),
                    "balances": url(&format!("accounts/{id}/balances")),
                },
            })
        };
        let txn = |id: &str,
                   account_id: &str,
                   status: &str,
                   amount: &str,
                   date: &str,
                   description: &str,
                   kind: &str,
                   category: &str| {
            let processing_status = if status == "posted" { "complete" } else { "pending" };
            json!({
                "id": id,
                "account_id": account_id,
                "type": kind,
                "status": status,
                "amount": amount,
                "date": date,
                "description": description,
                "details": {
                    "processing_status": processing_status,
                    "category": category,
                    "counterparty": {"type": "organization", "name": description.to_uppercase()},
                },
                "links": {
                    "self": url(&format!("accounts/{account_id}/transactions/{id}")),
                    "account": url(&format!("accounts/{account_id}")),
                },
            })
        };

        let accounts = json!([
            account("acc_seed_checking", "Everyday Checking", "depository", "checking", "1234"),
            account("acc_seed_savings", "Rainy Day Savings", "depository", "savings", "5678"),
            account("acc_seed_credit", "Rewards Card", "credit", "credit_card", "9012"),
        ]);
        let checking = json!([
            txn("txn_seed_c1", "acc_seed_checking", "posted", "-142.67", "2025-10-16", "PG&E Electric", "ach", "utilities"),
            txn("txn_seed_c2", "acc_seed_checking", "posted", "2500.00", "2025-10-15", "Acme Payroll", "deposit", "income"),
            txn("txn_seed_c3", "acc_seed_checking", "pending", "-89.99", "2025-10-20", "Comcast Internet", "ach", "phone"),
        ]);
        let savings = json!([
            txn("txn_seed_s1", "acc_seed_savings", "posted", "0.42", "2025-10-01", "Interest", "interest", "income"),
        ]);
        let credit = json!([
            txn("txn_seed_r1", "acc_seed_credit", "pending", "-6.75", "2025-10-19", "Starbucks", "card_payment", "dining"),
            txn("txn_seed_r2", "acc_seed_credit", "posted", "-87.43", "2025-10-18", "Whole Foods Market", "card_payment", "groceries"),
            txn("txn_seed_r3", "acc_seed_credit", "posted", "-52.30", "2025-10-17", "Shell Gas Station", "card_payment", "fuel"),
        ]);

        Self::new()
            .with_json(url("accounts"), &accounts)
            .with_json(url("accounts/acc_seed_checking/transactions"), &checking)
            .with_json(url("accounts/acc_seed_savings/transactions"), &savings)
            .with_json(url("accounts/acc_seed_credit/transactions"), &credit)
    }
}

#[async_trait::async_trait]
impl Upstream for TestUpstream {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.lock().await.push(url.to_string());
        self.responses.get(url).cloned().ok_or_else(|| {
            Error::new(
                ErrorType::Status,
                anyhow!("{url} responded with 404 Not Found"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_url_is_status_error() {
        let upstream = TestUpstream::new().with_response("https://teller.test/a", "[]");
        assert_eq!(upstream.get("https://teller.test/a").await.unwrap(), b"[]");
        let err = upstream.get("https://teller.test/b").await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Status);
        assert_eq!(
            upstream.requests().await,
            vec!["https://teller.test/a", "https://teller.test/b"]
        );
    }

    #[tokio::test]
    async fn test_seed_accounts_decode() {
        let api_url = Url::parse("https://api.teller.io/").unwrap();
        let upstream = TestUpstream::seeded(&api_url);
        let body = upstream
            .get("https://api.teller.io/accounts")
            .await
            .unwrap();
        let accounts: Vec<crate::model::Account> = serde_json::from_slice(&body).unwrap();
        assert_eq!(accounts.len(), 3);
    }
}
