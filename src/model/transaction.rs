//! The transaction record returned by Teller's `GET /accounts/:account_id/transactions`.
//!
//! See https://teller.io/docs/api/account/transactions

use crate::model::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether the institution has finalized a transaction. Any status other than `posted` or
/// `pending` decodes as `Other`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Posted,
    Pending,
    #[serde(other)]
    Other,
}

serde_plain::derive_display_from_serialize!(TransactionStatus);

/// A single posted or pending financial movement on an account.
///
/// This is also the shape served to callers, so it serializes back into the same JSON that Teller
/// sent.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) account_id: String,
    #[serde(rename = "type", default)]
    pub(crate) kind: String,
    pub(crate) status: TransactionStatus,
    pub(crate) amount: Amount,
    pub(crate) date: NaiveDate,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) details: Details,
    #[serde(default)]
    pub(crate) links: TransactionLinks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) running_balance: Option<Amount>,
}

impl Transaction {
    /// Decodes a transactions feed and keeps the posted transactions, in feed order. Returns them
    /// along with the number of records in the feed.
    ///
    /// Records whose status is not `posted` are dropped before the rest of their fields are read,
    /// so a pending record without a `date` does not fail the feed. A malformed posted record
    /// does.
    pub(crate) fn decode_posted(body: &[u8]) -> serde_json::Result<(Vec<Transaction>, usize)> {
        let records: Vec<Map<String, Value>> = serde_json::from_slice(body)?;
        let total = records.len();
        let posted = records
            .into_iter()
            .filter(|record| {
                record
                    .get("status")
                    .and_then(|status| TransactionStatus::deserialize(status).ok())
                    == Some(TransactionStatus::Posted)
            })
            .map(|record| serde_json::from_value(Value::Object(record)))
            .collect::<serde_json::Result<Vec<Transaction>>>()?;
        Ok((posted, total))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// The upstream transaction type, e.g. `card_payment`, `ach`, `transfer`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn is_posted(&self) -> bool {
        self.status == TransactionStatus::Posted
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn links(&self) -> &TransactionLinks {
        &self.links
    }
}

/// Enrichment Teller adds to a transaction. Counterparty and category are `null` until Teller has
/// finished processing the transaction.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Details {
    #[serde(default)]
    pub(crate) processing_status: String,
    #[serde(default)]
    pub(crate) counterparty: Option<Counterparty>,
    #[serde(default)]
    pub(crate) category: Option<String>,
}

impl Details {
    /// `pending` or `complete`.
    pub fn processing_status(&self) -> &str {
        &self.processing_status
    }

    pub fn counterparty(&self) -> Option<&Counterparty> {
        self.counterparty.as_ref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Counterparty {
    #[serde(rename = "type", default)]
    pub(crate) kind: Option<String>,
    #[serde(default)]
    pub(crate) name: Option<String>,
}

impl Counterparty {
    /// `organization` or `person`.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionLinks {
    #[serde(rename = "self", default)]
    pub(crate) self_link: String,
    #[serde(default)]
    pub(crate) account: String,
}

impl TransactionLinks {
    pub fn self_link(&self) -> &str {
        &self.self_link
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}
