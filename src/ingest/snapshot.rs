//! The in-memory transaction list handed to the route layer.

use crate::ingest::Ingestor;
use crate::model::Transaction;
use crate::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

/// Holds the result of the last successful ingestion pass.
///
/// Readers get an `Arc` to an immutable list and never wait on the network. A failed refresh leaves
/// the previous list in place, so readers see either a complete pass or nothing at all.
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    current: Arc<RwLock<Option<Arc<Vec<Transaction>>>>>,
    refreshing: Arc<Mutex<()>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The transactions from the last successful pass, or `None` if no pass has succeeded yet.
    pub async fn current(&self) -> Option<Arc<Vec<Transaction>>> {
        self.current.read().await.clone()
    }

    /// Runs a pass with `ingestor` and, if it succeeds, makes its result the current list.
    /// Concurrent refreshes are serialized.
    pub async fn refresh(&self, ingestor: &Ingestor) -> Result<Arc<Vec<Transaction>>> {
        let _guard = self.refreshing.lock().await;
        let transactions = Arc::new(ingestor.ingest().await?);
        *self.current.write().await = Some(transactions.clone());
        info!("Snapshot now holds {} transactions", transactions.len());
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TestUpstream, Upstream};
    use crate::error::ErrorType;
    use crate::test::{account_json, test_config, transaction_json, API_URL};
    use serde_json::json;

    fn ingestor(upstream: TestUpstream) -> Ingestor {
        let upstream: Arc<dyn Upstream> = Arc::new(upstream);
        Ingestor::new(upstream, &test_config())
    }

    #[tokio::test]
    async fn test_empty_until_first_refresh() {
        let snapshot = Snapshot::new();
        assert!(snapshot.current().await.is_none());

        let good = ingestor(
            TestUpstream::new()
                .with_json(
                    format!("{API_URL}/accounts"),
                    &json!([account_json("A", "checking", "/A/tx")]),
                )
                .with_json(
                    format!("{API_URL}/A/tx"),
                    &json!([transaction_json("a1", "A", "posted", "-1.00")]),
                ),
        );
        let refreshed = snapshot.refresh(&good).await.unwrap();
        assert_eq!(refreshed.len(), 1);
        assert_eq!(snapshot.current().await.unwrap().as_slice(), refreshed.as_slice());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_list() {
        let snapshot = Snapshot::new();
        let good = ingestor(
            TestUpstream::new()
                .with_json(format!("{API_URL}/accounts"), &json!([])),
        );
        let _ = snapshot.refresh(&good).await.unwrap();

        let bad = ingestor(
            TestUpstream::new().with_response(format!("{API_URL}/accounts"), "not json"),
        );
        let err = snapshot.refresh(&bad).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Decode);
        let current = snapshot.current().await.unwrap();
        assert!(current.is_empty());
    }

    #[tokio::test]
    async fn test_failed_first_refresh_leaves_nothing() {
        let snapshot = Snapshot::new();
        let bad = ingestor(TestUpstream::new());
        assert!(snapshot.refresh(&bad).await.is_err());
        assert!(snapshot.current().await.is_none());
    }
}
