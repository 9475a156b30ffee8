use crate::api::Mode;
use crate::commands::Out;
use crate::ingest::Ingestor;
use crate::model::Transaction;
use crate::{Config, Result};

/// Handles the `peppermint fetch` command: one ingestion pass, returned as structured output.
pub async fn fetch(config: Config, mode: Mode) -> Result<Out<Vec<Transaction>>> {
    let ingestor = Ingestor::connect(&config, mode).await?;
    let transactions = ingestor.ingest().await?;
    Ok(Out::new(
        format!("Fetched {} posted transactions", transactions.len()),
        transactions,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::test::test_config;

    #[tokio::test]
    async fn test_fetch_in_test_mode() {
        let out = fetch(test_config(), Mode::Test).await.unwrap();
        assert_eq!(out.message(), "Fetched 4 posted transactions");
        let transactions = out.structure().unwrap();
        assert!(transactions.iter().all(Transaction::is_posted));
    }

    #[tokio::test]
    async fn test_fetch_without_certificates_fails_fast() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config().with_certificate(
            dir.path().join("certificate.pem"),
            dir.path().join("private_key.pem"),
        );
        let err = fetch(config, Mode::Teller).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
