//! Builds the HTTP client that presents our client certificate to Teller.

use crate::error::{ErrorType, IntoResult};
use crate::Result;
use anyhow::Context;
use reqwest::{Client, Identity};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Creates a `reqwest::Client` that authenticates with the PEM certificate at `cert_path` and the
/// PEM private key at `key_path` on every connection, and that gives up on any request after
/// `timeout`.
///
/// The returned client is cheap to clone and all clones share one connection pool.
///
/// # Errors
/// - `Config` if either file cannot be read or the pair cannot be parsed.
pub async fn client(cert_path: &Path, key_path: &Path, timeout: Duration) -> Result<Client> {
    let mut pem = read_pem(cert_path).await?;
    if !pem.ends_with(b"\n") {
        pem.push(b'\n');
    }
    pem.extend(read_pem(key_path).await?);

    let identity = Identity::from_pem(&pem)
        .with_context(|| {
            format!(
                "Unable to use certificate '{}' with private key '{}'",
                cert_path.display(),
                key_path.display()
            )
        })
        .pub_result(ErrorType::Config)?;

    let client = Client::builder()
        .use_rustls_tls()
        .identity(identity)
        .timeout(timeout)
        .build()
        .context("Unable to build the HTTPS client")
        .pub_result(ErrorType::Config)?;
    debug!(
        "Loaded client certificate from {} with a {timeout:?} request timeout",
        cert_path.display()
    );
    Ok(client)
}

async fn read_pem(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Unable to read {}", path.display()))
        .pub_result(ErrorType::Config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CERT: &str = include_str!("testdata/certificate.pem");
    const KEY: &str = include_str!("testdata/private_key.pem");

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_valid_pair() {
        let dir = TempDir::new().unwrap();
        let cert = write(&dir, "certificate.pem", CERT);
        let key = write(&dir, "private_key.pem", KEY);
        assert!(client(&cert, &key, Duration::from_secs(5)).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_cert_is_config_error() {
        let dir = TempDir::new().unwrap();
        let key = write(&dir, "private_key.pem", KEY);
        let missing = dir.path().join("nope.pem");
        let err = client(&missing, &key, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        assert!(err.to_string().contains("nope.pem"), "{err}");
    }

    #[tokio::test]
    async fn test_garbage_pair_is_config_error() {
        let dir = TempDir::new().unwrap();
        let cert = write(&dir, "certificate.pem", "not a certificate");
        let key = write(&dir, "private_key.pem", "not a key");
        let err = client(&cert, &key, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[tokio::test]
    async fn test_cert_without_key_is_config_error() {
        let dir = TempDir::new().unwrap();
        let cert = write(&dir, "certificate.pem", CERT);
        let key = write(&dir, "private_key.pem", "");
        let err = client(&cert, &key, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        // Key material must never be echoed back.
        assert!(!err.to_string().contains("BEGIN"), "{err}");
    }
}
