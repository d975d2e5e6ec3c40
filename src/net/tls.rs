//! TLS configuration and certificate loading.
//!
//! Both the TLS listener and the QUIC listeners read the same PEM pair.
//! Everything is loaded before any listener starts, so a bad certificate
//! fails startup instead of one listener.

use axum_server::tls_rustls::RustlsConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::config::TlsConfig;

/// ALPN identifier for HTTP/3.
pub const H3_ALPN: &[u8] = b"h3";

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("{what} file not found: {path:?}")]
    NotFound { what: &'static str, path: PathBuf },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no certificates in {0:?}")]
    NoCertificates(PathBuf),

    #[error("no private key in {0:?}")]
    NoPrivateKey(PathBuf),

    #[error("invalid TLS configuration: {0}")]
    Rustls(#[from] rustls::Error),

    #[error("QUIC rejected TLS configuration: {0}")]
    Quic(String),

    #[error("failed to load WebTransport identity: {0}")]
    Identity(String),
}

/// Select ring as the process-wide rustls provider.
///
/// More than one provider is compiled in through the dependency graph, so
/// rustls cannot pick one on its own. Safe to call repeatedly.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

fn ensure_exists(what: &'static str, path: &Path) -> Result<(), TlsError> {
    if path.exists() {
        Ok(())
    } else {
        Err(TlsError::NotFound {
            what,
            path: path.to_path_buf(),
        })
    }
}

/// Load TLS configuration for the HTTPS listener.
pub async fn load_tls_config(tls: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    let cert_path = Path::new(&tls.cert_path);
    let key_path = Path::new(&tls.key_path);
    ensure_exists("Certificate", cert_path)?;
    ensure_exists("Private key", key_path)?;

    RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(|source| TlsError::Io {
            path: cert_path.to_path_buf(),
            source,
        })
}

/// Read the certificate chain and private key from PEM files.
pub fn load_pem(
    tls: &TlsConfig,
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>), TlsError> {
    let cert_path = Path::new(&tls.cert_path);
    let key_path = Path::new(&tls.key_path);
    ensure_exists("Certificate", cert_path)?;
    ensure_exists("Private key", key_path)?;

    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| TlsError::Io { path, source }
    };

    let mut cert_reader = BufReader::new(File::open(cert_path).map_err(io_err(cert_path))?);
    let certs = rustls_pemfile::certs(&mut cert_reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err(cert_path))?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(cert_path.to_path_buf()));
    }

    let mut key_reader = BufReader::new(File::open(key_path).map_err(io_err(key_path))?);
    let key = rustls_pemfile::private_key(&mut key_reader)
        .map_err(io_err(key_path))?
        .ok_or_else(|| TlsError::NoPrivateKey(key_path.to_path_buf()))?;

    Ok((certs, key))
}

/// Build the quinn server configuration for the HTTP/3 listener.
pub fn load_quic_server_config(tls: &TlsConfig) -> Result<quinn::ServerConfig, TlsError> {
    let (certs, key) = load_pem(tls)?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut crypto = rustls::ServerConfig::builder_with_provider(provider)
        .with_protocol_versions(&[&rustls::version::TLS13])?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    crypto.alpn_protocols = vec![H3_ALPN.to_vec()];

    let quic = quinn::crypto::rustls::QuicServerConfig::try_from(crypto)
        .map_err(|e| TlsError::Quic(e.to_string()))?;
    Ok(quinn::ServerConfig::with_crypto(Arc::new(quic)))
}

/// Load the certificate and key for the WebTransport listener.
pub async fn load_webtransport_identity(tls: &TlsConfig) -> Result<wtransport::Identity, TlsError> {
    let cert_path = Path::new(&tls.cert_path);
    let key_path = Path::new(&tls.key_path);
    ensure_exists("Certificate", cert_path)?;
    ensure_exists("Private key", key_path)?;

    wtransport::Identity::load_pemfiles(cert_path, key_path)
        .await
        .map_err(|e| TlsError::Identity(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing() -> TlsConfig {
        TlsConfig {
            cert_path: "/nonexistent/agent-gateway/cert.pem".into(),
            key_path: "/nonexistent/agent-gateway/key.pem".into(),
        }
    }

    #[test]
    fn missing_certificate_is_reported() {
        let err = load_pem(&missing()).unwrap_err();
        assert!(matches!(err, TlsError::NotFound { what: "Certificate", .. }));
    }

    #[test]
    fn empty_pem_has_no_certificates() {
        let dir = std::env::temp_dir().join(format!("agent-gateway-tls-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let cert = dir.join("cert.pem");
        let key = dir.join("key.pem");
        std::fs::write(&cert, "").unwrap();
        std::fs::write(&key, "").unwrap();

        let err = load_pem(&TlsConfig {
            cert_path: cert.to_string_lossy().into_owned(),
            key_path: key.to_string_lossy().into_owned(),
        })
        .unwrap_err();
        assert!(matches!(err, TlsError::NoCertificates(_)));
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn https_config_requires_files() {
        install_crypto_provider();
        assert!(load_tls_config(&missing()).await.is_err());
    }
}
