//! Revocation fetcher port (§4.4).
//!
//! All network I/O for CRL and OCSP retrieval goes through this port; the
//! core never opens a socket. Shaped like the teacher's `#[async_trait]`
//! storage trait (`FileKeyStorage`/`MemoryKeyStorage` both implement
//! `KeyStorage`) so that a production HTTP/LDAP adapter and an in-memory
//! test double are interchangeable.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a fetch can fail with. Timeouts and cancellation are
/// indistinguishable from other network errors at the revocation-checker
/// layer (§5), but are named distinctly here for diagnostics.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("could not resolve or connect to {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("fetch of {url} was cancelled")]
    Cancelled { url: String },
}

/// `fetch(url) -> Result<Bytes, FetchError>`, bounded by the caller's policy
/// timeouts. Implementations MUST honor cooperative cancellation of the
/// enclosing task and surface it as [`FetchError::Cancelled`].
#[async_trait]
pub trait RevocationFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// POST variant for OCSP requests, which carry a DER body and expect
    /// `Content-Type: application/ocsp-request` (§6). Default to `fetch` for
    /// fetchers that only ever resolve GET URLs (e.g. CRL distribution
    /// points); an OCSP-capable fetcher overrides this.
    async fn post(&self, url: &str, body: &[u8], content_type: &str) -> Result<Vec<u8>, FetchError> {
        let _ = (body, content_type);
        self.fetch(url).await
    }
}
