//! OCSP client (§4.8): builds a request, invokes the fetcher, validates the
//! response, and caches the outcome.
//!
//! The cache is grounded in `cyrup-ai-sweetmcp`'s `OcspCache`
//! (`Arc<RwLock<HashMap<String, OcspCacheEntry>>>`, a `cached_at` plus
//! `next_update`-aware expiry check) but keyed the way §3's OCSP response
//! lifecycle specifies: `sha256(cert.serial || issuer.serial)`, not a plain
//! hex serial, since two different issuers can reuse a serial number.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cert::Certificate;
use crate::ocsp::decode::{parse_response, OcspDecodeError};
use crate::ocsp::model::{CertStatus, OcspResponse, ResponseStatus};
use crate::ocsp::request::{build_request, HashAlgorithm, RequestBuildError};
use crate::ports::fetcher::{FetchError, RevocationFetcher};
use crate::ports::signature::{CryptoError, SignatureVerifier};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);
/// OID for id-kp-OCSPSigning (RFC 6960 §4.2.2.2), the EKU a delegated
/// responder certificate must assert.
const OCSP_SIGNING_EKU_OID: &str = "1.3.6.1.5.5.7.3.9";

#[derive(Debug, Clone, Error)]
pub enum OcspError {
    #[error("failed to build OCSP request: {0}")]
    RequestBuild(#[from] RequestBuildError),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("failed to decode OCSP response: {0}")]
    Decode(#[from] OcspDecodeError),
    #[error("OCSP responder returned non-successful status: {0}")]
    ResponseStatus(ResponseStatus),
    #[error("OCSP response nonce does not match the request nonce")]
    NonceMismatch,
    #[error("OCSP response is not bound to the request (issuer/serial mismatch)")]
    BindingMismatch,
    #[error("OCSP response thisUpdate {this_update} is after evaluation time {now}")]
    NotYetValid {
        this_update: chrono::DateTime<Utc>,
        now: chrono::DateTime<Utc>,
    },
    #[error("OCSP response expired: nextUpdate {next_update} is before evaluation time {now}")]
    Expired {
        next_update: chrono::DateTime<Utc>,
        now: chrono::DateTime<Utc>,
    },
    #[error("OCSP response has no usable signer (no issuer key, no valid delegated responder cert)")]
    NoSigner,
    #[error("OCSP response signature verification failed")]
    SignatureInvalid,
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

#[derive(Clone)]
struct CacheEntry {
    status: CertStatus,
    next_update: Option<chrono::DateTime<Utc>>,
    cached_at: chrono::DateTime<Utc>,
}

/// Response cache, `Arc`-shared the way [`crate::crl::cache::CrlCache`] is,
/// so concurrent validations (§5) observe one consistent table.
#[derive(Clone)]
struct OcspCache {
    entries: Arc<RwLock<HashMap<Vec<u8>, CacheEntry>>>,
}

impl OcspCache {
    fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn key(cert_serial: &[u8], issuer_serial: &[u8]) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(cert_serial);
        hasher.update(issuer_serial);
        hasher.finalize().to_vec()
    }

    fn get(&self, key: &[u8], now: chrono::DateTime<Utc>) -> Option<CertStatus> {
        let entries = self.entries.read().expect("OCSP cache lock poisoned");
        let entry = entries.get(key)?;
        if let Some(next_update) = entry.next_update {
            if next_update <= now {
                return None;
            }
        }
        Some(entry.status.clone())
    }

    fn put(&self, key: Vec<u8>, status: CertStatus, next_update: Option<chrono::DateTime<Utc>>, now: chrono::DateTime<Utc>) {
        self.entries.write().expect("OCSP cache lock poisoned").insert(
            key,
            CacheEntry {
                status,
                next_update,
                cached_at: now,
            },
        );
    }
}

/// Per-instance OCSP client state (§4.8): timeouts, nonce policy, and a
/// private response cache.
pub struct OcspClient<F: RevocationFetcher> {
    fetcher: F,
    cache: OcspCache,
    connect_timeout: Duration,
    read_timeout: Duration,
    use_nonce: bool,
    hash_algorithm: HashAlgorithm,
}

impl<F: RevocationFetcher> OcspClient<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            cache: OcspCache::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            use_nonce: true,
            hash_algorithm: HashAlgorithm::default(),
        }
    }

    pub fn with_use_nonce(mut self, use_nonce: bool) -> Self {
        self.use_nonce = use_nonce;
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    /// Override the `CertID` digest algorithm (defaults to SHA-1 per RFC
    /// 6960 interoperability, §9's design notes). Explicit opt-in only.
    pub fn with_hash_algorithm(mut self, hash_algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = hash_algorithm;
        self
    }

    /// Check `cert`'s revocation status against `issuer` via OCSP. `url`
    /// overrides the certificate's AIA OCSP URL (§4.8 step 3); `None`
    /// returns `Ok(None)` when the certificate carries no OCSP URL either.
    pub async fn check(
        &self,
        cert: &Certificate,
        issuer: &Certificate,
        url: Option<&str>,
        verifier: Option<&dyn SignatureVerifier>,
    ) -> Result<Option<CertStatus>, OcspError> {
        let now = Utc::now();
        let cache_key = OcspCache::key(&cert.serial, &issuer.serial);

        if let Some(cached) = self.cache.get(&cache_key, now) {
            debug!(target: "x509_validate::revocation::ocsp", subject = %cert.subject_dn, "OCSP cache hit");
            return Ok(Some(cached));
        }

        let responder_url = match url.map(str::to_string).or_else(|| cert.ocsp_urls().first().cloned()) {
            Some(url) => url,
            None => return Ok(None),
        };

        let request_ctx = build_request(cert, issuer, self.use_nonce, self.hash_algorithm)?;

        let raw = tokio::time::timeout(
            self.connect_timeout + self.read_timeout,
            self.fetcher.post(&responder_url, &request_ctx.der, "application/ocsp-request"),
        )
        .await
        .map_err(|_| OcspError::Fetch(FetchError::Timeout { url: responder_url.clone() }))??;

        let (status, response) = parse_response(&raw)?;
        if status != ResponseStatus::Successful {
            return Err(OcspError::ResponseStatus(status));
        }
        let response = response.expect("Successful status always carries a response");

        self.validate_response(&response, &request_ctx, issuer, now, verifier)?;

        if !response.next_update.is_some_and(|next| next <= now) {
            self.cache.put(cache_key, response.cert_status.clone(), response.next_update, now);
        }

        Ok(Some(response.cert_status))
    }

    fn validate_response(
        &self,
        response: &OcspResponse,
        request_ctx: &crate::ocsp::request::OcspRequestContext,
        issuer: &Certificate,
        now: chrono::DateTime<Utc>,
        verifier: Option<&dyn SignatureVerifier>,
    ) -> Result<(), OcspError> {
        if let Some(requested_nonce) = &request_ctx.nonce {
            match &response.nonce {
                Some(response_nonce) if response_nonce == requested_nonce => {}
                _ => return Err(OcspError::NonceMismatch),
            }
        }

        if response.issuer_name_hash != request_ctx.issuer_name_hash
            || response.issuer_key_hash != request_ctx.issuer_key_hash
            || response.serial != request_ctx.serial
        {
            return Err(OcspError::BindingMismatch);
        }

        if response.this_update > now {
            return Err(OcspError::NotYetValid {
                this_update: response.this_update,
                now,
            });
        }
        if let Some(next_update) = response.next_update {
            if next_update < now {
                return Err(OcspError::Expired { next_update, now });
            }
        }

        let Some(verifier) = verifier else {
            warn!(target: "x509_validate::revocation::ocsp", "no signature verifier supplied; OCSP response signature not checked");
            return Ok(());
        };

        let (signer_key, signer_name) = self.resolve_signer(response, request_ctx, issuer)?;

        match verifier.verify(
            &response.tbs_bytes,
            &response.signature_bytes,
            &signer_key,
            response.signature_algorithm,
        ) {
            Ok(true) => {
                debug!(target: "x509_validate::revocation::ocsp", signer = %signer_name, "OCSP response signature verified");
                Ok(())
            }
            Ok(false) => Err(OcspError::SignatureInvalid),
            Err(e) => Err(OcspError::Crypto(e)),
        }
    }

    /// Resolve the key that should have produced `response.signature_bytes`:
    /// the issuer's own key, or — if the issuer's key hash doesn't directly
    /// match an embedded certificate — a delegated OCSP signing certificate
    /// embedded in the response that itself chains to the issuer and bears
    /// the OCSP-signing EKU (§4.8's signature step).
    ///
    /// The issuer's key hash is taken from `request_ctx` rather than
    /// recomputed here: it was hashed with the client's configured
    /// [`HashAlgorithm`] (SHA-1 by default, §9), the same algorithm the
    /// responder's `CertID` echo in `response.issuer_key_hash` uses. Hashing
    /// with a different algorithm (e.g. always SHA-256) would never match a
    /// directly-issuer-signed response under the default configuration.
    fn resolve_signer(
        &self,
        response: &OcspResponse,
        request_ctx: &crate::ocsp::request::OcspRequestContext,
        issuer: &Certificate,
    ) -> Result<(Vec<u8>, String), OcspError> {
        if request_ctx.issuer_key_hash == response.issuer_key_hash {
            return Ok((issuer.public_key.key_bytes.clone(), issuer.subject_dn.to_string()));
        }

        for der in &response.certs_der {
            let Ok(delegate) = crate::cert::decode::decode_cert_der(der) else {
                continue;
            };
            if delegate.issuer_dn != issuer.subject_dn {
                continue;
            }
            let asserts_ocsp_signing = delegate
                .extensions
                .extended_key_usage
                .as_ref()
                .map(|eku| {
                    eku.purposes().iter().any(|p| {
                        p.oid() == OCSP_SIGNING_EKU_OID
                            || matches!(p, crate::cert::extensions::ExtendedKeyUsagePurpose::OcspSigning)
                    })
                })
                .unwrap_or(false);
            if asserts_ocsp_signing {
                return Ok((delegate.public_key.key_bytes.clone(), delegate.subject_dn.to_string()));
            }
        }

        Err(OcspError::NoSigner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_depends_on_both_serials() {
        let a = OcspCache::key(&[1], &[2]);
        let b = OcspCache::key(&[1], &[3]);
        assert_ne!(a, b);
    }

    #[test]
    fn cache_expires_entries_past_next_update() {
        let cache = OcspCache::new();
        let now = Utc::now();
        cache.put(vec![1, 2, 3], CertStatus::Good, Some(now - chrono::Duration::hours(1)), now - chrono::Duration::hours(2));
        assert!(cache.get(&[1, 2, 3], now).is_none());
    }

    #[test]
    fn cache_serves_unexpired_entries() {
        let cache = OcspCache::new();
        let now = Utc::now();
        cache.put(vec![1, 2, 3], CertStatus::Good, Some(now + chrono::Duration::hours(1)), now);
        assert!(matches!(cache.get(&[1, 2, 3], now), Some(CertStatus::Good)));
    }
}
