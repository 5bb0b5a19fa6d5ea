//! Shared validation context: the caches and adapters a long-lived caller
//! threads through repeated [`crate::validate::validate`] calls (§5's design
//! notes: "Expose an explicit `ValidationContext` that owns all caches").
//!
//! There is no global/static cache in this crate. A caller validating many
//! certificates over time constructs one `ValidationContext` and reuses it;
//! a one-shot caller can build a fresh one per call at the cost of a cold
//! CRL/OCSP cache.

use crate::adapters::ring_verifier::RingSignatureVerifier;
use crate::crl::cache::CrlCache;
use crate::ports::fetcher::RevocationFetcher;
use crate::ports::signature::SignatureVerifier;
use crate::revocation::checker::RevocationChecker;

/// Owns the long-lived state a validation run needs beyond the certificates
/// themselves: the CRL cache (and, through the revocation checker, the OCSP
/// response cache), the fetcher used to refresh both, and the signature
/// verifier adapter.
pub struct ValidationContext<F: RevocationFetcher + Clone> {
    pub(crate) revocation: RevocationChecker<F>,
    pub(crate) verifier: Box<dyn SignatureVerifier>,
    crl_cache: CrlCache,
}

impl<F: RevocationFetcher + Clone> ValidationContext<F> {
    /// Build a context with the default [`RingSignatureVerifier`] adapter
    /// and a fresh [`CrlCache`].
    pub fn new(fetcher: F) -> Self {
        Self::with_verifier(fetcher, Box::new(RingSignatureVerifier::new()))
    }

    /// Build a context with a caller-supplied signature verifier, e.g. a
    /// test double or an adapter backed by a different crypto library.
    pub fn with_verifier(fetcher: F, verifier: Box<dyn SignatureVerifier>) -> Self {
        let crl_cache = CrlCache::new();
        Self {
            revocation: RevocationChecker::new(fetcher, crl_cache.clone()),
            verifier,
            crl_cache,
        }
    }

    /// The CRL cache backing this context's revocation checker, exposed so
    /// callers can inspect or prune it (e.g. `remove_expired` on a timer)
    /// without going through a validation call.
    pub fn crl_cache(&self) -> &CrlCache {
        &self.crl_cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::fetcher::FetchError;

    #[derive(Clone)]
    struct StubFetcher;

    #[async_trait::async_trait]
    impl RevocationFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            Err(FetchError::Network {
                url: url.to_string(),
                reason: "stub fetcher never succeeds".to_string(),
            })
        }
    }

    #[test]
    fn new_context_starts_with_an_empty_crl_cache() {
        let ctx = ValidationContext::new(StubFetcher);
        assert!(ctx.crl_cache().is_empty());
    }
}
