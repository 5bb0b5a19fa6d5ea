//! CRL updater (§4.6): keeps the cache fresh by walking a certificate's
//! CRL distribution points.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cert::Certificate;
use crate::crl::cache::CrlCache;
use crate::crl::decode::decode_crl_der;
use crate::crl::model::Crl;
use crate::ports::fetcher::RevocationFetcher;

const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 3600;

#[derive(Debug, Error)]
pub enum CrlUpdateError {
    #[error("no CRL available for issuer and all distribution points failed")]
    NoCrlAvailable,
}

/// Fetches, validates freshness of, and caches CRLs on behalf of the chain
/// validator.
pub struct CrlUpdater<F: RevocationFetcher> {
    fetcher: F,
    cache: CrlCache,
    refresh_threshold_secs: i64,
}

impl<F: RevocationFetcher> CrlUpdater<F> {
    pub fn new(fetcher: F, cache: CrlCache) -> Self {
        Self {
            fetcher,
            cache,
            refresh_threshold_secs: DEFAULT_REFRESH_THRESHOLD_SECS,
        }
    }

    pub fn with_refresh_threshold_secs(mut self, secs: i64) -> Self {
        self.refresh_threshold_secs = secs;
        self
    }

    /// Returns the freshest CRL for `cert`'s issuer, fetching if the cached
    /// entry is absent or within the refresh threshold of expiry. When
    /// `silent` is true, a total failure to fetch returns `Ok(None)` instead
    /// of an error.
    pub async fn update_from_certificate(
        &self,
        cert: &Certificate,
        silent: bool,
    ) -> Result<Option<Crl>, CrlUpdateError> {
        let now = Utc::now();

        if !self
            .cache
            .is_expiring_soon(&cert.issuer_dn, self.refresh_threshold_secs, now)
        {
            return Ok(self.cache.get(&cert.issuer_dn));
        }

        for url in cert.crl_urls() {
            match self.fetch_and_validate(url, cert).await {
                Ok(crl) => {
                    self.cache.put(cert.issuer_dn.clone(), crl.clone());
                    return Ok(Some(crl));
                }
                Err(reason) => {
                    warn!(
                        target: "x509_validate::crl",
                        url = %url,
                        %reason,
                        "distribution point fetch failed"
                    );
                }
            }
        }

        if let Some(cached) = self.cache.get(&cert.issuer_dn) {
            warn!(
                target: "x509_validate::crl",
                issuer = %cert.issuer_dn,
                "all distribution points failed, serving stale cached CRL"
            );
            return Ok(Some(cached));
        }

        if silent {
            Ok(None)
        } else {
            Err(CrlUpdateError::NoCrlAvailable)
        }
    }

    async fn fetch_and_validate(&self, url: &str, cert: &Certificate) -> Result<Crl, String> {
        let bytes = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| e.to_string())?;
        let crl = decode_crl_der(&bytes).map_err(|e| e.to_string())?;

        if crl.issuer_dn != cert.issuer_dn {
            return Err(format!(
                "CRL issuer {} does not match certificate issuer {}",
                crl.issuer_dn, cert.issuer_dn
            ));
        }

        if let Some(cached) = self.cache.get(&cert.issuer_dn) {
            if crl.crl_number < cached.crl_number {
                return Err(format!(
                    "CRL regression: fetched number {} < cached {}",
                    crl.crl_number, cached.crl_number
                ));
            }
            if crl.crl_number == cached.crl_number && crl.this_update <= cached.this_update {
                debug!(target: "x509_validate::crl", "no change from cached CRL, keeping cached");
                return Ok(cached);
            }
        }

        Ok(crl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::certificate::{Extensions, PublicKey, SignatureAlgorithm};
    use crate::name::DistinguishedName;
    use crate::ports::fetcher::FetchError;

    #[derive(Clone)]
    struct UnreachableFetcher;

    #[async_trait::async_trait]
    impl RevocationFetcher for UnreachableFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            Err(FetchError::Network {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    fn cert_without_distribution_points() -> Certificate {
        Certificate {
            serial: vec![0x01],
            issuer_dn: DistinguishedName::new("CN=Int CA"),
            subject_dn: DistinguishedName::new("CN=leaf"),
            subject_dn_der: b"CN=leaf".to_vec(),
            not_before: Utc::now() - chrono::Duration::days(1),
            not_after: Utc::now() + chrono::Duration::days(30),
            public_key: PublicKey {
                algorithm: SignatureAlgorithm::EcdsaSha256,
                key_bytes: vec![1],
                spki_der: vec![2],
            },
            tbs_bytes: vec![],
            signature_bytes: vec![],
            signature_algorithm: SignatureAlgorithm::EcdsaSha256,
            extensions: Extensions::default(),
            der: vec![],
        }
    }

    #[tokio::test]
    async fn no_distribution_points_and_no_cache_fails_loudly_by_default() {
        let updater = CrlUpdater::new(UnreachableFetcher, CrlCache::new());
        let cert = cert_without_distribution_points();
        let err = updater.update_from_certificate(&cert, false).await.unwrap_err();
        assert!(matches!(err, CrlUpdateError::NoCrlAvailable));
    }

    #[tokio::test]
    async fn silent_mode_returns_none_instead_of_erroring() {
        let updater = CrlUpdater::new(UnreachableFetcher, CrlCache::new());
        let cert = cert_without_distribution_points();
        let result = updater.update_from_certificate(&cert, true).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn stale_cached_crl_is_served_when_every_distribution_point_fails() {
        let cache = CrlCache::new();
        let mut cert = cert_without_distribution_points();
        cert.extensions.crl_distribution_points = Some(crate::cert::extensions::CrlDistributionPoints {
            urls: vec!["http://crl.example/int.crl".to_string()],
        });

        let stale = crate::crl::model::Crl {
            issuer_dn: cert.issuer_dn.clone(),
            this_update: Utc::now() - chrono::Duration::days(2),
            next_update: Some(Utc::now() - chrono::Duration::days(1)),
            crl_number: 7,
            signature_algorithm: SignatureAlgorithm::EcdsaSha256,
            signature_bytes: vec![],
            tbs_bytes: vec![],
            entries: Default::default(),
        };
        cache.put(cert.issuer_dn.clone(), stale.clone());

        let updater = CrlUpdater::new(UnreachableFetcher, cache);
        let result = updater.update_from_certificate(&cert, false).await.unwrap();
        assert_eq!(result.unwrap().crl_number, 7);
    }

    #[tokio::test]
    async fn fresh_cached_crl_skips_the_network_entirely() {
        let cache = CrlCache::new();
        let mut cert = cert_without_distribution_points();
        cert.extensions.crl_distribution_points = Some(crate::cert::extensions::CrlDistributionPoints {
            urls: vec!["http://crl.example/int.crl".to_string()],
        });

        let fresh = crate::crl::model::Crl {
            issuer_dn: cert.issuer_dn.clone(),
            this_update: Utc::now() - chrono::Duration::hours(1),
            next_update: Some(Utc::now() + chrono::Duration::days(1)),
            crl_number: 9,
            signature_algorithm: SignatureAlgorithm::EcdsaSha256,
            signature_bytes: vec![],
            tbs_bytes: vec![],
            entries: Default::default(),
        };
        cache.put(cert.issuer_dn.clone(), fresh);

        // The fetcher errors unconditionally; if the updater tried the
        // network, this would come back `NoCrlAvailable` instead.
        let updater = CrlUpdater::new(UnreachableFetcher, cache);
        let result = updater.update_from_certificate(&cert, false).await.unwrap();
        assert_eq!(result.unwrap().crl_number, 9);
    }
}
