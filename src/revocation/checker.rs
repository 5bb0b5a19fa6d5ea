//! Revocation checker: orchestrates CRL and OCSP under a [`RevocationPolicy`]
//! (§4.9).

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cert::Certificate;
use crate::crl::cache::CrlCache;
use crate::crl::updater::CrlUpdater;
use crate::crl::validator as crl_validator;
use crate::ocsp::client::{OcspClient, OcspError};
use crate::ocsp::model::CertStatus;
use crate::ports::fetcher::{FetchError, RevocationFetcher};
use crate::ports::signature::SignatureVerifier;
use crate::result::ValidationResult;
use crate::revocation::policy::RevocationPolicy;

/// Everything that can make the overall revocation verdict something other
/// than "not revoked" — or that records why no verdict could be reached.
#[derive(Debug, Clone, Error)]
pub enum RevocationError {
    #[error("{subject} revoked on {date} (reason: {reason:?})")]
    Revoked {
        subject: String,
        date: DateTime<Utc>,
        reason: Option<String>,
    },

    #[error("no CRL available for issuer {issuer}")]
    CrlUnavailable { issuer: String },

    #[error("CRL issuer {crl_issuer} does not match expected issuer {expected}")]
    CrlIssuerMismatch { crl_issuer: String, expected: String },

    #[error("CRL thisUpdate {this_update} is after evaluation time {now}")]
    CrlNotYetValid {
        this_update: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("CRL signature verification failed for issuer {issuer}")]
    CrlSignatureInvalid { issuer: String },

    #[error("OCSP responder at {url} unreachable: {reason}")]
    OcspUnreachable { url: String, reason: String },

    #[error("OCSP response malformed: {reason}")]
    OcspMalformed { reason: String },

    #[error("OCSP response status was not successful: {status}")]
    OcspResponseStatus { status: String },

    #[error("OCSP response nonce does not match request nonce")]
    OcspNonceMismatch,

    #[error("issuer {issuer} exposes no CRL distribution points, required by the active policy")]
    NoDistributionPoints { issuer: String },

    #[error("revocation status could not be determined via {tried:?} under a hard-fail policy")]
    Inconclusive { tried: Vec<RevocationMethod> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationMethod {
    Ocsp,
    Crl,
}

/// Outcome of a single revocation method attempt, as fed into
/// [`LastCheckStatus`].
#[derive(Debug, Clone)]
pub enum MethodOutcome {
    Good,
    Revoked,
    /// The method produced an answer, but the answer is conclusively
    /// untrustworthy: a nonce that doesn't match the request (replay), a
    /// response not bound to the request, or a signature that fails to
    /// verify. Unlike [`MethodOutcome::Inconclusive`] (§4.9: network error,
    /// parse error, unknown status, expired artifact), this is never
    /// downgraded to "ok" under `SoftFail` and never superseded by a
    /// fallback method under `*Preferred` — the corresponding error is
    /// already recorded in the [`ValidationResult`] by the time this is
    /// returned.
    Bad,
    Inconclusive(String),
    NotAttempted,
}

/// Structured record of what the checker actually did, returned alongside
/// the [`ValidationResult`] it produced.
#[derive(Debug, Clone)]
pub struct LastCheckStatus {
    pub ocsp: MethodOutcome,
    pub crl: MethodOutcome,
    pub is_revoked: bool,
}

impl LastCheckStatus {
    fn new() -> Self {
        Self {
            ocsp: MethodOutcome::NotAttempted,
            crl: MethodOutcome::NotAttempted,
            is_revoked: false,
        }
    }
}

fn is_conclusive(outcome: &MethodOutcome) -> bool {
    matches!(outcome, MethodOutcome::Good | MethodOutcome::Revoked | MethodOutcome::Bad)
}

/// Extract a `(url, reason)` pair from a [`FetchError`] for
/// [`RevocationError::OcspUnreachable`].
fn fetch_error_parts(e: &FetchError) -> (String, String) {
    match e {
        FetchError::Timeout { url } => (url.clone(), "request timed out".to_string()),
        FetchError::Network { url, reason } => (url.clone(), reason.clone()),
        FetchError::HttpStatus { url, status } => (url.clone(), format!("HTTP {status}")),
        FetchError::Cancelled { url } => (url.clone(), "request cancelled".to_string()),
    }
}

/// Orchestrates CRL and OCSP revocation checking for one (cert, issuer)
/// pair under a [`RevocationPolicy`].
pub struct RevocationChecker<F: RevocationFetcher> {
    ocsp: OcspClient<F>,
    crl_updater: CrlUpdater<F>,
    crl_cache: CrlCache,
}

impl<F: RevocationFetcher + Clone> RevocationChecker<F> {
    pub fn new(fetcher: F, crl_cache: CrlCache) -> Self {
        Self {
            ocsp: OcspClient::new(fetcher.clone()),
            crl_updater: CrlUpdater::new(fetcher, crl_cache.clone()),
            crl_cache,
        }
    }

    pub async fn check(
        &self,
        cert: &Certificate,
        issuer: &Certificate,
        policy: RevocationPolicy,
        verifier: Option<&dyn SignatureVerifier>,
        result: &mut ValidationResult,
    ) -> LastCheckStatus {
        let mut status = LastCheckStatus::new();

        if matches!(policy, RevocationPolicy::Disabled) {
            result.add_info(format!("revocation check skipped for {}", cert.subject_dn));
            return status;
        }

        let try_ocsp = policy.uses_ocsp();
        let try_crl = policy.uses_crl();

        match policy {
            RevocationPolicy::Disabled => unreachable!("handled above"),

            RevocationPolicy::OcspOnly => {
                let outcome = self.run_ocsp(cert, issuer, verifier, result).await;
                status.ocsp = outcome.clone();
                self.finalize_single(outcome, RevocationMethod::Ocsp, cert, policy, result, &mut status);
            }

            RevocationPolicy::CrlOnly => {
                if cert.crl_urls().is_empty() {
                    result.add_error(RevocationError::NoDistributionPoints {
                        issuer: issuer.subject_dn.to_string(),
                    });
                    status.is_revoked = true;
                    return status;
                }
                let outcome = self.run_crl(cert, issuer, verifier, result).await;
                status.crl = outcome.clone();
                self.finalize_single(outcome, RevocationMethod::Crl, cert, policy, result, &mut status);
            }

            RevocationPolicy::OcspPreferred => {
                let ocsp_outcome = self.run_ocsp(cert, issuer, verifier, result).await;
                status.ocsp = ocsp_outcome.clone();
                if is_conclusive(&ocsp_outcome) {
                    self.apply_conclusive(&ocsp_outcome, cert, &mut status);
                } else if try_crl {
                    let crl_outcome = self.run_crl(cert, issuer, verifier, result).await;
                    status.crl = crl_outcome.clone();
                    self.apply_conclusive(&crl_outcome, cert, &mut status);
                }
            }

            RevocationPolicy::CrlPreferred => {
                let crl_outcome = self.run_crl(cert, issuer, verifier, result).await;
                status.crl = crl_outcome.clone();
                if is_conclusive(&crl_outcome) {
                    self.apply_conclusive(&crl_outcome, cert, &mut status);
                } else if try_ocsp {
                    let ocsp_outcome = self.run_ocsp(cert, issuer, verifier, result).await;
                    status.ocsp = ocsp_outcome.clone();
                    self.apply_conclusive(&ocsp_outcome, cert, &mut status);
                }
            }

            RevocationPolicy::SoftFail => {
                let ocsp_outcome = if try_ocsp {
                    let outcome = self.run_ocsp(cert, issuer, verifier, result).await;
                    status.ocsp = outcome.clone();
                    outcome
                } else {
                    MethodOutcome::NotAttempted
                };
                let crl_outcome = if !is_conclusive(&ocsp_outcome) && try_crl {
                    let outcome = self.run_crl(cert, issuer, verifier, result).await;
                    status.crl = outcome.clone();
                    outcome
                } else {
                    MethodOutcome::NotAttempted
                };

                if is_conclusive(&ocsp_outcome) {
                    self.apply_conclusive(&ocsp_outcome, cert, &mut status);
                } else if is_conclusive(&crl_outcome) {
                    self.apply_conclusive(&crl_outcome, cert, &mut status);
                } else {
                    result.add_warning(format!(
                        "revocation status for {} could not be determined; accepted under soft-fail policy",
                        cert.subject_dn
                    ));
                }
            }

            RevocationPolicy::HardFail => {
                let ocsp_outcome = if try_ocsp {
                    let outcome = self.run_ocsp(cert, issuer, verifier, result).await;
                    status.ocsp = outcome.clone();
                    outcome
                } else {
                    MethodOutcome::NotAttempted
                };
                let crl_outcome = if !is_conclusive(&ocsp_outcome) && try_crl {
                    let outcome = self.run_crl(cert, issuer, verifier, result).await;
                    status.crl = outcome.clone();
                    outcome
                } else {
                    MethodOutcome::NotAttempted
                };

                if is_conclusive(&ocsp_outcome) {
                    self.apply_conclusive(&ocsp_outcome, cert, &mut status);
                } else if is_conclusive(&crl_outcome) {
                    self.apply_conclusive(&crl_outcome, cert, &mut status);
                } else {
                    result.add_error(RevocationError::Inconclusive {
                        tried: [try_ocsp.then_some(RevocationMethod::Ocsp), try_crl.then_some(RevocationMethod::Crl)]
                            .into_iter()
                            .flatten()
                            .collect(),
                    });
                    status.is_revoked = true;
                }
            }
        }

        status
    }

    fn apply_conclusive(&self, outcome: &MethodOutcome, cert: &Certificate, status: &mut LastCheckStatus) {
        match outcome {
            MethodOutcome::Good => {
                debug!(target: "x509_validate::revocation", subject = %cert.subject_dn, "revocation check: good");
            }
            MethodOutcome::Revoked | MethodOutcome::Bad => {
                status.is_revoked = true;
            }
            _ => {}
        }
    }

    fn finalize_single(
        &self,
        outcome: MethodOutcome,
        method: RevocationMethod,
        cert: &Certificate,
        policy: RevocationPolicy,
        result: &mut ValidationResult,
        status: &mut LastCheckStatus,
    ) {
        match outcome {
            MethodOutcome::Good => {}
            MethodOutcome::Revoked | MethodOutcome::Bad => status.is_revoked = true,
            MethodOutcome::Inconclusive(reason) => {
                if policy.escalates_method_errors() {
                    result.add_error(RevocationError::Inconclusive { tried: vec![method] });
                } else {
                    result.add_warning(format!(
                        "revocation check for {} inconclusive: {reason}",
                        cert.subject_dn
                    ));
                }
            }
            MethodOutcome::NotAttempted => {}
        }
    }

    async fn run_ocsp(
        &self,
        cert: &Certificate,
        issuer: &Certificate,
        verifier: Option<&dyn SignatureVerifier>,
        result: &mut ValidationResult,
    ) -> MethodOutcome {
        match self.ocsp.check(cert, issuer, None, verifier).await {
            Ok(Some(status)) => match status {
                CertStatus::Good => {
                    result.add_success(format!("{} is good per OCSP", cert.subject_dn));
                    MethodOutcome::Good
                }
                CertStatus::Revoked { date, reason } => {
                    result.add_error(RevocationError::Revoked {
                        subject: cert.subject_dn.to_string(),
                        date,
                        reason: reason.map(|r| format!("{r:?}")),
                    });
                    MethodOutcome::Revoked
                }
                CertStatus::Unknown => {
                    result.add_warning(format!("OCSP returned unknown status for {}", cert.subject_dn));
                    MethodOutcome::Inconclusive("unknown status".to_string())
                }
            },
            Ok(None) => {
                result.add_warning(format!("no OCSP responder URL available for {}", cert.subject_dn));
                MethodOutcome::Inconclusive("no responder URL".to_string())
            }
            // Nonce/binding/signature failures are conclusively bad, not
            // inconclusive (§4.9): they must always be recorded as an
            // error, never downgraded to a warning under `SoftFail` or
            // silently superseded by a CRL fallback under `*Preferred`.
            Err(OcspError::NonceMismatch) => {
                warn!(target: "x509_validate::revocation", subject = %cert.subject_dn, "OCSP nonce mismatch");
                result.add_error(RevocationError::OcspNonceMismatch);
                MethodOutcome::Bad
            }
            Err(OcspError::BindingMismatch) => {
                warn!(target: "x509_validate::revocation", subject = %cert.subject_dn, "OCSP response not bound to request");
                result.add_error(RevocationError::OcspMalformed {
                    reason: "response not bound to the request (issuer/serial mismatch)".to_string(),
                });
                MethodOutcome::Bad
            }
            Err(OcspError::SignatureInvalid) => {
                warn!(target: "x509_validate::revocation", subject = %cert.subject_dn, "OCSP response signature invalid");
                result.add_error(RevocationError::OcspMalformed {
                    reason: "signature verification failed".to_string(),
                });
                MethodOutcome::Bad
            }
            Err(OcspError::Decode(decode_err)) => {
                let error = RevocationError::OcspMalformed { reason: decode_err.to_string() };
                warn!(target: "x509_validate::revocation", error = %error, "OCSP response malformed");
                MethodOutcome::Inconclusive(error.to_string())
            }
            Err(OcspError::ResponseStatus(status)) => {
                let error = RevocationError::OcspResponseStatus { status: status.to_string() };
                warn!(target: "x509_validate::revocation", error = %error, "OCSP responder returned non-successful status");
                MethodOutcome::Inconclusive(error.to_string())
            }
            Err(OcspError::Fetch(fetch_err)) => {
                let (url, reason) = fetch_error_parts(&fetch_err);
                let error = RevocationError::OcspUnreachable { url, reason };
                warn!(target: "x509_validate::revocation", error = %error, "OCSP responder unreachable");
                MethodOutcome::Inconclusive(error.to_string())
            }
            Err(e) => {
                warn!(target: "x509_validate::revocation", error = %e, "OCSP check failed");
                MethodOutcome::Inconclusive(e.to_string())
            }
        }
    }

    async fn run_crl(
        &self,
        cert: &Certificate,
        issuer: &Certificate,
        verifier: Option<&dyn SignatureVerifier>,
        result: &mut ValidationResult,
    ) -> MethodOutcome {
        let crl = match self.crl_updater.update_from_certificate(cert, false).await {
            Ok(Some(crl)) => crl,
            Ok(None) => return MethodOutcome::Inconclusive("no CRL available".to_string()),
            Err(e) => return MethodOutcome::Inconclusive(e.to_string()),
        };

        use crate::crl::validator::CrlCheckOutcome;
        match crl_validator::check_revocation(cert, &crl, issuer, verifier, result) {
            CrlCheckOutcome::NotRevoked => MethodOutcome::Good,
            CrlCheckOutcome::Revoked => MethodOutcome::Revoked,
            CrlCheckOutcome::ValidationFailed => {
                MethodOutcome::Inconclusive("CRL validation failed".to_string())
            }
        }
    }

    pub fn cache(&self) -> &CrlCache {
        &self.crl_cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::certificate::{Extensions, PublicKey, SignatureAlgorithm};
    use crate::name::DistinguishedName;

    #[derive(Clone)]
    struct UnreachableFetcher;

    #[async_trait::async_trait]
    impl RevocationFetcher for UnreachableFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, crate::ports::fetcher::FetchError> {
            Err(crate::ports::fetcher::FetchError::Network {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    /// No CRL distribution points and no AIA OCSP URL: both methods can be
    /// driven to their "nothing to check against" path without any network
    /// I/O or DER decoding, which is all these orchestration tests need.
    fn bare_cert() -> Certificate {
        Certificate {
            serial: vec![0x01],
            issuer_dn: DistinguishedName::new("CN=Int CA"),
            subject_dn: DistinguishedName::new("CN=leaf"),
            subject_dn_der: b"CN=leaf".to_vec(),
            not_before: Utc::now() - chrono::Duration::days(1),
            not_after: Utc::now() + chrono::Duration::days(30),
            public_key: PublicKey {
                algorithm: SignatureAlgorithm::EcdsaSha256,
                key_bytes: vec![1, 2, 3],
                spki_der: vec![4, 5, 6],
            },
            tbs_bytes: vec![9],
            signature_bytes: vec![8],
            signature_algorithm: SignatureAlgorithm::EcdsaSha256,
            extensions: Extensions::default(),
            der: vec![0u8; 16],
        }
    }

    fn issuer_cert() -> Certificate {
        let mut issuer = bare_cert();
        issuer.subject_dn = DistinguishedName::new("CN=Int CA");
        issuer.issuer_dn = DistinguishedName::new("CN=Int CA");
        issuer
    }

    fn checker() -> RevocationChecker<UnreachableFetcher> {
        RevocationChecker::new(UnreachableFetcher, CrlCache::new())
    }

    #[tokio::test]
    async fn disabled_policy_returns_immediately_with_no_findings() {
        let checker = checker();
        let cert = bare_cert();
        let issuer = issuer_cert();
        let mut result = ValidationResult::new();
        let status = checker
            .check(&cert, &issuer, RevocationPolicy::Disabled, None, &mut result)
            .await;
        assert!(!status.is_revoked);
        assert!(result.errors().is_empty());
        assert_eq!(result.infos().len(), 1);
    }

    #[tokio::test]
    async fn crl_only_without_distribution_points_is_a_hard_error() {
        let checker = checker();
        let cert = bare_cert();
        let issuer = issuer_cert();
        let mut result = ValidationResult::new();
        let status = checker
            .check(&cert, &issuer, RevocationPolicy::CrlOnly, None, &mut result)
            .await;
        assert!(status.is_revoked);
        assert!(!result.is_valid());
    }

    #[tokio::test]
    async fn ocsp_only_without_a_responder_url_is_inconclusive_and_escalates() {
        let checker = checker();
        let cert = bare_cert();
        let issuer = issuer_cert();
        let mut result = ValidationResult::new();
        let status = checker
            .check(&cert, &issuer, RevocationPolicy::OcspOnly, None, &mut result)
            .await;
        assert!(matches!(status.ocsp, MethodOutcome::Inconclusive(_)));
        assert!(!result.is_valid(), "OcspOnly escalates method-level errors (§4.9)");
    }

    #[tokio::test]
    async fn soft_fail_downgrades_double_inconclusive_to_ok_with_warnings() {
        let checker = checker();
        let cert = bare_cert();
        let issuer = issuer_cert();
        let mut result = ValidationResult::new();
        let status = checker
            .check(&cert, &issuer, RevocationPolicy::SoftFail, None, &mut result)
            .await;
        assert!(!status.is_revoked);
        assert!(result.is_valid(), "{:?}", result.errors());
        assert!(!result.warnings().is_empty());
    }

    #[tokio::test]
    async fn hard_fail_treats_double_inconclusive_as_revoked() {
        let checker = checker();
        let cert = bare_cert();
        let issuer = issuer_cert();
        let mut result = ValidationResult::new();
        let status = checker
            .check(&cert, &issuer, RevocationPolicy::HardFail, None, &mut result)
            .await;
        assert!(status.is_revoked);
        assert!(!result.is_valid());
    }

    #[test]
    fn bad_outcome_is_conclusive() {
        assert!(is_conclusive(&MethodOutcome::Bad));
        assert!(is_conclusive(&MethodOutcome::Good));
        assert!(is_conclusive(&MethodOutcome::Revoked));
        assert!(!is_conclusive(&MethodOutcome::Inconclusive("x".to_string())));
        assert!(!is_conclusive(&MethodOutcome::NotAttempted));
    }

    #[test]
    fn fetch_error_parts_extracts_url_and_reason() {
        let (url, reason) = fetch_error_parts(&FetchError::Network {
            url: "http://ocsp.example".to_string(),
            reason: "connection refused".to_string(),
        });
        assert_eq!(url, "http://ocsp.example");
        assert_eq!(reason, "connection refused");
    }

    /// P3: a nonce mismatch is conclusively bad, not inconclusive — it must
    /// surface as exactly one error (of the "nonce" kind) regardless of
    /// policy, never as a warning, never superseded by a CRL fallback.
    #[tokio::test]
    async fn ocsp_only_nonce_mismatch_is_a_single_conclusive_error() {
        let mut result = ValidationResult::new();
        let mut status = LastCheckStatus::new();
        result.add_error(RevocationError::OcspNonceMismatch);
        status.ocsp = MethodOutcome::Bad;
        let checker = checker();
        checker.finalize_single(
            MethodOutcome::Bad,
            RevocationMethod::Ocsp,
            &bare_cert(),
            RevocationPolicy::OcspOnly,
            &mut result,
            &mut status,
        );
        assert!(status.is_revoked);
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].to_string().contains("nonce"));
        assert!(result.successes().is_empty());
    }

    #[tokio::test]
    async fn soft_fail_does_not_downgrade_a_bad_ocsp_outcome_to_ok() {
        let mut result = ValidationResult::new();
        let mut status = LastCheckStatus::new();
        result.add_error(RevocationError::OcspNonceMismatch);
        let checker = checker();
        checker.apply_conclusive(&MethodOutcome::Bad, &bare_cert(), &mut status);
        assert!(status.is_revoked);
        assert!(!result.is_valid(), "a bad OCSP response must not be downgraded to ok");
    }

    #[tokio::test]
    async fn ocsp_preferred_falls_back_to_crl_when_ocsp_is_inconclusive() {
        let checker = checker();
        let cert = bare_cert();
        let issuer = issuer_cert();
        let mut result = ValidationResult::new();
        let status = checker
            .check(&cert, &issuer, RevocationPolicy::OcspPreferred, None, &mut result)
            .await;
        // Neither method has anything to check against, so the fallback
        // itself surfaces as a CRL-side warning rather than a verdict.
        assert!(!status.is_revoked);
        assert!(matches!(status.ocsp, MethodOutcome::Inconclusive(_)));
    }
}
