//! CRL validator (§4.7).

use chrono::Utc;

use crate::cert::Certificate;
use crate::crl::model::{Crl, CrlLookup};
use crate::ports::signature::SignatureVerifier;
use crate::result::ValidationResult;
use crate::revocation::checker::RevocationError;

/// Outcome of [`check_revocation`], distinct from a bare boolean so callers
/// (the revocation checker) can tell "not revoked" apart from "we couldn't
/// tell" without re-parsing error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrlCheckOutcome {
    NotRevoked,
    Revoked,
    ValidationFailed,
}

/// Validates `crl` against its issuer's certificate, recording findings into
/// `result`. Returns `true` when the CRL is usable (no errors recorded).
pub fn validate(
    crl: &Crl,
    issuer_cert: &Certificate,
    verifier: Option<&dyn SignatureVerifier>,
    result: &mut ValidationResult,
) -> bool {
    let mut ok = true;
    let now = Utc::now();

    if crl.issuer_dn != issuer_cert.subject_dn {
        result.add_error(RevocationError::CrlIssuerMismatch {
            crl_issuer: crl.issuer_dn.to_string(),
            expected: issuer_cert.subject_dn.to_string(),
        });
        ok = false;
    }

    if crl.this_update > now {
        result.add_error(RevocationError::CrlNotYetValid {
            this_update: crl.this_update,
            now,
        });
        ok = false;
    }

    if let Some(next_update) = crl.next_update {
        if next_update < now {
            result.add_warning(format!(
                "CRL nextUpdate {next_update} has passed; serving a stale CRL"
            ));
        }
    }

    match verifier {
        Some(verifier) => {
            match verifier.verify(
                &crl.tbs_bytes,
                &crl.signature_bytes,
                &issuer_cert.public_key.key_bytes,
                crl.signature_algorithm,
            ) {
                Ok(true) => result.add_success(format!("CRL signature verified for {}", crl.issuer_dn)),
                Ok(false) => {
                    result.add_error(RevocationError::CrlSignatureInvalid {
                        issuer: crl.issuer_dn.to_string(),
                    });
                    ok = false;
                }
                Err(e) => {
                    result.add_error(RevocationError::CrlSignatureInvalid {
                        issuer: format!("{} ({e})", crl.issuer_dn),
                    });
                    ok = false;
                }
            }
        }
        None => {
            result.add_warning("no signature verifier supplied; CRL signature not checked".to_string());
        }
    }

    ok
}

/// Validates `crl`, then looks up `cert.serial` in it. The reason-code-8
/// inversion (§4.7) is handled inside [`Crl::status_for`].
pub fn check_revocation(
    cert: &Certificate,
    crl: &Crl,
    issuer_cert: &Certificate,
    verifier: Option<&dyn SignatureVerifier>,
    result: &mut ValidationResult,
) -> CrlCheckOutcome {
    if !validate(crl, issuer_cert, verifier, result) {
        return CrlCheckOutcome::ValidationFailed;
    }

    match crl.status_for(&cert.serial) {
        CrlLookup::NotListed => {
            result.add_success(format!("{} not present in CRL", cert.subject_dn));
            CrlCheckOutcome::NotRevoked
        }
        CrlLookup::Revoked(entry) => {
            result.add_error(RevocationError::Revoked {
                subject: cert.subject_dn.to_string(),
                date: entry.revocation_date,
                reason: entry.reason_code.map(|r| format!("{r:?}")),
            });
            CrlCheckOutcome::Revoked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::certificate::{PublicKey, SignatureAlgorithm};
    use crate::crl::model::{RevocationReason, RevokedEntry};
    use crate::name::DistinguishedName;
    use std::collections::HashMap;

    fn sample_issuer() -> Certificate {
        Certificate {
            serial: vec![0x00],
            issuer_dn: DistinguishedName::new("CN=root"),
            subject_dn: DistinguishedName::new("CN=ca"),
            subject_dn_der: b"CN=ca".to_vec(),
            not_before: Utc::now() - chrono::Duration::days(1),
            not_after: Utc::now() + chrono::Duration::days(365),
            public_key: PublicKey {
                algorithm: SignatureAlgorithm::EcdsaSha256,
                key_bytes: vec![1, 2, 3],
                spki_der: vec![],
            },
            tbs_bytes: vec![],
            signature_bytes: vec![],
            signature_algorithm: SignatureAlgorithm::EcdsaSha256,
            extensions: Default::default(),
            der: vec![],
        }
    }

    fn sample_crl() -> Crl {
        Crl {
            issuer_dn: DistinguishedName::new("CN=ca"),
            this_update: Utc::now() - chrono::Duration::hours(1),
            next_update: Some(Utc::now() + chrono::Duration::hours(1)),
            crl_number: 1,
            signature_algorithm: SignatureAlgorithm::EcdsaSha256,
            signature_bytes: vec![],
            tbs_bytes: vec![],
            entries: HashMap::new(),
        }
    }

    #[test]
    fn issuer_mismatch_is_an_error() {
        let mut crl = sample_crl();
        crl.issuer_dn = DistinguishedName::new("CN=someone-else");
        let mut result = ValidationResult::new();
        assert!(!validate(&crl, &sample_issuer(), None, &mut result));
        assert!(!result.is_valid());
    }

    #[test]
    fn missing_verifier_warns_not_errors() {
        let crl = sample_crl();
        let mut result = ValidationResult::new();
        assert!(validate(&crl, &sample_issuer(), None, &mut result));
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn revoked_serial_produces_error() {
        let mut crl = sample_crl();
        crl.entries.insert(
            vec![0xAB],
            RevokedEntry {
                revocation_date: Utc::now(),
                reason_code: Some(RevocationReason::KeyCompromise),
                invalidity_date: None,
            },
        );
        let mut cert = sample_issuer();
        cert.serial = vec![0xAB];
        let mut result = ValidationResult::new();
        let outcome = check_revocation(&cert, &crl, &sample_issuer(), None, &mut result);
        assert_eq!(outcome, CrlCheckOutcome::Revoked);
        assert!(!result.is_valid());
    }

    #[test]
    fn remove_from_crl_reason_is_not_revoked() {
        let mut crl = sample_crl();
        crl.entries.insert(
            vec![0xCD],
            RevokedEntry {
                revocation_date: Utc::now(),
                reason_code: Some(RevocationReason::RemoveFromCrl),
                invalidity_date: None,
            },
        );
        let mut cert = sample_issuer();
        cert.serial = vec![0xCD];
        let mut result = ValidationResult::new();
        let outcome = check_revocation(&cert, &crl, &sample_issuer(), None, &mut result);
        assert_eq!(outcome, CrlCheckOutcome::NotRevoked);
        assert!(result.is_valid());
    }
}
