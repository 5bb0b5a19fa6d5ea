//! Chain validator (§4.11): walks an assembled [`Chain`] leaf-to-root,
//! enforcing temporal, structural, signature, and policy rules, and
//! dispatching each non-root link to the revocation checker.

use chrono::Utc;

use crate::cert::Certificate;
use crate::chain::builder::Chain;
use crate::config::ValidationOptions;
use crate::error::ValidationError;
use crate::ports::fetcher::RevocationFetcher;
use crate::ports::signature::SignatureVerifier;
use crate::result::ValidationResult;
use crate::revocation::checker::RevocationChecker;

/// RFC 5280 extension OIDs this validator recognizes when they are marked
/// critical (§4.11). An unknown critical extension fails validation.
const RECOGNIZED_CRITICAL_OIDS: &[&str] = &[
    "2.5.29.19", // Basic Constraints
    "2.5.29.15", // Key Usage
    "2.5.29.37", // Extended Key Usage
    "2.5.29.17", // Subject Alternative Name
    "2.5.29.32", // Certificate Policies
    "2.5.29.30", // Name Constraints
];

/// Validate `chain` against `options`, recording every finding into
/// `result`. `revocation` is `None` when `options.check_revocation` is
/// false or the caller has no fetcher to offer.
pub async fn validate<F: RevocationFetcher + Clone>(
    chain: &Chain,
    options: &ValidationOptions,
    verifier: &dyn SignatureVerifier,
    revocation: Option<&RevocationChecker<F>>,
    result: &mut ValidationResult,
) {
    let certs = chain.certs();
    let now = Utc::now();

    for (i, cert) in certs.iter().enumerate() {
        let issuer = if i + 1 < certs.len() { &certs[i + 1] } else { cert };

        validate_temporal(cert, now, result);
        validate_issuer_chaining(cert, issuer, i + 1 == certs.len(), result);
        validate_signature(cert, issuer, verifier, result).await;
        validate_critical_extensions(cert, result);

        if i > 0 {
            validate_ca_constraints(cert, i, result);
        }

        if i == 0 {
            validate_leaf_key_usage(cert, options, result);
            validate_leaf_hostname(cert, options, result);
        }

        let is_root_link = i + 1 == certs.len();
        if !is_root_link && options.check_revocation {
            if let Some(revocation) = revocation {
                revocation
                    .check(cert, issuer, options.revocation_policy, Some(verifier), result)
                    .await;
            }
        }
    }

    validate_policies(chain, options, result);
}

fn validate_temporal(cert: &Certificate, now: chrono::DateTime<Utc>, result: &mut ValidationResult) {
    if now < cert.not_before {
        result.add_error(ValidationError::NotYetValid {
            subject: cert.subject_dn.to_string(),
            not_before: cert.not_before,
            now,
        });
        return;
    }
    if now > cert.not_after {
        result.add_error(ValidationError::Expired {
            subject: cert.subject_dn.to_string(),
            not_after: cert.not_after,
            now,
        });
        return;
    }
    result.add_success(format!("{} is within its validity period", cert.subject_dn));
}

fn validate_issuer_chaining(cert: &Certificate, issuer: &Certificate, is_root: bool, result: &mut ValidationResult) {
    let expected = if is_root { &cert.subject_dn } else { &issuer.subject_dn };
    if &cert.issuer_dn != expected {
        result.add_error(ValidationError::IssuerMismatch {
            subject_cert: cert.subject_dn.to_string(),
            claimed_issuer: cert.issuer_dn.to_string(),
            actual_issuer: expected.to_string(),
        });
    }
}

async fn validate_signature(
    cert: &Certificate,
    issuer: &Certificate,
    verifier: &dyn SignatureVerifier,
    result: &mut ValidationResult,
) {
    match verifier.verify(
        &cert.tbs_bytes,
        &cert.signature_bytes,
        &issuer.public_key.key_bytes,
        cert.signature_algorithm,
    ) {
        Ok(true) => result.add_success(format!("signature of {} verified", cert.subject_dn)),
        Ok(false) => result.add_error(ValidationError::Crypto(
            crate::ports::signature::CryptoError::MalformedSignature(format!(
                "signature of {} does not verify against {}",
                cert.subject_dn, issuer.subject_dn
            )),
        )),
        Err(e) => result.add_error(ValidationError::Crypto(e)),
    }
}

fn validate_ca_constraints(cert: &Certificate, index: usize, result: &mut ValidationResult) {
    if !cert.is_ca() {
        result.add_error(ValidationError::NotAValidCa {
            subject: cert.subject_dn.to_string(),
            reason: "basic constraints does not assert CA:TRUE".to_string(),
        });
        return;
    }

    if let Some(ku) = &cert.extensions.key_usage {
        if !ku.can_sign_certs() {
            result.add_error(ValidationError::NotAValidCa {
                subject: cert.subject_dn.to_string(),
                reason: "key usage does not assert keyCertSign".to_string(),
            });
            return;
        }
    }

    if let Some(path_len) = cert.extensions.basic_constraints.as_ref().and_then(|bc| bc.path_len_constraint()) {
        // Certificates strictly between this CA and the leaf: indices 1..index.
        let intervening = index.saturating_sub(1) as u32;
        if intervening > path_len {
            result.add_error(ValidationError::NotAValidCa {
                subject: cert.subject_dn.to_string(),
                reason: format!(
                    "path length constraint {path_len} exceeded: {intervening} certificate(s) follow it before the leaf"
                ),
            });
            return;
        }
    }

    result.add_success(format!("{} is a valid intermediate CA", cert.subject_dn));
}

fn validate_critical_extensions(cert: &Certificate, result: &mut ValidationResult) {
    for oid in &cert.extensions.critical_oids {
        if !RECOGNIZED_CRITICAL_OIDS.contains(&oid.as_str()) {
            result.add_error(ValidationError::UnknownCriticalExtension {
                subject: cert.subject_dn.to_string(),
                oid: oid.clone(),
            });
        }
    }
}

fn validate_leaf_key_usage(leaf: &Certificate, options: &ValidationOptions, result: &mut ValidationResult) {
    if options.validate_key_usage && !options.expected_key_usage.is_empty() {
        let required = crate::cert::extensions::KeyUsage::from_bits(options.expected_key_usage.iter().copied());
        let satisfied = leaf
            .extensions
            .key_usage
            .as_ref()
            .map(|ku| ku.satisfies(&required))
            .unwrap_or(false);
        if !satisfied {
            result.add_error(ValidationError::MissingKeyUsage {
                subject: leaf.subject_dn.to_string(),
                required: format!("{:?}", options.expected_key_usage),
            });
        }
    }

    if options.validate_extended_key_usage && !options.expected_eku.is_empty() {
        let required =
            crate::cert::extensions::ExtendedKeyUsage::from_purposes(options.expected_eku.iter().cloned());
        let satisfied = leaf
            .extensions
            .extended_key_usage
            .as_ref()
            .map(|eku| eku.satisfies(&required))
            .unwrap_or(false);
        if !satisfied {
            result.add_error(ValidationError::MissingExtendedKeyUsage {
                subject: leaf.subject_dn.to_string(),
                required: format!("{:?}", options.expected_eku),
            });
        }
    }
}

fn validate_leaf_hostname(leaf: &Certificate, options: &ValidationOptions, result: &mut ValidationResult) {
    let Some(hostname) = &options.expected_hostname else {
        return;
    };
    if !options.validate_san {
        result.add_warning("hostname validation requested but validate_san is disabled".to_string());
        return;
    }

    let matched = match &leaf.extensions.subject_alt_name {
        Some(san) if !san.is_empty() => san.matches_hostname(hostname),
        _ => leaf
            .subject_dn
            .common_name()
            .map(|cn| cn.eq_ignore_ascii_case(hostname))
            .unwrap_or(false),
    };

    if matched {
        result.add_success(format!("{hostname} matches {}", leaf.subject_dn));
    } else {
        result.add_error(ValidationError::HostnameMismatch {
            subject: leaf.subject_dn.to_string(),
            expected: hostname.clone(),
        });
    }
}

fn validate_policies(chain: &Chain, options: &ValidationOptions, result: &mut ValidationResult) {
    if options.expected_policies.is_empty() {
        return;
    }
    let leaf = chain.leaf();
    for required in &options.expected_policies {
        let satisfied = leaf
            .extensions
            .certificate_policies
            .as_ref()
            .map(|p| p.satisfies(required))
            .unwrap_or(false);
        if satisfied {
            result.add_success(format!("policy {required} satisfied by {}", leaf.subject_dn));
        } else {
            result.add_error(ValidationError::PolicyMismatch {
                subject: leaf.subject_dn.to_string(),
                required: required.clone(),
            });
        }
    }
}
