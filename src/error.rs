//! Top-level error taxonomy for certificate chain validation.
//!
//! Each subsystem that can fail in more than one semantically distinct way
//! owns its own closed error enum (`DecodeError` in [`crate::cert::decode`],
//! `ChainError` in [`crate::chain`], `RevocationError` in
//! [`crate::revocation`], `CryptoError` in [`crate::ports::signature`],
//! `FetchError` in [`crate::ports::fetcher`]). `ValidationError` is the enum
//! that actually lands in a [`crate::result::ValidationResult`]'s error
//! list: it wraps the lower-level errors plus the structural/temporal/policy
//! checks the chain validator performs directly.

use thiserror::Error;

use crate::cert::DecodeError;
use crate::chain::ChainError;
use crate::ports::signature::CryptoError;
use crate::revocation::RevocationError;

/// Result alias for fallible operations that report a single [`ValidationError`].
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Closed sum type for everything that can make a chain validation fail.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// A certificate, CRL, or OCSP response could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Chain assembly failed (cycle, depth, no issuer found, untrusted root).
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// A certificate was evaluated outside its `not_before`/`not_after` window.
    #[error("certificate {subject} not yet valid: not_before={not_before}, now={now}")]
    NotYetValid {
        subject: String,
        not_before: chrono::DateTime<chrono::Utc>,
        now: chrono::DateTime<chrono::Utc>,
    },

    /// A certificate was evaluated after its `not_after` bound.
    #[error("certificate {subject} expired: not_after={not_after}, now={now}")]
    Expired {
        subject: String,
        not_after: chrono::DateTime<chrono::Utc>,
        now: chrono::DateTime<chrono::Utc>,
    },

    /// Issuer DN of `subject` does not match subject DN of the next chain link.
    #[error("issuer mismatch: {subject_cert} claims issuer {claimed_issuer:?} but next link in chain is {actual_issuer:?}")]
    IssuerMismatch {
        subject_cert: String,
        claimed_issuer: String,
        actual_issuer: String,
    },

    /// Signature verification failed or the port reported an unsupported algorithm.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A non-root link in the chain lacked a CA basic-constraints flag, or a
    /// path-length constraint was exceeded.
    #[error("{subject} is not a valid intermediate CA: {reason}")]
    NotAValidCa { subject: String, reason: String },

    /// An extension marked critical was not in the recognized set.
    #[error("unrecognized critical extension {oid} on {subject}")]
    UnknownCriticalExtension { subject: String, oid: String },

    /// The caller required a key usage bit that the leaf does not set.
    #[error("certificate {subject} missing required key usage {required}")]
    MissingKeyUsage { subject: String, required: String },

    /// The caller required an extended key usage OID the leaf does not set.
    #[error("certificate {subject} missing required extended key usage {required}")]
    MissingExtendedKeyUsage { subject: String, required: String },

    /// `expected_hostname` did not match any SAN entry (or CN fallback).
    #[error("hostname {expected} does not match any name in certificate {subject}")]
    HostnameMismatch { subject: String, expected: String },

    /// A required certificate policy OID was absent from the chain.
    #[error("required certificate policy {required} not asserted by {subject}")]
    PolicyMismatch { subject: String, required: String },

    /// Revocation checking under the active policy concluded the cert is revoked
    /// or, under `HardFail`, that revocation status could not be determined.
    #[error(transparent)]
    Revocation(#[from] RevocationError),
}
