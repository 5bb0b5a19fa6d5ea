//! Signature verifier port (§4.3).
//!
//! The core never links a cryptography crate in its validation logic
//! directly; it calls through this port. Named in the teacher's
//! `ports::x509::X509Error` style (`VerificationFailed`, `UnsupportedAlgorithm`)
//! but narrowed to exactly what verification needs.

use thiserror::Error;

use crate::cert::certificate::SignatureAlgorithm;

/// Errors the signature verifier port can report. Distinct from "signature
/// invalid" (`Ok(false)`, a normal verification outcome, not an error).
#[derive(Debug, Clone, Error)]
pub enum CryptoError {
    #[error("unsupported signature algorithm: {0:?}")]
    UnsupportedAlgorithm(SignatureAlgorithm),
    #[error("malformed public key: {0}")]
    MalformedPublicKey(String),
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
}

/// `verify(tbs_bytes, signature_bytes, public_key, algorithm) -> Result<bool, CryptoError>`.
///
/// Implementations are synchronous: signature verification never performs
/// I/O. An unknown/disabled algorithm returns `Err(UnsupportedAlgorithm)`,
/// never a silent `Ok(true)` — the teacher repo's TLS manager once shipped a
/// verifier stub that always returned `Ok(true)`; this port's contract
/// explicitly rules that out.
pub trait SignatureVerifier: Send + Sync {
    fn verify(
        &self,
        tbs_bytes: &[u8],
        signature_bytes: &[u8],
        public_key: &[u8],
        algorithm: SignatureAlgorithm,
    ) -> Result<bool, CryptoError>;
}
