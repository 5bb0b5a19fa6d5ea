//! Production [`SignatureVerifier`] backed by `ring`.
//!
//! This is the crate's one real cryptographic adapter; everything upstream
//! of it only ever sees the port. Grounded in `ring::signature`'s verify
//! family the way `examples/cyrup-ai-sweetmcp`'s OCSP client uses
//! `ring::digest` for hashing — the same crate, the adjacent API surface.

use ring::signature::{self, UnparsedPublicKey, VerificationAlgorithm};

use crate::cert::certificate::SignatureAlgorithm;
use crate::ports::signature::{CryptoError, SignatureVerifier};

/// Verifies RSA-PKCS1-v1.5 and ECDSA signatures over SHA-1/256/384/512,
/// the baseline §4.3 calls for. SHA-1 variants are accepted for RFC 6960
/// OCSP interoperability per the design notes, not because SHA-1 is
/// recommended for new signatures.
#[derive(Debug, Default, Clone, Copy)]
pub struct RingSignatureVerifier;

impl RingSignatureVerifier {
    pub fn new() -> Self {
        Self
    }

    fn algorithm(alg: SignatureAlgorithm) -> Option<&'static dyn VerificationAlgorithm> {
        Some(match alg {
            SignatureAlgorithm::RsaPkcs1Sha1 => &signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY,
            SignatureAlgorithm::RsaPkcs1Sha256 => &signature::RSA_PKCS1_2048_8192_SHA256,
            SignatureAlgorithm::RsaPkcs1Sha384 => &signature::RSA_PKCS1_2048_8192_SHA384,
            SignatureAlgorithm::RsaPkcs1Sha512 => &signature::RSA_PKCS1_2048_8192_SHA512,
            SignatureAlgorithm::EcdsaSha256 => &signature::ECDSA_P256_SHA256_ASN1,
            SignatureAlgorithm::EcdsaSha384 => &signature::ECDSA_P384_SHA384_ASN1,
            // ring implements no ECDSA-with-SHA1 or ECDSA-with-SHA512
            // verification algorithm; returning `None` here routes both to
            // `UnsupportedAlgorithm` below instead of silently verifying
            // against a different digest than the one actually signed.
            SignatureAlgorithm::EcdsaSha1 | SignatureAlgorithm::EcdsaSha512 => return None,
        })
    }
}

impl SignatureVerifier for RingSignatureVerifier {
    fn verify(
        &self,
        tbs_bytes: &[u8],
        signature_bytes: &[u8],
        public_key: &[u8],
        algorithm: SignatureAlgorithm,
    ) -> Result<bool, CryptoError> {
        let Some(verification_algorithm) = Self::algorithm(algorithm) else {
            return Err(CryptoError::UnsupportedAlgorithm(algorithm));
        };
        let key = UnparsedPublicKey::new(verification_algorithm, public_key);
        Ok(key.verify(tbs_bytes, signature_bytes).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_ecdsa_sha1_is_unsupported_not_invalid() {
        let verifier = RingSignatureVerifier::new();
        let err = verifier
            .verify(b"tbs", b"sig", b"key", SignatureAlgorithm::EcdsaSha1)
            .unwrap_err();
        matches!(err, CryptoError::UnsupportedAlgorithm(_));
    }

    #[test]
    fn unsupported_ecdsa_sha512_is_unsupported_not_silently_downgraded() {
        let verifier = RingSignatureVerifier::new();
        let err = verifier
            .verify(b"tbs", b"sig", b"key", SignatureAlgorithm::EcdsaSha512)
            .unwrap_err();
        matches!(err, CryptoError::UnsupportedAlgorithm(_));
    }

    #[test]
    fn garbage_signature_verifies_false_not_error() {
        let verifier = RingSignatureVerifier::new();
        let result = verifier
            .verify(b"tbs", b"not-a-signature", b"not-a-key", SignatureAlgorithm::RsaPkcs1Sha256)
            .unwrap();
        assert!(!result);
    }
}
