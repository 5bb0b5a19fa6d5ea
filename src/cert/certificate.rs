//! The decoded certificate record (§3, §4.1).
//!
//! Grounded in the teacher's `value_objects::core::Certificate`, trimmed to
//! what a validation engine needs: no `generate_*`/`sign_*` operations (out
//! of scope per the non-goals), and the `KeyAlgorithm`/`KeyPurpose` fields
//! that pulled in the deleted event-sourcing module are replaced by a
//! narrow `SignatureAlgorithm` enum scoped to the baseline this crate
//! verifies (§4.3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::cert::extensions::{
    AuthorityInfoAccess, BasicConstraints, CertificatePolicies, CrlDistributionPoints,
    ExtendedKeyUsage, KeyUsage, SubjectAltName,
};
use crate::name::DistinguishedName;
use crate::ports::signature::SignatureVerifier;

/// Signature algorithms this engine's signature verifier port recognizes
/// (§4.3's baseline: RSA-PKCS1-v1.5 and ECDSA, each over SHA-1/256/384/512).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    RsaPkcs1Sha1,
    RsaPkcs1Sha256,
    RsaPkcs1Sha384,
    RsaPkcs1Sha512,
    EcdsaSha1,
    EcdsaSha256,
    EcdsaSha384,
    EcdsaSha512,
}

impl SignatureAlgorithm {
    /// Signature algorithm OID as it appears in the certificate's
    /// `signatureAlgorithm` field.
    pub fn oid(self) -> &'static str {
        match self {
            Self::RsaPkcs1Sha1 => "1.2.840.113549.1.1.5",
            Self::RsaPkcs1Sha256 => "1.2.840.113549.1.1.11",
            Self::RsaPkcs1Sha384 => "1.2.840.113549.1.1.12",
            Self::RsaPkcs1Sha512 => "1.2.840.113549.1.1.13",
            Self::EcdsaSha1 => "1.2.840.10045.4.1",
            Self::EcdsaSha256 => "1.2.840.10045.4.3.2",
            Self::EcdsaSha384 => "1.2.840.10045.4.3.3",
            Self::EcdsaSha512 => "1.2.840.10045.4.3.4",
        }
    }

    pub fn from_oid(oid: &str) -> Option<Self> {
        Some(match oid {
            "1.2.840.113549.1.1.5" => Self::RsaPkcs1Sha1,
            "1.2.840.113549.1.1.11" => Self::RsaPkcs1Sha256,
            "1.2.840.113549.1.1.12" => Self::RsaPkcs1Sha384,
            "1.2.840.113549.1.1.13" => Self::RsaPkcs1Sha512,
            "1.2.840.10045.4.1" => Self::EcdsaSha1,
            "1.2.840.10045.4.3.2" => Self::EcdsaSha256,
            "1.2.840.10045.4.3.3" => Self::EcdsaSha384,
            "1.2.840.10045.4.3.4" => Self::EcdsaSha512,
            _ => return None,
        })
    }
}

/// The subject public key, as opaque SPKI bytes plus an algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub algorithm: SignatureAlgorithm,
    /// Raw key bytes (modulus||exponent for RSA handed to `ring` as-is, or
    /// the uncompressed EC point for ECDSA) — not the full SPKI DER.
    pub key_bytes: Vec<u8>,
    /// The complete SubjectPublicKeyInfo DER, used for SPKI hashing in OCSP
    /// requests (§4.8).
    pub spki_der: Vec<u8>,
}

/// All decoded extensions this crate acts on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extensions {
    pub basic_constraints: Option<BasicConstraints>,
    pub key_usage: Option<KeyUsage>,
    pub extended_key_usage: Option<ExtendedKeyUsage>,
    pub subject_alt_name: Option<SubjectAltName>,
    pub crl_distribution_points: Option<CrlDistributionPoints>,
    pub authority_info_access: Option<AuthorityInfoAccess>,
    pub certificate_policies: Option<CertificatePolicies>,
    /// OIDs of every extension marked critical, recognized or not — used by
    /// the chain validator's unknown-critical-extension check (§4.11).
    pub critical_oids: Vec<String>,
}

/// An immutable, fully decoded X.509 certificate.
///
/// Read-only after construction: nothing in this crate mutates a
/// `Certificate` once [`crate::cert::decode`] has produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub serial: Vec<u8>,
    pub issuer_dn: DistinguishedName,
    pub subject_dn: DistinguishedName,
    /// The raw DER encoding of the `subject` `Name`. OCSP's
    /// `issuer_name_hash` (§4.8) must be computed over this, never over the
    /// normalized `subject_dn` string — a prior implementation this crate
    /// is not repeating fell back to a placeholder string here, which
    /// silently produced wrong issuer-name hashes (see design notes' open
    /// questions). There is no fallback: decoding fails loudly instead.
    pub subject_dn_der: Vec<u8>,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub public_key: PublicKey,
    /// The ASN.1 `tbsCertificate` bytes — what the signature covers.
    pub tbs_bytes: Vec<u8>,
    pub signature_bytes: Vec<u8>,
    pub signature_algorithm: SignatureAlgorithm,
    pub extensions: Extensions,
    /// The certificate's own encoded form, retained for fingerprinting and
    /// re-export.
    pub der: Vec<u8>,
}

impl Certificate {
    /// SHA-256 fingerprint of the DER encoding, hex-encoded.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.der))
    }

    /// `is_ca` per Basic Constraints, defaulting to `false` when absent
    /// (RFC 5280: a certificate without the extension is not a CA).
    pub fn is_ca(&self) -> bool {
        self.extensions
            .basic_constraints
            .as_ref()
            .map(|bc| bc.is_ca())
            .unwrap_or(false)
    }

    /// DN equality holds; does NOT verify the signature. See
    /// [`Certificate::is_self_signed`] for the full predicate §4.1 requires.
    pub fn dn_self_signed(&self) -> bool {
        self.issuer_dn == self.subject_dn
    }

    /// The full self-signed predicate §4.1 requires: DN equality **and** the
    /// certificate's own signature verifies against its own public key. DN
    /// equality alone is forgeable by anyone who can mint a certificate;
    /// callers deciding whether a certificate may stand in as its own trust
    /// anchor must check both conjuncts.
    pub fn is_self_signed(&self, verifier: &dyn SignatureVerifier) -> bool {
        self.dn_self_signed()
            && matches!(
                verifier.verify(
                    &self.tbs_bytes,
                    &self.signature_bytes,
                    &self.public_key.key_bytes,
                    self.signature_algorithm,
                ),
                Ok(true)
            )
    }

    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        at >= self.not_before && at <= self.not_after
    }

    /// First CRL distribution point URL, if any.
    pub fn crl_urls(&self) -> &[String] {
        self.extensions
            .crl_distribution_points
            .as_ref()
            .map(|cdp| cdp.urls.as_slice())
            .unwrap_or(&[])
    }

    /// OCSP responder URLs from the Authority Information Access extension.
    pub fn ocsp_urls(&self) -> &[String] {
        self.extensions
            .authority_info_access
            .as_ref()
            .map(|aia| aia.ocsp_urls.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cert(subject: &str, issuer: &str) -> Certificate {
        Certificate {
            serial: vec![0x01],
            issuer_dn: DistinguishedName::new(issuer),
            subject_dn: DistinguishedName::new(subject),
            subject_dn_der: subject.as_bytes().to_vec(),
            not_before: Utc::now() - chrono::Duration::days(1),
            not_after: Utc::now() + chrono::Duration::days(1),
            public_key: PublicKey {
                algorithm: SignatureAlgorithm::EcdsaSha256,
                key_bytes: vec![1, 2, 3],
                spki_der: vec![4, 5, 6],
            },
            tbs_bytes: vec![9, 9, 9],
            signature_bytes: vec![8, 8, 8],
            signature_algorithm: SignatureAlgorithm::EcdsaSha256,
            extensions: Extensions::default(),
            der: vec![0u8; 16],
        }
    }

    #[test]
    fn fingerprint_is_deterministic_and_sized() {
        let cert = sample_cert("CN=a", "CN=a");
        let fp1 = cert.fingerprint();
        let fp2 = cert.fingerprint();
        assert_eq!(fp1, fp2);
        assert_eq!(fp1.len(), 64);
    }

    #[test]
    fn dn_self_signed_ignores_signature() {
        let cert = sample_cert("CN=a", "CN=a");
        assert!(cert.dn_self_signed());
        let cert = sample_cert("CN=a", "CN=b");
        assert!(!cert.dn_self_signed());
    }

    struct StubVerifier(bool);
    impl SignatureVerifier for StubVerifier {
        fn verify(
            &self,
            _tbs: &[u8],
            _sig: &[u8],
            _key: &[u8],
            _alg: SignatureAlgorithm,
        ) -> Result<bool, crate::ports::signature::CryptoError> {
            Ok(self.0)
        }
    }

    #[test]
    fn is_self_signed_requires_both_dn_equality_and_signature() {
        let cert = sample_cert("CN=a", "CN=a");
        assert!(cert.is_self_signed(&StubVerifier(true)));
        assert!(!cert.is_self_signed(&StubVerifier(false)));

        let cert = sample_cert("CN=a", "CN=b");
        assert!(!cert.is_self_signed(&StubVerifier(true)));
    }

    #[test]
    fn default_is_ca_is_false_when_extension_absent() {
        let cert = sample_cert("CN=leaf", "CN=ca");
        assert!(!cert.is_ca());
    }

    #[test]
    fn is_valid_at_respects_bounds() {
        let cert = sample_cert("CN=a", "CN=b");
        assert!(cert.is_valid_at(Utc::now()));
        assert!(!cert.is_valid_at(cert.not_before - chrono::Duration::seconds(1)));
        assert!(!cert.is_valid_at(cert.not_after + chrono::Duration::seconds(1)));
    }
}
