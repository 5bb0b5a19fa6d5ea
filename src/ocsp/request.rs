//! OCSP request construction (§4.8 step 1, §6).
//!
//! Grounded in `cyrup-ai-sweetmcp`'s `OcspCache::create_ocsp_request`: the
//! same `x509_ocsp`/`der` request shape (`CertId` wrapped in a
//! single-entry `TbsRequest`), generalized to build the hash inputs from
//! this crate's own [`Certificate`] rather than a pingora-specific
//! `ParsedCertificate`. The issuer hash algorithm defaults to SHA-1, not
//! SHA-256, matching RFC 6960's own `CertID` default and kept that way
//! deliberately for interoperability with legacy responders that reject a
//! `CertID` built with anything else; callers that want SHA-256 must ask
//! for it explicitly via [`HashAlgorithm::Sha256`].

use der::asn1::{ObjectIdentifier, OctetString};
use der::Encode;
use rand::RngCore;
use ring::digest;
use thiserror::Error;
use x509_cert::ext::Extension;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::AlgorithmIdentifierOwned;
use x509_ocsp::{CertId, OcspRequest, Request, TbsRequest, Version};

use crate::cert::Certificate;

/// OID for SHA-1 as used in `AlgorithmIdentifier` (id-sha1), RFC 6960's
/// `CertID` default.
const SHA1_OID: &str = "1.3.14.3.2.26";
/// OID for SHA-256 as used in `AlgorithmIdentifier` (id-sha256).
const SHA256_OID: &str = "2.16.840.1.101.3.4.2.1";
/// OID for the OCSP nonce extension (id-pkix-ocsp-nonce), RFC 6960 §4.4.1.
pub const OCSP_NONCE_OID: &str = "1.3.6.1.5.5.7.48.1.2";

/// The digest algorithm a `CertID`'s `issuer_name_hash`/`issuer_key_hash`
/// are computed with. RFC 6960 interoperability, not cryptographic
/// strength, is why SHA-1 remains the default (§9's design notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    pub(crate) fn oid(self) -> &'static str {
        match self {
            Self::Sha1 => SHA1_OID,
            Self::Sha256 => SHA256_OID,
        }
    }

    pub(crate) fn digest(self, input: &[u8]) -> Vec<u8> {
        let algorithm = match self {
            Self::Sha1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
            Self::Sha256 => &digest::SHA256,
        };
        digest::digest(algorithm, input).as_ref().to_vec()
    }
}

#[derive(Debug, Clone, Error)]
pub enum RequestBuildError {
    #[error("invalid serial number: {0}")]
    InvalidSerial(String),
    #[error("failed to encode OCSP request: {0}")]
    Encode(String),
}

/// What a request committed to, kept alongside the DER bytes so the client
/// can validate the matching response's binding and nonce (§4.8's
/// validation steps) without re-deriving them.
#[derive(Debug, Clone)]
pub struct OcspRequestContext {
    pub der: Vec<u8>,
    pub hash_algorithm: HashAlgorithm,
    pub issuer_name_hash: Vec<u8>,
    pub issuer_key_hash: Vec<u8>,
    pub serial: Vec<u8>,
    pub nonce: Option<Vec<u8>>,
}

/// Build an OCSP request for `cert` issued by `issuer`. `use_nonce`
/// generates 16 cryptographically random nonce bytes and attaches them as
/// a request extension (§4.8 step 1). `hash_algorithm` picks the digest
/// `issuer_name_hash`/`issuer_key_hash` are computed with.
pub fn build_request(
    cert: &Certificate,
    issuer: &Certificate,
    use_nonce: bool,
    hash_algorithm: HashAlgorithm,
) -> Result<OcspRequestContext, RequestBuildError> {
    let issuer_name_hash = hash_algorithm.digest(&issuer.subject_dn_der);
    let issuer_key_hash = hash_algorithm.digest(&issuer.public_key.spki_der);

    let serial = SerialNumber::new(&cert.serial)
        .map_err(|e| RequestBuildError::InvalidSerial(e.to_string()))?;

    let cert_id = CertId {
        hash_algorithm: AlgorithmIdentifierOwned {
            oid: ObjectIdentifier::new(hash_algorithm.oid())
                .map_err(|e| RequestBuildError::Encode(e.to_string()))?,
            parameters: None,
        },
        issuer_name_hash: OctetString::new(issuer_name_hash.clone())
            .map_err(|e| RequestBuildError::Encode(e.to_string()))?,
        issuer_key_hash: OctetString::new(issuer_key_hash.clone())
            .map_err(|e| RequestBuildError::Encode(e.to_string()))?,
        serial_number: serial,
    };

    let nonce = if use_nonce {
        let mut bytes = vec![0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Some(bytes)
    } else {
        None
    };

    let request_extensions = nonce.as_ref().map(|n| {
        vec![Extension {
            extn_id: ObjectIdentifier::new(OCSP_NONCE_OID).expect("valid static OID"),
            critical: false,
            extn_value: OctetString::new(n.clone()).expect("nonce fits in an OCTET STRING"),
        }]
    });

    let tbs_request = TbsRequest {
        version: Version::V1,
        requestor_name: None,
        request_list: vec![Request {
            req_cert: cert_id,
            single_request_extensions: None,
        }],
        request_extensions,
    };

    let request = OcspRequest {
        tbs_request,
        optional_signature: None,
    };

    let der = request
        .to_der()
        .map_err(|e| RequestBuildError::Encode(e.to_string()))?;

    Ok(OcspRequestContext {
        der,
        issuer_name_hash,
        issuer_key_hash,
        serial: cert.serial.clone(),
        nonce,
    })
}

/// RFC 6960 Appendix A.1's GET-encoding alternative: base64url of the DER
/// request, appended to the responder's base URL. Present to satisfy the
/// producing side of §6's external-interfaces contract; this crate's own
/// client always prefers POST via [`crate::ports::fetcher::RevocationFetcher::post`].
pub fn ocsp_get_url(base_url: &str, request_der: &[u8]) -> String {
    use base64::Engine;
    let encoded = base64::engine::general_purpose::URL_SAFE.encode(request_der);
    format!("{}/{}", base_url.trim_end_matches('/'), encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::certificate::{PublicKey, SignatureAlgorithm};
    use crate::name::DistinguishedName;
    use chrono::Utc;

    fn sample_cert(serial: u8) -> Certificate {
        Certificate {
            serial: vec![serial],
            issuer_dn: DistinguishedName::new("CN=ca"),
            subject_dn: DistinguishedName::new("CN=leaf"),
            subject_dn_der: b"CN=leaf".to_vec(),
            not_before: Utc::now() - chrono::Duration::days(1),
            not_after: Utc::now() + chrono::Duration::days(1),
            public_key: PublicKey {
                algorithm: SignatureAlgorithm::EcdsaSha256,
                key_bytes: vec![1, 2, 3],
                spki_der: vec![9, 9, 9],
            },
            tbs_bytes: vec![],
            signature_bytes: vec![],
            signature_algorithm: SignatureAlgorithm::EcdsaSha256,
            extensions: Default::default(),
            der: vec![],
        }
    }

    #[test]
    fn nonce_is_sixteen_bytes_when_requested() {
        let cert = sample_cert(1);
        let issuer = sample_cert(2);
        let ctx = build_request(&cert, &issuer, true, HashAlgorithm::default()).unwrap();
        assert_eq!(ctx.nonce.as_ref().map(Vec::len), Some(16));
        assert!(!ctx.der.is_empty());
    }

    #[test]
    fn no_nonce_when_disabled() {
        let cert = sample_cert(1);
        let issuer = sample_cert(2);
        let ctx = build_request(&cert, &issuer, false, HashAlgorithm::default()).unwrap();
        assert!(ctx.nonce.is_none());
    }

    #[test]
    fn get_url_is_base64_appended_to_base() {
        let url = ocsp_get_url("http://ocsp.example.com/", &[1, 2, 3]);
        assert!(url.starts_with("http://ocsp.example.com/"));
        assert!(!url.ends_with("//"));
    }
}
