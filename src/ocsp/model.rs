//! The decoded OCSP response value object (§3 OCSP response).
//!
//! Shaped like [`crate::crl::model::Crl`]: a plain, already-validated-free
//! record produced by [`crate::ocsp::decode::parse_response`]; the client
//! (§4.8) is the only place that judges it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cert::certificate::SignatureAlgorithm;
use crate::crl::model::RevocationReason;

/// RFC 6960 §4.2.1 `OCSPResponseStatus`. Only `Successful` carries a body;
/// every other variant means the responder refused or failed the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    Successful,
    MalformedRequest,
    InternalError,
    TryLater,
    SigRequired,
    Unauthorized,
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Successful => "successful",
            Self::MalformedRequest => "malformedRequest",
            Self::InternalError => "internalError",
            Self::TryLater => "tryLater",
            Self::SigRequired => "sigRequired",
            Self::Unauthorized => "unauthorized",
        };
        write!(f, "{s}")
    }
}

/// Per-certificate status carried by a successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CertStatus {
    Good,
    Revoked {
        date: DateTime<Utc>,
        reason: Option<RevocationReason>,
    },
    Unknown,
}

/// A fully decoded OCSP response. Present only when `response_status` is
/// `Successful`; the decoder returns [`ResponseStatus`] alone otherwise (see
/// [`crate::ocsp::decode::parse_response`]'s return type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcspResponse {
    pub response_status: ResponseStatus,
    pub cert_status: CertStatus,
    pub produced_at: DateTime<Utc>,
    pub this_update: DateTime<Utc>,
    pub next_update: Option<DateTime<Utc>>,
    pub issuer_name_hash: Vec<u8>,
    pub issuer_key_hash: Vec<u8>,
    pub serial: Vec<u8>,
    pub nonce: Option<Vec<u8>>,
    pub signature_algorithm: SignatureAlgorithm,
    pub signature_bytes: Vec<u8>,
    pub tbs_bytes: Vec<u8>,
    /// Embedded responder certificates, DER-encoded. Used to find a
    /// delegated OCSP signing certificate per §4.8's signature step.
    pub certs_der: Vec<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_status_display_matches_rfc_names() {
        assert_eq!(ResponseStatus::Successful.to_string(), "successful");
        assert_eq!(ResponseStatus::TryLater.to_string(), "tryLater");
    }
}
