//! OCSP response decoding (§4.2, §4.8 step 4).
//!
//! Mirrors `cyrup-ai-sweetmcp`'s `OcspCache::parse_ocsp_response`: decode
//! the outer `OcspResponse`, check `response_status`, then decode the
//! embedded `BasicOcspResponse` and read off the single response for the
//! certificate in question — except here decoding and judging are kept
//! separate (§4.2's total-decode contract), so this function never
//! compares against a caller-supplied expected nonce/serial; the client
//! (§4.8) does that after decoding succeeds.

use chrono::{DateTime, Utc};
use der::Decode;
use thiserror::Error;
use x509_cert::ext::pkix::CrlReason;
use x509_ocsp::{BasicOcspResponse, CertStatus as WireCertStatus, OcspResponse as WireOcspResponse};

use crate::cert::certificate::SignatureAlgorithm;
use crate::crl::model::RevocationReason;
use crate::ocsp::model::{CertStatus, OcspResponse, ResponseStatus};

const OCSP_NONCE_OID: &str = crate::ocsp::request::OCSP_NONCE_OID;

#[derive(Debug, Clone, Error)]
pub enum OcspDecodeError {
    #[error("invalid DER structure: {0}")]
    Der(String),
    #[error("OCSP response had no responseBytes despite a successful status")]
    MissingResponseBytes,
    #[error("failed to decode embedded BasicOCSPResponse: {0}")]
    BasicResponse(String),
    #[error("BasicOCSPResponse contained no single responses")]
    NoSingleResponse,
    #[error("unsupported signature algorithm OID {0}")]
    UnsupportedSignatureAlgorithm(String),
    #[error("response had no usable producedAt/thisUpdate timestamp")]
    InvalidTimestamp,
}

/// Decode a byte buffer into either a bare [`ResponseStatus`] (for anything
/// other than `successful`) or a fully decoded [`OcspResponse`].
pub fn parse_response(bytes: &[u8]) -> Result<(ResponseStatus, Option<OcspResponse>), OcspDecodeError> {
    let wire = WireOcspResponse::from_der(bytes).map_err(|e| OcspDecodeError::Der(e.to_string()))?;

    let status = map_response_status(wire.response_status);
    if status != ResponseStatus::Successful {
        return Ok((status, None));
    }

    let response_bytes = wire
        .response_bytes
        .ok_or(OcspDecodeError::MissingResponseBytes)?;

    let basic = BasicOcspResponse::from_der(response_bytes.response.as_bytes())
        .map_err(|e| OcspDecodeError::BasicResponse(e.to_string()))?;

    let signature_algorithm =
        SignatureAlgorithm::from_oid(&basic.signature_algorithm.algorithm.to_string()).ok_or_else(|| {
            OcspDecodeError::UnsupportedSignatureAlgorithm(basic.signature_algorithm.algorithm.to_string())
        })?;

    let produced_at = generalized_time_to_datetime(&basic.tbs_response_data.produced_at.0)
        .ok_or(OcspDecodeError::InvalidTimestamp)?;

    let single = basic
        .tbs_response_data
        .responses
        .first()
        .ok_or(OcspDecodeError::NoSingleResponse)?;

    let this_update = generalized_time_to_datetime(&single.this_update.0)
        .ok_or(OcspDecodeError::InvalidTimestamp)?;
    let next_update = single
        .next_update
        .as_ref()
        .and_then(|t| generalized_time_to_datetime(&t.0));

    let cert_status = match &single.cert_status {
        WireCertStatus::Good(_) => CertStatus::Good,
        WireCertStatus::Unknown(_) => CertStatus::Unknown,
        WireCertStatus::Revoked(info) => {
            let date = generalized_time_to_datetime(&info.revocation_time.0)
                .ok_or(OcspDecodeError::InvalidTimestamp)?;
            let reason = info.revocation_reason.map(crl_reason_to_revocation_reason);
            CertStatus::Revoked { date, reason }
        }
    };

    let nonce = basic
        .tbs_response_data
        .response_extensions
        .as_ref()
        .and_then(|exts| {
            exts.iter()
                .find(|ext| ext.extn_id.to_string() == OCSP_NONCE_OID)
                .map(|ext| ext.extn_value.as_bytes().to_vec())
        });

    let certs_der = basic
        .certs
        .as_ref()
        .map(|certs| {
            certs
                .iter()
                .filter_map(|c| c.to_der().ok())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let response = OcspResponse {
        response_status: status,
        cert_status,
        produced_at,
        this_update,
        next_update,
        issuer_name_hash: single.cert_id.issuer_name_hash.as_bytes().to_vec(),
        issuer_key_hash: single.cert_id.issuer_key_hash.as_bytes().to_vec(),
        serial: single.cert_id.serial_number.as_bytes().to_vec(),
        nonce,
        signature_algorithm,
        signature_bytes: basic.signature.raw_bytes().to_vec(),
        tbs_bytes: der::Encode::to_der(&basic.tbs_response_data)
            .map_err(|e| OcspDecodeError::BasicResponse(e.to_string()))?,
        certs_der,
    };

    Ok((status, Some(response)))
}

fn map_response_status(status: x509_ocsp::OcspResponseStatus) -> ResponseStatus {
    use x509_ocsp::OcspResponseStatus as W;
    match status {
        W::Successful => ResponseStatus::Successful,
        W::MalformedRequest => ResponseStatus::MalformedRequest,
        W::InternalError => ResponseStatus::InternalError,
        W::TryLater => ResponseStatus::TryLater,
        W::SigRequired => ResponseStatus::SigRequired,
        W::Unauthorized => ResponseStatus::Unauthorized,
    }
}

fn crl_reason_to_revocation_reason(reason: CrlReason) -> RevocationReason {
    match reason {
        CrlReason::Unspecified => RevocationReason::Unspecified,
        CrlReason::KeyCompromise => RevocationReason::KeyCompromise,
        CrlReason::CaCompromise => RevocationReason::CaCompromise,
        CrlReason::AffiliationChanged => RevocationReason::AffiliationChanged,
        CrlReason::Superseded => RevocationReason::Superseded,
        CrlReason::CessationOfOperation => RevocationReason::CessationOfOperation,
        CrlReason::CertificateHold => RevocationReason::CertificateHold,
        CrlReason::RemoveFromCrl => RevocationReason::RemoveFromCrl,
        CrlReason::PrivilegeWithdrawn => RevocationReason::PrivilegeWithdrawn,
        CrlReason::AaCompromise => RevocationReason::AaCompromise,
        other => RevocationReason::Other(other as u32),
    }
}

fn generalized_time_to_datetime(time: &der::asn1::GeneralizedTime) -> Option<DateTime<Utc>> {
    let unix = time.to_unix_duration().as_secs();
    DateTime::from_timestamp(unix as i64, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_der() {
        let err = parse_response(&[0x00, 0x01, 0x02]).unwrap_err();
        matches!(err, OcspDecodeError::Der(_));
    }
}
