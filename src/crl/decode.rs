//! CRL decoding (§4.2, §3 CRL).
//!
//! Same shape as [`crate::cert::decode`]: total decode, walking
//! `x509_parser`'s CRL view extension-by-extension rather than parsing
//! ASN.1 by hand.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use x509_parser::extensions::ParsedExtension;
use x509_parser::oid_registry::OID_X509_EXT_CRL_NUMBER;
use x509_parser::prelude::*;

use crate::cert::certificate::SignatureAlgorithm;
use crate::crl::model::{Crl, RevocationReason, RevokedEntry};
use crate::name::DistinguishedName;

#[derive(Debug, Clone, Error)]
pub enum CrlDecodeError {
    #[error("invalid PEM envelope: {0}")]
    Pem(String),
    #[error("invalid DER structure: {0}")]
    Der(String),
    #[error("unsupported signature algorithm OID {0}")]
    UnsupportedSignatureAlgorithm(String),
    #[error("CRL has no usable thisUpdate timestamp")]
    InvalidThisUpdate,
}

pub fn decode_crl_pem(bytes: &[u8]) -> Result<Crl, CrlDecodeError> {
    let text = std::str::from_utf8(bytes).map_err(|e| CrlDecodeError::Pem(e.to_string()))?;
    let pem = ::pem::parse(text).map_err(|e| CrlDecodeError::Pem(e.to_string()))?;
    decode_crl_der(pem.contents())
}

pub fn decode_crl_der(der: &[u8]) -> Result<Crl, CrlDecodeError> {
    let (_, crl) = parse_x509_crl(der).map_err(|e| CrlDecodeError::Der(e.to_string()))?;

    let signature_algorithm =
        SignatureAlgorithm::from_oid(&crl.signature_algorithm.algorithm.to_id_string()).ok_or_else(
            || {
                CrlDecodeError::UnsupportedSignatureAlgorithm(
                    crl.signature_algorithm.algorithm.to_id_string(),
                )
            },
        )?;

    let this_update = asn1_time_to_datetime(&crl.this_update())
        .ok_or(CrlDecodeError::InvalidThisUpdate)?;
    let next_update = crl.next_update().and_then(|t| asn1_time_to_datetime(&t));

    let crl_number = crl
        .tbs_cert_list
        .extensions()
        .find(|ext| ext.oid == OID_X509_EXT_CRL_NUMBER)
        .and_then(|ext| match ext.parsed_extension() {
            ParsedExtension::CRLNumber(n) => {
                let bytes = n.to_bytes_be();
                let mut buf = [0u8; 8];
                let start = 8usize.saturating_sub(bytes.len());
                let take = bytes.len().min(8);
                buf[start..].copy_from_slice(&bytes[bytes.len() - take..]);
                Some(u64::from_be_bytes(buf))
            }
            _ => None,
        })
        .unwrap_or(0);

    let mut entries = HashMap::new();
    for revoked in crl.iter_revoked_certificates() {
        let serial = revoked.user_certificate.to_bytes_be();
        let revocation_date = asn1_time_to_datetime(&revoked.revocation_date)
            .ok_or(CrlDecodeError::InvalidThisUpdate)?;

        let mut reason_code = None;
        let mut invalidity_date = None;
        for ext in revoked.extensions() {
            match ext.parsed_extension() {
                ParsedExtension::ReasonCode(code) => {
                    reason_code = Some(RevocationReason::from_code(u32::from(code.0)));
                }
                ParsedExtension::InvalidityDate(time) => {
                    invalidity_date = asn1_time_to_datetime(time);
                }
                _ => {}
            }
        }

        entries.insert(
            serial,
            RevokedEntry {
                revocation_date,
                reason_code,
                invalidity_date,
            },
        );
    }

    Ok(Crl {
        issuer_dn: DistinguishedName::new(crl.issuer().to_string()),
        this_update,
        next_update,
        crl_number,
        signature_algorithm,
        signature_bytes: crl.signature_value.as_ref().to_vec(),
        tbs_bytes: crl.tbs_cert_list.as_ref().to_vec(),
        entries,
    })
}

fn asn1_time_to_datetime(time: &x509_parser::time::ASN1Time) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.timestamp(), 0)
}
