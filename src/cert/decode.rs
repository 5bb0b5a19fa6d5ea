//! Certificate decoding: the one place this crate reaches into a DER/ASN.1
//! parsing library.
//!
//! Adapted from the teacher's `crypto::rfc5280` module, which already
//! walked `x509_parser::prelude::X509Certificate` extension-by-extension to
//! build a metadata record; here the same walk builds a [`Certificate`]
//! instead of a side validation report, since extension decoding and
//! validation are two different concerns in this crate (§4.2's decoder
//! contract: decode totally succeeds or totally fails, never partially).

use chrono::{DateTime, Utc};
use thiserror::Error;
use x509_parser::extensions::ParsedExtension;
use x509_parser::oid_registry::{
    OID_X509_EXT_AUTHORITY_INFO_ACCESS, OID_X509_EXT_BASIC_CONSTRAINTS,
    OID_X509_EXT_CERTIFICATE_POLICIES, OID_X509_EXT_CRL_DISTRIBUTION_POINTS,
    OID_X509_EXT_EXTENDED_KEY_USAGE, OID_X509_EXT_KEY_USAGE, OID_X509_EXT_NAME_CONSTRAINTS,
    OID_X509_EXT_SUBJECT_ALT_NAME,
};
use x509_parser::prelude::*;

use crate::cert::certificate::{Certificate, Extensions, PublicKey, SignatureAlgorithm};
use crate::cert::extensions::{
    AuthorityInfoAccess, BasicConstraints, CertificatePolicies, CrlDistributionPoints,
    ExtendedKeyUsage, ExtendedKeyUsagePurpose, KeyUsage, KeyUsageBit, SubjectAltName,
};
use crate::name::DistinguishedName;

/// Errors decoding a certificate from bytes. The contract is total: any
/// malformed input returns one of these, never a partially built record.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    #[error("invalid PEM envelope: {0}")]
    Pem(String),
    #[error("invalid DER structure: {0}")]
    Der(String),
    #[error("unsupported signature algorithm OID {0}")]
    UnsupportedSignatureAlgorithm(String),
    #[error("certificate validity period has no usable not_before/not_after")]
    InvalidValidityPeriod,
    #[error("certificate has no encodable subject name DER")]
    MissingSubjectDer,
}

/// Decode a PEM-encoded certificate.
pub fn decode_cert_pem(bytes: &[u8]) -> Result<Certificate, DecodeError> {
    let text = std::str::from_utf8(bytes).map_err(|e| DecodeError::Pem(e.to_string()))?;
    let pem = ::pem::parse(text).map_err(|e| DecodeError::Pem(e.to_string()))?;
    decode_cert_der(pem.contents())
}

/// Decode a DER-encoded certificate.
pub fn decode_cert_der(der: &[u8]) -> Result<Certificate, DecodeError> {
    let (_, cert) =
        X509Certificate::from_der(der).map_err(|e| DecodeError::Der(e.to_string()))?;

    let signature_algorithm = SignatureAlgorithm::from_oid(&cert.signature_algorithm.algorithm.to_id_string())
        .ok_or_else(|| {
            DecodeError::UnsupportedSignatureAlgorithm(
                cert.signature_algorithm.algorithm.to_id_string(),
            )
        })?;

    let not_before = asn1_time_to_datetime(&cert.validity().not_before)
        .ok_or(DecodeError::InvalidValidityPeriod)?;
    let not_after = asn1_time_to_datetime(&cert.validity().not_after)
        .ok_or(DecodeError::InvalidValidityPeriod)?;

    let spki_der = cert.tbs_certificate.subject_pki.raw.to_vec();
    let key_bytes = cert
        .tbs_certificate
        .subject_pki
        .subject_public_key
        .as_ref()
        .to_vec();

    let extensions = decode_extensions(&cert);

    let subject_dn_der = cert.tbs_certificate.subject.as_raw().to_vec();
    if subject_dn_der.is_empty() {
        return Err(DecodeError::MissingSubjectDer);
    }

    Ok(Certificate {
        serial: cert.raw_serial().to_vec(),
        issuer_dn: DistinguishedName::new(cert.issuer().to_string()),
        subject_dn: DistinguishedName::new(cert.subject().to_string()),
        subject_dn_der,
        not_before,
        not_after,
        public_key: PublicKey {
            algorithm: signature_algorithm,
            key_bytes,
            spki_der,
        },
        tbs_bytes: cert.tbs_certificate.as_ref().to_vec(),
        signature_bytes: cert.signature_value.as_ref().to_vec(),
        signature_algorithm,
        extensions,
        der: der.to_vec(),
    })
}

fn decode_extensions(cert: &X509Certificate) -> Extensions {
    let mut extensions = Extensions::default();

    for ext in cert.extensions() {
        if ext.critical {
            extensions.critical_oids.push(ext.oid.to_id_string());
        }

        match ext.parsed_extension() {
            ParsedExtension::BasicConstraints(bc) if ext.oid == OID_X509_EXT_BASIC_CONSTRAINTS => {
                let mut value = BasicConstraints::new(bc.ca, bc.path_len_constraint);
                value.critical = ext.critical;
                extensions.basic_constraints = Some(value);
            }
            ParsedExtension::KeyUsage(ku) if ext.oid == OID_X509_EXT_KEY_USAGE => {
                let mut bits = Vec::new();
                if ku.digital_signature() {
                    bits.push(KeyUsageBit::DigitalSignature);
                }
                if ku.non_repudiation() {
                    bits.push(KeyUsageBit::NonRepudiation);
                }
                if ku.key_encipherment() {
                    bits.push(KeyUsageBit::KeyEncipherment);
                }
                if ku.data_encipherment() {
                    bits.push(KeyUsageBit::DataEncipherment);
                }
                if ku.key_agreement() {
                    bits.push(KeyUsageBit::KeyAgreement);
                }
                if ku.key_cert_sign() {
                    bits.push(KeyUsageBit::KeyCertSign);
                }
                if ku.crl_sign() {
                    bits.push(KeyUsageBit::CrlSign);
                }
                if ku.encipher_only() {
                    bits.push(KeyUsageBit::EncipherOnly);
                }
                if ku.decipher_only() {
                    bits.push(KeyUsageBit::DecipherOnly);
                }
                extensions.key_usage = Some(KeyUsage::from_bits(bits).with_critical(ext.critical));
            }
            ParsedExtension::ExtendedKeyUsage(eku) if ext.oid == OID_X509_EXT_EXTENDED_KEY_USAGE => {
                let mut purposes = Vec::new();
                if eku.any {
                    purposes.push(ExtendedKeyUsagePurpose::AnyExtendedKeyUsage);
                }
                if eku.server_auth {
                    purposes.push(ExtendedKeyUsagePurpose::ServerAuth);
                }
                if eku.client_auth {
                    purposes.push(ExtendedKeyUsagePurpose::ClientAuth);
                }
                if eku.code_signing {
                    purposes.push(ExtendedKeyUsagePurpose::CodeSigning);
                }
                if eku.email_protection {
                    purposes.push(ExtendedKeyUsagePurpose::EmailProtection);
                }
                if eku.time_stamping {
                    purposes.push(ExtendedKeyUsagePurpose::TimeStamping);
                }
                if eku.ocsp_signing {
                    purposes.push(ExtendedKeyUsagePurpose::OcspSigning);
                }
                for oid in &eku.other {
                    purposes.push(ExtendedKeyUsagePurpose::from_oid(&oid.to_id_string()));
                }
                let mut eku_value = ExtendedKeyUsage::from_purposes(purposes);
                eku_value.critical = ext.critical;
                extensions.extended_key_usage = Some(eku_value);
            }
            ParsedExtension::SubjectAlternativeName(san) if ext.oid == OID_X509_EXT_SUBJECT_ALT_NAME => {
                let dns_names = san
                    .general_names
                    .iter()
                    .filter_map(|gn| match gn {
                        GeneralName::DNSName(name) => Some(name.to_string()),
                        _ => None,
                    })
                    .collect();
                let mut value = SubjectAltName::new(dns_names);
                value.critical = ext.critical;
                extensions.subject_alt_name = Some(value);
            }
            ParsedExtension::CRLDistributionPoints(cdp) if ext.oid == OID_X509_EXT_CRL_DISTRIBUTION_POINTS => {
                let urls = cdp
                    .iter()
                    .filter_map(|point| point.distribution_point.as_ref())
                    .flat_map(|dp| match dp {
                        DistributionPointName::FullName(names) => names
                            .iter()
                            .filter_map(|gn| match gn {
                                GeneralName::URI(uri) => Some(uri.to_string()),
                                _ => None,
                            })
                            .collect::<Vec<_>>(),
                        DistributionPointName::NameRelativeToCRLIssuer(_) => Vec::new(),
                    })
                    .collect();
                extensions.crl_distribution_points = Some(CrlDistributionPoints { urls });
            }
            ParsedExtension::AuthorityInfoAccess(aia) if ext.oid == OID_X509_EXT_AUTHORITY_INFO_ACCESS => {
                let ocsp_urls = aia
                    .accessdescs
                    .iter()
                    .filter(|ad| ad.access_method.to_id_string() == "1.3.6.1.5.5.7.48.1")
                    .filter_map(|ad| match &ad.access_location {
                        GeneralName::URI(uri) => Some(uri.to_string()),
                        _ => None,
                    })
                    .collect();
                extensions.authority_info_access = Some(AuthorityInfoAccess { ocsp_urls });
            }
            ParsedExtension::CertificatePolicies(policies)
                if ext.oid == OID_X509_EXT_CERTIFICATE_POLICIES =>
            {
                let oids = policies
                    .iter()
                    .map(|policy| policy.policy_id.to_id_string())
                    .collect();
                extensions.certificate_policies = Some(CertificatePolicies {
                    oids,
                    critical: ext.critical,
                });
            }
            _ if ext.oid == OID_X509_EXT_NAME_CONSTRAINTS => {
                // Name constraints are recognized (§4.11's known-critical set)
                // but this engine does not yet act on their contents.
            }
            _ => {}
        }
    }

    extensions
}

fn asn1_time_to_datetime(time: &x509_parser::time::ASN1Time) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.timestamp(), 0)
}
