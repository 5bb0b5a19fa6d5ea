//! Decoded X.509 extension values.
//!
//! `KeyUsage`/`ExtendedKeyUsage`/`BasicConstraints` are adapted from the
//! teacher's `value_objects::x509::{key_usage, basic_constraints}` modules
//! with the `cim_domain::{DomainConcept, ValueObject}` marker-trait impls
//! removed — those traits come from an internal workspace crate this crate
//! has no use for, and the value objects are complete without them.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single Key Usage bit (RFC 5280 §4.2.1.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyUsageBit {
    DigitalSignature,
    NonRepudiation,
    KeyEncipherment,
    DataEncipherment,
    KeyAgreement,
    KeyCertSign,
    CrlSign,
    EncipherOnly,
    DecipherOnly,
}

impl KeyUsageBit {
    /// Bit position per RFC 5280's `KeyUsage ::= BIT STRING`.
    pub fn bit_position(self) -> u8 {
        match self {
            Self::DigitalSignature => 0,
            Self::NonRepudiation => 1,
            Self::KeyEncipherment => 2,
            Self::DataEncipherment => 3,
            Self::KeyAgreement => 4,
            Self::KeyCertSign => 5,
            Self::CrlSign => 6,
            Self::EncipherOnly => 7,
            Self::DecipherOnly => 8,
        }
    }
}

/// The Key Usage extension: a set of asserted bits plus its criticality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyUsage {
    bits: HashSet<KeyUsageBit>,
    pub critical: bool,
}

impl KeyUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bits(bits: impl IntoIterator<Item = KeyUsageBit>) -> Self {
        Self {
            bits: bits.into_iter().collect(),
            critical: false,
        }
    }

    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    pub fn has(&self, bit: KeyUsageBit) -> bool {
        self.bits.contains(&bit)
    }

    pub fn bits(&self) -> &HashSet<KeyUsageBit> {
        &self.bits
    }

    /// Is this usable as a CA signing key per §4.11's intermediate check.
    pub fn can_sign_certs(&self) -> bool {
        self.has(KeyUsageBit::KeyCertSign)
    }

    /// Does this asserted set contain every bit `required` asserts.
    pub fn satisfies(&self, required: &KeyUsage) -> bool {
        required.bits.iter().all(|bit| self.bits.contains(bit))
    }
}

/// Extended Key Usage purpose (RFC 5280 §4.2.1.12).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtendedKeyUsagePurpose {
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    TimeStamping,
    OcspSigning,
    AnyExtendedKeyUsage,
    Custom(String),
}

impl ExtendedKeyUsagePurpose {
    pub fn oid(&self) -> &str {
        match self {
            Self::ServerAuth => "1.3.6.1.5.5.7.3.1",
            Self::ClientAuth => "1.3.6.1.5.5.7.3.2",
            Self::CodeSigning => "1.3.6.1.5.5.7.3.3",
            Self::EmailProtection => "1.3.6.1.5.5.7.3.4",
            Self::TimeStamping => "1.3.6.1.5.5.7.3.8",
            Self::OcspSigning => "1.3.6.1.5.5.7.3.9",
            Self::AnyExtendedKeyUsage => "2.5.29.37.0",
            Self::Custom(oid) => oid,
        }
    }

    pub fn from_oid(oid: &str) -> Self {
        match oid {
            "1.3.6.1.5.5.7.3.1" => Self::ServerAuth,
            "1.3.6.1.5.5.7.3.2" => Self::ClientAuth,
            "1.3.6.1.5.5.7.3.3" => Self::CodeSigning,
            "1.3.6.1.5.5.7.3.4" => Self::EmailProtection,
            "1.3.6.1.5.5.7.3.8" => Self::TimeStamping,
            "1.3.6.1.5.5.7.3.9" => Self::OcspSigning,
            "2.5.29.37.0" => Self::AnyExtendedKeyUsage,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// The Extended Key Usage extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedKeyUsage {
    purposes: HashSet<ExtendedKeyUsagePurpose>,
    pub critical: bool,
}

impl ExtendedKeyUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_purposes(purposes: impl IntoIterator<Item = ExtendedKeyUsagePurpose>) -> Self {
        Self {
            purposes: purposes.into_iter().collect(),
            critical: false,
        }
    }

    pub fn has(&self, purpose: &ExtendedKeyUsagePurpose) -> bool {
        self.purposes.contains(purpose)
    }

    pub fn purposes(&self) -> &HashSet<ExtendedKeyUsagePurpose> {
        &self.purposes
    }

    /// Does this asserted set contain every purpose `required` asserts.
    pub fn satisfies(&self, required: &ExtendedKeyUsage) -> bool {
        required.purposes.iter().all(|p| self.purposes.contains(p))
    }
}

/// Basic Constraints extension (RFC 5280 §4.2.1.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicConstraints {
    is_ca: bool,
    path_len_constraint: Option<u32>,
    pub critical: bool,
}

impl BasicConstraints {
    pub fn new(is_ca: bool, path_len_constraint: Option<u32>) -> Self {
        Self {
            is_ca,
            path_len_constraint,
            critical: is_ca,
        }
    }

    pub fn end_entity() -> Self {
        Self::new(false, None)
    }

    pub fn is_ca(&self) -> bool {
        self.is_ca
    }

    pub fn path_len_constraint(&self) -> Option<u32> {
        self.path_len_constraint
    }
}

impl Default for BasicConstraints {
    fn default() -> Self {
        Self::end_entity()
    }
}

impl fmt::Display for BasicConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_ca, self.path_len_constraint) {
            (false, _) => write!(f, "CA:FALSE"),
            (true, None) => write!(f, "CA:TRUE"),
            (true, Some(n)) => write!(f, "CA:TRUE, pathlen:{n}"),
        }
    }
}

/// Subject Alternative Name entries this crate cares about for hostname
/// matching and OCSP/CRL URL extraction. Unlike the teacher's much larger
/// `SubjectAlternativeName` value object (which models email and directory
/// names too), only DNS names and the handful of URL-bearing extensions the
/// validator actually dispatches on are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAltName {
    pub dns_names: Vec<String>,
    pub critical: bool,
}

impl SubjectAltName {
    pub fn new(dns_names: Vec<String>) -> Self {
        Self {
            dns_names,
            critical: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dns_names.is_empty()
    }

    /// RFC 6125 matching: exact match, or a single leftmost wildcard label.
    pub fn matches_hostname(&self, hostname: &str) -> bool {
        let hostname = hostname.to_ascii_lowercase();
        self.dns_names.iter().any(|name| {
            let name = name.to_ascii_lowercase();
            if let Some(rest) = name.strip_prefix("*.") {
                hostname
                    .split_once('.')
                    .map(|(_, suffix)| suffix == rest)
                    .unwrap_or(false)
            } else {
                name == hostname
            }
        })
    }
}

/// CRL Distribution Points extension: an ordered list of URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrlDistributionPoints {
    pub urls: Vec<String>,
}

/// Authority Information Access extension's OCSP responder URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityInfoAccess {
    pub ocsp_urls: Vec<String>,
}

/// Certificate Policies extension: asserted policy OIDs.
///
/// `2.5.29.32.0` is the reserved `anyPolicy` OID (P6): it matches any
/// expected policy OID during chain validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificatePolicies {
    pub oids: Vec<String>,
    pub critical: bool,
}

pub const ANY_POLICY_OID: &str = "2.5.29.32.0";

impl CertificatePolicies {
    /// Does this set of asserted policies satisfy `required`.
    pub fn satisfies(&self, required: &str) -> bool {
        self.oids.iter().any(|oid| oid == required || oid == ANY_POLICY_OID)
    }
}
