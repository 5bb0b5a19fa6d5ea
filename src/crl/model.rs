//! The CRL value object (§3 CRL).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cert::certificate::SignatureAlgorithm;
use crate::name::DistinguishedName;

/// RFC 5280 §5.3.1 CRL reason codes this crate distinguishes. Unrecognized
/// codes are preserved as [`RevocationReason::Other`] rather than dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevocationReason {
    Unspecified,
    KeyCompromise,
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    /// Reason code 8. Per §4.7, an entry carrying this reason inverts: the
    /// certificate is treated as **not revoked**, since this code marks a
    /// certificate that was held and has since been released.
    RemoveFromCrl,
    PrivilegeWithdrawn,
    AaCompromise,
    Other(u32),
}

impl RevocationReason {
    pub fn code(self) -> u32 {
        match self {
            Self::Unspecified => 0,
            Self::KeyCompromise => 1,
            Self::CaCompromise => 2,
            Self::AffiliationChanged => 3,
            Self::Superseded => 4,
            Self::CessationOfOperation => 5,
            Self::CertificateHold => 6,
            Self::RemoveFromCrl => 8,
            Self::PrivilegeWithdrawn => 9,
            Self::AaCompromise => 10,
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Unspecified,
            1 => Self::KeyCompromise,
            2 => Self::CaCompromise,
            3 => Self::AffiliationChanged,
            4 => Self::Superseded,
            5 => Self::CessationOfOperation,
            6 => Self::CertificateHold,
            8 => Self::RemoveFromCrl,
            9 => Self::PrivilegeWithdrawn,
            10 => Self::AaCompromise,
            other => Self::Other(other),
        }
    }
}

/// One entry in a CRL's revoked-certificate list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedEntry {
    pub revocation_date: DateTime<Utc>,
    pub reason_code: Option<RevocationReason>,
    pub invalidity_date: Option<DateTime<Utc>>,
}

/// A decoded Certificate Revocation List.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crl {
    pub issuer_dn: DistinguishedName,
    pub this_update: DateTime<Utc>,
    pub next_update: Option<DateTime<Utc>>,
    /// Monotonically non-decreasing per issuer (§4.6, P2).
    pub crl_number: u64,
    pub signature_algorithm: SignatureAlgorithm,
    pub signature_bytes: Vec<u8>,
    pub tbs_bytes: Vec<u8>,
    /// Keyed by raw serial bytes, the same representation as
    /// [`crate::cert::Certificate::serial`].
    pub entries: HashMap<Vec<u8>, RevokedEntry>,
}

impl Crl {
    /// Look up a serial, applying the reason-code-8 inversion (§4.7, P4):
    /// an entry present only because it was marked [`RevocationReason::RemoveFromCrl`]
    /// is not revocation, it is the record of a hold being lifted.
    pub fn status_for(&self, serial: &[u8]) -> CrlLookup {
        match self.entries.get(serial) {
            None => CrlLookup::NotListed,
            Some(entry) if entry.reason_code == Some(RevocationReason::RemoveFromCrl) => {
                CrlLookup::NotListed
            }
            Some(entry) => CrlLookup::Revoked(entry.clone()),
        }
    }

    pub fn is_stale(&self, at: DateTime<Utc>) -> bool {
        matches!(self.next_update, Some(next) if next < at)
    }
}

/// Outcome of [`Crl::status_for`].
#[derive(Debug, Clone)]
pub enum CrlLookup {
    NotListed,
    Revoked(RevokedEntry),
}
