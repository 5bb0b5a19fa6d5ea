//! Distinguished names.
//!
//! A normalized view over an X.509 Subject/Issuer `Name`, grounded in the
//! teacher's `value_objects::x509::subject_name` module but collapsed from a
//! set of individually-typed components into one comparable value: chain
//! assembly and validation only ever need DN *equality*, not per-attribute
//! access, so the attributes are kept as an ordered list of RDN strings
//! behind a single newtype rather than as separate marker-trait value
//! objects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A Distinguished Name, normalized for equality comparison.
///
/// Two names are equal iff their RFC 4514 string forms are equal after
/// lowercasing attribute values is deliberately NOT performed here: DN
/// comparison in this crate is byte-exact on the normalized string, matching
/// how the chain builder and validator compare `issuer_dn`/`subject_dn`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistinguishedName {
    rfc4514: String,
}

impl DistinguishedName {
    /// Build a DN from its already-normalized RFC 4514 string form.
    pub fn new(rfc4514: impl Into<String>) -> Self {
        Self {
            rfc4514: rfc4514.into(),
        }
    }

    /// The empty DN (`subject_dn` of a certificate with only a SAN identity).
    pub fn empty() -> Self {
        Self {
            rfc4514: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rfc4514.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.rfc4514
    }

    /// Best-effort common name extraction, used only for the CN-fallback
    /// hostname check when a certificate has no Subject Alternative Name.
    pub fn common_name(&self) -> Option<&str> {
        self.rfc4514.split(',').find_map(|rdn| {
            let rdn = rdn.trim();
            rdn.strip_prefix("CN=")
        })
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rfc4514)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_name_extraction() {
        let dn = DistinguishedName::new("CN=example.com,O=Example Inc,C=US");
        assert_eq!(dn.common_name(), Some("example.com"));
    }

    #[test]
    fn common_name_absent() {
        let dn = DistinguishedName::new("O=Example Inc,C=US");
        assert_eq!(dn.common_name(), None);
    }

    #[test]
    fn equality_is_exact() {
        let a = DistinguishedName::new("CN=Int CA");
        let b = DistinguishedName::new("CN=Int CA");
        let c = DistinguishedName::new("CN=int ca");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn empty_dn_has_no_common_name() {
        let dn = DistinguishedName::empty();
        assert!(dn.is_empty());
        assert_eq!(dn.common_name(), None);
    }
}
