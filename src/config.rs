//! Validation configuration.
//!
//! Follows the teacher's `Config`/`NatsConfig` shape: a plain `serde`
//! struct with an explicit `impl Default`, constructed by the caller and
//! threaded through explicitly rather than read from a global.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cert::extensions::{ExtendedKeyUsagePurpose, KeyUsageBit};
use crate::revocation::RevocationPolicy;

/// Options recognized by [`crate::validate::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Run chain assembly and structural/temporal/signature validation.
    pub validate_chain: bool,
    /// Check the leaf's key usage bits against `expected_key_usage`.
    pub validate_key_usage: bool,
    /// Check the leaf's extended key usage OIDs against `expected_eku`.
    pub validate_extended_key_usage: bool,
    /// The chain builder must terminate at a trust anchor.
    pub require_complete_chain: bool,
    /// Allow a self-signed leaf with no issuer to validate.
    pub allow_self_signed: bool,
    /// Key usage bits the leaf must assert.
    pub expected_key_usage: HashSet<KeyUsageBit>,
    /// Extended key usage purposes the leaf must assert.
    pub expected_eku: HashSet<ExtendedKeyUsagePurpose>,
    /// Gate for the revocation engine.
    pub check_revocation: bool,
    /// Enforce hostname matching when `expected_hostname` is set.
    pub validate_san: bool,
    /// Hostname the leaf's SAN (or CN fallback) must match.
    pub expected_hostname: Option<String>,
    /// Orchestration policy for CRL vs OCSP.
    pub revocation_policy: RevocationPolicy,
    /// Hard depth cap on assembled chains.
    pub max_chain_length: usize,
    /// Certificate policy OIDs the leaf must assert (§4.11's policy
    /// validator). `anyPolicy` on the leaf satisfies every entry. Empty
    /// means no policy requirement, matching the other `expected_*` fields.
    pub expected_policies: HashSet<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            validate_chain: true,
            validate_key_usage: true,
            validate_extended_key_usage: true,
            require_complete_chain: true,
            allow_self_signed: false,
            expected_key_usage: HashSet::new(),
            expected_eku: HashSet::new(),
            check_revocation: false,
            validate_san: true,
            expected_hostname: None,
            revocation_policy: RevocationPolicy::OcspPreferred,
            max_chain_length: MAX_CHAIN_LENGTH,
            expected_policies: HashSet::new(),
        }
    }
}

/// Default hard cap on chain depth (§4.10).
pub const MAX_CHAIN_LENGTH: usize = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_table() {
        let opts = ValidationOptions::default();
        assert!(opts.validate_chain);
        assert!(opts.validate_key_usage);
        assert!(opts.validate_extended_key_usage);
        assert!(opts.require_complete_chain);
        assert!(!opts.allow_self_signed);
        assert!(opts.expected_key_usage.is_empty());
        assert!(opts.expected_eku.is_empty());
        assert!(!opts.check_revocation);
        assert!(opts.validate_san);
        assert!(opts.expected_hostname.is_none());
        assert_eq!(opts.revocation_policy, RevocationPolicy::OcspPreferred);
        assert_eq!(opts.max_chain_length, 10);
        assert!(opts.expected_policies.is_empty());
    }
}
