//! Revocation orchestration policy (§3 Revocation policy, §4.9's table).

use serde::{Deserialize, Serialize};

/// How the revocation checker weighs CRL and OCSP results against each
/// other, and how it treats inconclusive outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevocationPolicy {
    /// Skip revocation checking entirely.
    Disabled,
    /// Try OCSP then CRL; an inconclusive result from both is downgraded to
    /// `ok` with a warning (liveness over strictness).
    SoftFail,
    /// Try OCSP then CRL; if both are inconclusive, treat the certificate as
    /// revoked (err on safety).
    HardFail,
    /// Only run CRL. Requires the issuer to expose CRL distribution points.
    CrlOnly,
    /// Only run OCSP.
    OcspOnly,
    /// Run OCSP first; fall back to CRL only if OCSP is inconclusive.
    OcspPreferred,
    /// Run CRL first; fall back to OCSP only if CRL is inconclusive.
    CrlPreferred,
}

impl RevocationPolicy {
    /// Whether this policy ever runs OCSP.
    pub fn uses_ocsp(self) -> bool {
        !matches!(self, Self::Disabled | Self::CrlOnly)
    }

    /// Whether this policy ever runs CRL.
    pub fn uses_crl(self) -> bool {
        !matches!(self, Self::Disabled | Self::OcspOnly)
    }

    /// Whether method-level errors (network/parse failures, not a
    /// "revoked" verdict) escalate into a result-level error under this
    /// policy (§7: "Only `HardFail` and `*Only` policies escalate
    /// method-level errors into result-level errors").
    pub fn escalates_method_errors(self) -> bool {
        matches!(self, Self::HardFail | Self::CrlOnly | Self::OcspOnly)
    }
}
