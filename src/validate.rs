//! Top-level entry point (§6): assemble a chain from `leaf`, validate it
//! under `options`, and dispatch revocation checking through `context`.

use crate::cert::Certificate;
use crate::chain::builder::{build_with_max_length, is_in, ChainError};
use crate::config::ValidationOptions;
use crate::context::ValidationContext;
use crate::ports::fetcher::RevocationFetcher;
use crate::result::ValidationResult;

/// Validate `leaf` against `anchors`, using `intermediates` as the
/// candidate pool for chain assembly. This is the crate's one composed
/// entry point; `chain::build` and `chain::validate` remain independently
/// usable for callers who already have an assembled, trusted chain.
pub async fn validate<F: RevocationFetcher + Clone>(
    leaf: &Certificate,
    intermediates: &[Certificate],
    anchors: &[Certificate],
    options: &ValidationOptions,
    context: &ValidationContext<F>,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !options.validate_chain {
        result.add_info("chain validation is disabled by options".to_string());
        return result;
    }

    let chain = match build_with_max_length(leaf, intermediates, anchors, options.max_chain_length) {
        Ok(chain) => chain,
        Err(e) => {
            result.add_error(e);
            return result;
        }
    };

    if options.require_complete_chain {
        let terminal = chain.terminal();
        let anchored = is_in(terminal, anchors);
        let accepted_self_signed =
            options.allow_self_signed && terminal.is_self_signed(context.verifier.as_ref());
        if !anchored && !accepted_self_signed {
            result.add_error(ChainError::UntrustedRoot {
                subject: terminal.subject_dn.to_string(),
            });
            return result;
        }
    }

    let revocation = options.check_revocation.then_some(&context.revocation);
    crate::chain::validator::validate(&chain, options, context.verifier.as_ref(), revocation, &mut result).await;

    result
}
