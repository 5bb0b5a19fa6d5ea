//! Chain assembly (§3 Certificate chain, §4.10).
//!
//! Purely structural: no cryptography happens here. Self-signed-ness for
//! walk termination is DN equality only ([`Certificate::dn_self_signed`]);
//! the actual self-signature check is the chain validator's job on the
//! assembled chain's last link (§4.11), matching §6's public signature
//! `build_chain(leaf, candidates, anchors) -> Result<Chain, ChainError>`,
//! which takes no signature verifier.

use std::cmp::Reverse;

use chrono::Utc;
use thiserror::Error;

use crate::cert::Certificate;
use crate::config::MAX_CHAIN_LENGTH;
use crate::name::DistinguishedName;

/// An assembled certificate chain, leaf-first, anchor/self-signed-root last.
#[derive(Debug, Clone)]
pub struct Chain(Vec<Certificate>);

impl Chain {
    pub fn certs(&self) -> &[Certificate] {
        &self.0
    }

    pub fn leaf(&self) -> &Certificate {
        &self.0[0]
    }

    pub fn terminal(&self) -> &Certificate {
        self.0.last().expect("a chain always has at least the leaf")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> Vec<Certificate> {
        self.0
    }
}

#[derive(Debug, Clone, Error)]
pub enum ChainError {
    #[error("no certificate in the candidate/anchor pool issued {subject} (incomplete chain of length {partial_len})")]
    IncompleteChain {
        subject: String,
        partial: Chain,
        partial_len: usize,
    },
    #[error("chain exceeded the maximum depth of {max_chain_length} certificates")]
    MaxDepthExceeded {
        partial: Chain,
        max_chain_length: usize,
    },
    #[error("chain for {subject} terminates at a self-signed certificate that is not a configured trust anchor")]
    UntrustedRoot { subject: String },
}

fn identity(cert: &Certificate) -> (&DistinguishedName, &[u8]) {
    (&cert.subject_dn, cert.serial.as_slice())
}

pub(crate) fn is_in(cert: &Certificate, set: &[Certificate]) -> bool {
    set.iter().any(|c| identity(c) == identity(cert))
}

/// Build the shortest valid chain from `leaf` to a trust anchor or
/// self-signed root, given loose `candidates` and `anchors` (§4.10).
pub fn build(
    leaf: &Certificate,
    candidates: &[Certificate],
    anchors: &[Certificate],
) -> Result<Chain, ChainError> {
    build_with_max_length(leaf, candidates, anchors, MAX_CHAIN_LENGTH)
}

pub fn build_with_max_length(
    leaf: &Certificate,
    candidates: &[Certificate],
    anchors: &[Certificate],
    max_chain_length: usize,
) -> Result<Chain, ChainError> {
    let now = Utc::now();
    let mut chain = vec![leaf.clone()];

    loop {
        let cursor = chain.last().expect("chain is never empty");

        if cursor.dn_self_signed() || is_in(cursor, anchors) {
            return Ok(Chain(chain));
        }

        if chain.len() >= max_chain_length {
            return Err(ChainError::MaxDepthExceeded {
                partial: Chain(chain),
                max_chain_length,
            });
        }

        let matches: Vec<&Certificate> = candidates
            .iter()
            .chain(anchors.iter())
            .filter(|c| !is_in(c, &chain))
            .filter(|c| c.subject_dn == cursor.issuer_dn)
            .collect();

        if matches.is_empty() {
            let subject = cursor.issuer_dn.to_string();
            let partial_len = chain.len();
            return Err(ChainError::IncompleteChain {
                subject,
                partial: Chain(chain),
                partial_len,
            });
        }

        let winner = pick_issuer(matches, anchors, now).clone();
        chain.push(winner);
    }
}

/// §4.10's tie-break: (a) anchors over intermediates, (b) longer remaining
/// validity, (c) lexicographic serial order.
fn pick_issuer<'a>(
    matches: Vec<&'a Certificate>,
    anchors: &[Certificate],
    now: chrono::DateTime<Utc>,
) -> &'a Certificate {
    let any_anchor = matches.iter().any(|c| is_in(c, anchors));
    let pool: Vec<&Certificate> = if any_anchor {
        matches.into_iter().filter(|c| is_in(c, anchors)).collect()
    } else {
        matches
    };

    pool.into_iter()
        .min_by_key(|c| (Reverse(c.not_after - now), c.serial.clone()))
        .expect("pool is non-empty by construction")
}
