//! X.509 certificate chain and revocation validation engine.
//!
//! Three layers, thin adapters over a validation core that never touches
//! the network or a concrete crypto library directly:
//!
//! - [`cert`]/[`crl`]/[`ocsp`]: decoding. Total functions — malformed input
//!   always returns an error, never a partial record.
//! - [`chain`]: assembling a certificate chain ([`chain::build`]) and
//!   walking it to check temporal, structural, signature, and policy rules
//!   ([`chain::validate`]).
//! - [`revocation`]: CRL/OCSP orchestration under a configurable policy.
//!
//! [`ports`] defines the two seams the core depends on but does not
//! implement: [`ports::SignatureVerifier`] (crypto) and
//! [`ports::RevocationFetcher`] (network I/O). [`adapters`] ships one
//! production implementation of the former; callers bring their own fetcher.
//!
//! [`validate::validate`] composes all of the above into the one call most
//! callers want: build a chain from a leaf and a candidate pool, validate
//! it, and check revocation, all under one [`config::ValidationOptions`].

pub mod adapters;
pub mod cert;
pub mod chain;
pub mod config;
pub mod context;
pub mod crl;
pub mod error;
pub mod name;
pub mod ocsp;
pub mod ports;
pub mod result;
pub mod revocation;
pub mod validate;

pub use adapters::RingSignatureVerifier;
pub use cert::{decode_cert_der, decode_cert_pem, Certificate, DecodeError};
pub use chain::{build as build_chain, build_with_max_length as build_chain_with_max_length, Chain, ChainError};
pub use config::ValidationOptions;
pub use context::ValidationContext;
pub use crl::{decode_crl_der, decode_crl_pem, Crl, CrlCache, CrlDecodeError};
pub use error::{Result, ValidationError};
pub use name::DistinguishedName;
pub use ocsp::{build_request, ocsp_get_url, parse_response, OcspClient};
pub use ports::{CryptoError, FetchError, RevocationFetcher, SignatureVerifier};
pub use result::ValidationResult;
pub use revocation::{RevocationChecker, RevocationPolicy};
pub use validate::validate;
