//! CRL decoding, caching, refreshing, and validation (§3 CRL, §4.2, §4.5-4.7).

pub mod cache;
pub mod decode;
pub mod model;
pub mod updater;
pub mod validator;

pub use cache::CrlCache;
pub use decode::{decode_crl_der, decode_crl_pem, CrlDecodeError};
pub use model::{Crl, CrlLookup, RevocationReason, RevokedEntry};
pub use updater::{CrlUpdateError, CrlUpdater};
pub use validator::CrlCheckOutcome;
