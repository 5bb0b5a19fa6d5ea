//! Ports: the narrow interfaces the validation core depends on but does not
//! implement itself (§4.3, §4.4). The core is deterministic in tests by
//! injecting fakes behind these traits.

pub mod fetcher;
pub mod signature;

pub use fetcher::{FetchError, RevocationFetcher};
pub use signature::{CryptoError, SignatureVerifier};
