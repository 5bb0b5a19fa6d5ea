//! The decoded certificate record and its decoder (§3 Certificate, §4.1, §4.2).

pub mod certificate;
pub mod decode;
pub mod extensions;

pub use certificate::{Certificate, Extensions, PublicKey, SignatureAlgorithm};
pub use decode::{decode_cert_der, decode_cert_pem, DecodeError};
