//! OCSP request building, response decoding, and client orchestration
//! (§3 OCSP response, §4.8).

pub mod client;
pub mod decode;
pub mod model;
pub mod request;

pub use client::{OcspClient, OcspError};
pub use decode::parse_response;
pub use model::{CertStatus, OcspResponse, ResponseStatus};
pub use request::{build_request, ocsp_get_url, OcspRequestContext};
