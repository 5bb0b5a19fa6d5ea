//! Concrete implementations of the ports in [`crate::ports`].

pub mod ring_verifier;

pub use ring_verifier::RingSignatureVerifier;
