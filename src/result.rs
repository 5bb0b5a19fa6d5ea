//! The message-accumulator result type threaded through chain and revocation
//! validation.
//!
//! Grounded in the teacher's `Rfc5280ValidationResult` (private `errors`/
//! `warnings` vectors, `is_valid()`/`summary()` accessors), generalized to
//! the four ordered lists the validation engine's design notes call for:
//! errors, warnings, infos, and successes. The type is a plain value object
//! passed by mutable reference through validators — there is no global
//! accumulator.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Accumulates the outcome of a validation run.
///
/// `is_valid` is derived, never stored: it is true iff `errors` is empty.
/// All four lists are append-only from the caller's perspective; nothing in
/// this crate clears a populated list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<String>,
    infos: Vec<String>,
    successes: Vec<String>,
}

impl ValidationResult {
    /// An empty, currently-valid result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an error. After this call `is_valid()` is false and stays false.
    pub fn add_error(&mut self, error: impl Into<ValidationError>) {
        self.errors.push(error.into());
    }

    /// Push a warning. Warnings never affect `is_valid()`.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Push an informational message.
    pub fn add_info(&mut self, message: impl Into<String>) {
        self.infos.push(message.into());
    }

    /// Push a success message (e.g. "certificate good", "signature verified").
    pub fn add_success(&mut self, message: impl Into<String>) {
        self.successes.push(message.into());
    }

    /// True iff no error has been recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn infos(&self) -> &[String] {
        &self.infos
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Concatenate `other`'s four lists onto `self`'s, preserving order:
    /// `self.errors ++ other.errors` and so on for the remaining three lists.
    pub fn merge(&mut self, mut other: ValidationResult) {
        self.errors.append(&mut other.errors);
        self.warnings.append(&mut other.warnings);
        self.infos.append(&mut other.infos);
        self.successes.append(&mut other.successes);
    }

    /// Short human-readable summary, e.g. for CLI or log output.
    pub fn summary(&self) -> String {
        format!(
            "valid={} errors={} warnings={} infos={} successes={}",
            self.is_valid(),
            self.errors.len(),
            self.warnings.len(),
            self.infos.len(),
            self.successes.len()
        )
    }
}
