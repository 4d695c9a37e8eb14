//! Error types for dcr2jolie operations.
//!
//! This module provides the main error type [`Dcr2JolieError`] which wraps
//! the error conditions that can occur while compiling a choreography into
//! end-point projections.

use std::io;

use thiserror::Error;

use dcr2jolie_parser::ParseError;

use crate::projectable::Violation;

/// The main error type for dcr2jolie operations.
///
/// The `NotProjectable` variant carries every offending event/depender pair
/// found by the projectability check, so callers can report all of them.
#[derive(Debug, Error)]
pub enum Dcr2JolieError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Choreography is not projectable for '{actor}' ({} conflicting dependencies)", .violations.len())]
    NotProjectable {
        actor: String,
        violations: Vec<Violation>,
    },

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for Dcr2JolieError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}
