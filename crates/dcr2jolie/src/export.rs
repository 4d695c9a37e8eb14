//! Export functionality for end-point projections.
//!
//! This module provides the [`Exporter`] trait that defines the interface
//! for turning a projection into a service skeleton. It is the final stage
//! in the dcr2jolie pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! XML Source
//!     ↓ parse
//! Choreography
//!     ↓ project (per role)
//! Projection
//!     ↓ export (this module)
//! Service skeleton files
//! ```
//!
//! # Available Backends
//!
//! - [`jolie`] — Jolie `.iol`/`.ol` skeletons via [`jolie::JolieGenerator`]
//!
//! # Error Handling
//!
//! Export operations return [`Error`], covering generation failures and I/O
//! errors. [`Error`] converts into
//! [`Dcr2JolieError::Export`](crate::Dcr2JolieError::Export) at the crate
//! boundary.

/// Jolie export backend.
pub mod jolie;

use dcr2jolie_core::graph::Projection;

/// Abstraction for projection export backends.
///
/// Implementors turn a [`Projection`] into a specific service-definition
/// output. See the [`jolie`] module for the built-in Jolie implementation.
pub trait Exporter {
    /// Exports one end-point projection to the backend's output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the projection cannot be turned into
    /// the target format, or [`Error::Io`] if writing the output fails.
    fn export_projection(&mut self, projection: &Projection) -> Result<(), Error>;
}

/// Errors that can occur during projection export.
///
/// This type is converted into
/// [`Dcr2JolieError::Export`](crate::Dcr2JolieError::Export) at the crate
/// boundary via the [`From`] implementation in [`crate::error`].
#[derive(Debug)]
pub enum Error {
    /// A generation failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
