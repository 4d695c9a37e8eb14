//! Error types for DCR XML parsing.

use thiserror::Error;

/// A type alias for `Result<T, ParseError>`.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors raised while reading a DCR choreography from XML.
///
/// All variants are hard rejections; the parser never recovers.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Element <{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: String,
    },

    #[error("Could not recognize relation kind '{0}'")]
    UnknownRelation(String),

    #[error("Role '{0}' is not well formed")]
    MalformedRole(String),

    #[error("Choreography activity '{0}' must have exactly one initiator")]
    ExtraInitiator(String),

    #[error("Choreography activity '{0}' has no initiator role")]
    MissingInitiator(String),

    #[error("Choreography activity '{0}' must have at least one receiver")]
    MissingReceivers(String),

    #[error("Duplicate event id '{0}'")]
    DuplicateEvent(String),

    #[error("Reference to unknown event id '{0}'")]
    DanglingReference(String),
}
