//! Parser for the DCR portal XML choreography format.
//!
//! This crate reads a DCR-Graph XML document into the
//! [`Choreography`](dcr2jolie_core::graph::Choreography) model of
//! `dcr2jolie-core`: label mappings, recursively nested events, the six
//! constraint kinds, the initial marking, and the `S:`/`R:` role grammar
//! that partitions roles into users and services. The public entry point is
//! [`parse`].

pub mod error;
pub mod role;

mod xml;

pub use error::ParseError;
pub use role::{RoleDecl, parse_role};
pub use xml::parse;
