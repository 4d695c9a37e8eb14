//! dcr2jolie Core Types and Definitions
//!
//! This crate provides the foundational DCR graph model for the dcr2jolie
//! projection compiler. It includes:
//!
//! - **Identifiers**: Stable, lexicographically ordered activity ids ([`identifier::Id`])
//! - **Activities**: Plain, interaction, endpoint and nesting activities ([`activity`] module)
//! - **Relations**: The six DCR relation kinds ([`relation`] module)
//! - **Markings**: The (Included, Pending, Executed) state triple ([`marking`] module)
//! - **Graphs**: The activity arena with structural queries and collapse,
//!   plus the [`graph::Choreography`] and [`graph::Projection`] wrappers

pub mod activity;
pub mod graph;
pub mod identifier;
pub mod marking;
pub mod relation;
