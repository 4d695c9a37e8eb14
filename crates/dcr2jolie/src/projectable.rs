//! Projectability check for DCR choreographies.
//!
//! A choreography is projectable for a role `r` when every event directly
//! depending on an event initiated by `r` is itself initiated by a
//! participant of that event. Influence that cannot be communicated to its
//! initiator makes the projection unsound, so a violation is a hard
//! rejection.

use std::collections::BTreeSet;
use std::fmt;

use log::warn;

use dcr2jolie_core::{graph::Choreography, identifier::Id};

use crate::closure;

/// An offending event/depender pair found by the projectability check.
///
/// There is a direct dependency from `event` to `depender`, but the
/// depender's initiator is not among the participants of `event`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The initiated event the dependency starts from.
    pub event: Id,
    /// Label of `event`.
    pub event_label: String,
    /// The event that directly depends on `event`.
    pub depender: Id,
    /// Label of `depender`.
    pub depender_label: String,
    /// The depender's initiator, which is outside the participant set.
    pub initiator: String,
    /// The participants of `event` (receivers plus initiator).
    pub participants: BTreeSet<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "there is a direct dependency from '{}' to '{}', and '{}' is not among {{{}}}",
            self.event_label,
            self.depender_label,
            self.initiator,
            self.participants
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

/// Every projectability violation for `actor`, in id order of the initiated
/// events.
///
/// Each violation is also logged as a warning when found.
pub fn violations_for(choreography: &Choreography, actor: &str) -> Vec<Violation> {
    let graph = choreography.graph();
    let mut violations = Vec::new();

    for event in graph
        .interactions()
        .filter(|a| a.initiator() == Some(actor))
    {
        let mut participants: BTreeSet<String> = event
            .receivers()
            .map(|r| r.iter().cloned().collect())
            .unwrap_or_default();
        participants.insert(actor.to_string());

        for depender_id in closure::direct_dependers(graph, event.id()) {
            if &depender_id == event.id() {
                continue;
            }
            let Some(depender) = graph.activity(&depender_id) else {
                continue;
            };
            let Some(initiator) = depender.initiator() else {
                continue;
            };
            if !participants.contains(initiator) {
                let violation = Violation {
                    event: event.id().clone(),
                    event_label: event.label().to_string(),
                    depender: depender_id.clone(),
                    depender_label: depender.label().to_string(),
                    initiator: initiator.to_string(),
                    participants: participants.clone(),
                };
                warn!(actor; "The graph is not projectable: {violation}");
                violations.push(violation);
            }
        }
    }
    violations
}

/// Whether the choreography is projectable for a single role.
pub fn is_projectable_for(choreography: &Choreography, actor: &str) -> bool {
    violations_for(choreography, actor).is_empty()
}

/// Whether the choreography is projectable for every role it names.
pub fn is_projectable(choreography: &Choreography) -> bool {
    choreography
        .roles()
        .iter()
        .all(|role| is_projectable_for(choreography, role))
}
