//! Activity types for DCR graphs.
//!
//! This module contains the activity (event) model:
//! - [`Activity`] - An event identified by a stable [`Id`] and a label
//! - [`ActivityKind`] - The variant data: plain, interaction, endpoint, or nest
//!
//! Activities reference their parent nest and children by [`Id`]; the
//! containing [`Graph`](crate::graph::Graph) owns the arena that resolves
//! those references, so ancestor and descendant walks live there.

use std::collections::BTreeSet;
use std::fmt;

use crate::identifier::Id;

/// Variant data of an activity.
///
/// # Variants
///
/// * `Plain` - A local event with an optional datatype tag
/// * `Interaction` - A multi-party event with one initiator and at least one receiver
/// * `Endpoint` - An interaction tagged input/output; only appears in projections
/// * `Nest` - A grouping activity containing child activities
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityKind {
    Plain {
        datatype: Option<String>,
    },
    Interaction {
        initiator: String,
        receivers: BTreeSet<String>,
        datatype: Option<String>,
    },
    Endpoint {
        initiator: String,
        receivers: BTreeSet<String>,
        datatype: Option<String>,
        is_output: bool,
    },
    Nest {
        children: BTreeSet<Id>,
    },
}

/// An event of a DCR graph.
///
/// Every activity carries a stable id (unique within its graph), a label, a
/// set of role names referenced by the activity, and an optional parent nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    id: Id,
    label: String,
    roles: BTreeSet<String>,
    parent: Option<Id>,
    kind: ActivityKind,
}

impl Activity {
    /// Create a plain activity with an optional datatype tag.
    pub fn plain(id: Id, label: impl Into<String>, datatype: Option<String>) -> Self {
        Self {
            id,
            label: label.into(),
            roles: BTreeSet::new(),
            parent: None,
            kind: ActivityKind::Plain { datatype },
        }
    }

    /// Create an interaction activity with its initiator and receivers.
    pub fn interaction(
        id: Id,
        label: impl Into<String>,
        initiator: impl Into<String>,
        receivers: BTreeSet<String>,
        datatype: Option<String>,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            roles: BTreeSet::new(),
            parent: None,
            kind: ActivityKind::Interaction {
                initiator: initiator.into(),
                receivers,
                datatype,
            },
        }
    }

    /// Create an endpoint activity (an interaction tagged input/output).
    pub fn endpoint(
        id: Id,
        label: impl Into<String>,
        initiator: impl Into<String>,
        receivers: BTreeSet<String>,
        datatype: Option<String>,
        is_output: bool,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            roles: BTreeSet::new(),
            parent: None,
            kind: ActivityKind::Endpoint {
                initiator: initiator.into(),
                receivers,
                datatype,
                is_output,
            },
        }
    }

    /// Create an empty nesting activity.
    pub fn nest(id: Id, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            roles: BTreeSet::new(),
            parent: None,
            kind: ActivityKind::Nest {
                children: BTreeSet::new(),
            },
        }
    }

    /// The activity id.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// The activity label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The roles referenced by this activity.
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// The containing nest, if any.
    pub fn parent(&self) -> Option<&Id> {
        self.parent.as_ref()
    }

    /// The variant data.
    pub fn kind(&self) -> &ActivityKind {
        &self.kind
    }

    /// Whether this activity is a nesting activity.
    pub fn is_nest(&self) -> bool {
        matches!(self.kind, ActivityKind::Nest { .. })
    }

    /// Children of a nesting activity; empty for non-nests.
    pub fn children(&self) -> &BTreeSet<Id> {
        static EMPTY: BTreeSet<Id> = BTreeSet::new();
        match &self.kind {
            ActivityKind::Nest { children } => children,
            _ => &EMPTY,
        }
    }

    /// The initiator role of an interaction or endpoint activity.
    pub fn initiator(&self) -> Option<&str> {
        match &self.kind {
            ActivityKind::Interaction { initiator, .. }
            | ActivityKind::Endpoint { initiator, .. } => Some(initiator),
            _ => None,
        }
    }

    /// The receiver roles of an interaction or endpoint activity.
    pub fn receivers(&self) -> Option<&BTreeSet<String>> {
        match &self.kind {
            ActivityKind::Interaction { receivers, .. }
            | ActivityKind::Endpoint { receivers, .. } => Some(receivers),
            _ => None,
        }
    }

    /// The datatype tag, if the activity carries one.
    pub fn datatype(&self) -> Option<&str> {
        match &self.kind {
            ActivityKind::Plain { datatype }
            | ActivityKind::Interaction { datatype, .. }
            | ActivityKind::Endpoint { datatype, .. } => datatype.as_deref(),
            ActivityKind::Nest { .. } => None,
        }
    }

    /// Whether an endpoint activity is an output (sent by the projection's actor).
    pub fn is_output(&self) -> Option<bool> {
        match &self.kind {
            ActivityKind::Endpoint { is_output, .. } => Some(*is_output),
            _ => None,
        }
    }

    /// Add role names to the activity's role set.
    pub fn set_roles(&mut self, roles: impl IntoIterator<Item = String>) {
        self.roles.extend(roles);
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Id>) {
        self.parent = parent;
    }

    pub(crate) fn insert_child(&mut self, child: Id) {
        if let ActivityKind::Nest { children } = &mut self.kind {
            children.insert(child);
        }
    }

    pub(crate) fn remove_child(&mut self, child: &Id) {
        if let ActivityKind::Nest { children } = &mut self.kind {
            children.remove(child);
        }
    }
}

impl fmt::Display for Activity {
    /// Endpoint activities render with their direction and participants,
    /// e.g. `!(Ask price, Seller->Buyer)`; every other kind renders its label.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ActivityKind::Endpoint {
                initiator,
                receivers,
                is_output,
                ..
            } => {
                let receiver_str = if receivers.len() > 1 {
                    format!("{{{}}}", receivers.iter().cloned().collect::<Vec<_>>().join(","))
                } else {
                    receivers.iter().next().cloned().unwrap_or_default()
                };
                write!(
                    f,
                    "{}({}, {}->{})",
                    if *is_output { "!" } else { "?" },
                    self.label,
                    initiator,
                    receiver_str
                )
            }
            _ => write!(f, "{}", self.label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receivers(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_plain_activity() {
        let a = Activity::plain(Id::new("e1"), "Ask price", Some("text".into()));

        assert_eq!(a.id(), &Id::new("e1"));
        assert_eq!(a.label(), "Ask price");
        assert_eq!(a.datatype(), Some("text"));
        assert!(!a.is_nest());
        assert!(a.initiator().is_none());
        assert!(a.children().is_empty());
    }

    #[test]
    fn test_interaction_activity() {
        let a = Activity::interaction(
            Id::new("e1"),
            "Ask price",
            "Seller",
            receivers(&["Buyer", "Agent"]),
            None,
        );

        assert_eq!(a.initiator(), Some("Seller"));
        assert_eq!(a.receivers().unwrap().len(), 2);
        assert!(a.is_output().is_none());
    }

    #[test]
    fn test_endpoint_display() {
        let out = Activity::endpoint(
            Id::new("e1"),
            "Ask price",
            "Seller",
            receivers(&["Buyer"]),
            None,
            true,
        );
        let inp = Activity::endpoint(
            Id::new("e1"),
            "Ask price",
            "Seller",
            receivers(&["Agent", "Buyer"]),
            None,
            false,
        );

        assert_eq!(out.to_string(), "!(Ask price, Seller->Buyer)");
        assert_eq!(inp.to_string(), "?(Ask price, Seller->{Agent,Buyer})");
    }

    #[test]
    fn test_nest_children() {
        let mut nest = Activity::nest(Id::new("n"), "Negotiate");
        nest.insert_child(Id::new("e2"));
        nest.insert_child(Id::new("e1"));
        nest.insert_child(Id::new("e2"));

        let ids: Vec<&str> = nest.children().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);

        nest.remove_child(&Id::new("e1"));
        assert_eq!(nest.children().len(), 1);
    }

    #[test]
    fn test_roles() {
        let mut a = Activity::plain(Id::new("e1"), "Ask price", None);
        a.set_roles(["Seller".to_string(), "Buyer".to_string()]);
        a.set_roles(["Seller".to_string()]);

        assert_eq!(a.roles().len(), 2);
    }
}
