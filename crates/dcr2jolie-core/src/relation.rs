//! Relation types for DCR graphs.
//!
//! A relation is a directed edge between two activities, tagged with one of
//! the six DCR relation kinds. The compiler only ever distinguishes the kind;
//! the marking-transition semantics of each kind (what firing the start event
//! does to a marking) are documented on [`RelationKind`] for consumers of the
//! data model but are not executed here.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::identifier::Id;

/// The six DCR relation kinds.
///
/// The names match the external constraint tags of the DCR XML format
/// (snake_case).
///
/// # Variants
///
/// - `Condition` - the end may fire only if the start has executed or is excluded
/// - `Response` - firing the start makes the end pending
/// - `Include` - firing the start includes the end
/// - `Exclude` - firing the start excludes the end
/// - `Milestone` - the end may fire only if the start is not pending or is excluded
/// - `CoResponse` - firing the start clears the end's pending obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Condition,
    Response,
    Include,
    Exclude,
    Milestone,
    #[serde(rename = "coresponse")]
    CoResponse,
}

impl RelationKind {
    /// All kinds, in a fixed order.
    pub const ALL: [RelationKind; 6] = [
        RelationKind::Condition,
        RelationKind::Response,
        RelationKind::Include,
        RelationKind::Exclude,
        RelationKind::Milestone,
        RelationKind::CoResponse,
    ];
}

impl FromStr for RelationKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "condition" => Ok(Self::Condition),
            "response" => Ok(Self::Response),
            "include" => Ok(Self::Include),
            "exclude" => Ok(Self::Exclude),
            "milestone" => Ok(Self::Milestone),
            "coresponse" => Ok(Self::CoResponse),
            _ => Err("Unrecognized relation kind"),
        }
    }
}

impl From<RelationKind> for &'static str {
    fn from(val: RelationKind) -> Self {
        match val {
            RelationKind::Condition => "condition",
            RelationKind::Response => "response",
            RelationKind::Include => "include",
            RelationKind::Exclude => "exclude",
            RelationKind::Milestone => "milestone",
            RelationKind::CoResponse => "coresponse",
        }
    }
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// A directed relation between two activities.
///
/// Both endpoints may be any activity kind, including nests, and self-loops
/// are permitted. The optional expression is preserved verbatim from the
/// source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    start: Id,
    end: Id,
    kind: RelationKind,
    expression: Option<String>,
}

impl Relation {
    /// Create a relation between two activity ids.
    pub fn new(start: Id, end: Id, kind: RelationKind) -> Self {
        Self {
            start,
            end,
            kind,
            expression: None,
        }
    }

    /// Attach a guard expression, preserved verbatim.
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// The origin activity id.
    pub fn start(&self) -> &Id {
        &self.start
    }

    /// The destination activity id.
    pub fn end(&self) -> &Id {
        &self.end
    }

    /// The relation kind.
    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    /// The guard expression, if any.
    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    pub(crate) fn set_start(&mut self, start: Id) {
        self.start = start;
    }

    pub(crate) fn set_end(&mut self, end: Id) {
        self.end = end;
    }
}

impl Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.start, self.kind, self.end)
    }
}
