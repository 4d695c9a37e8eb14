//! The DCR graph container.
//!
//! A [`Graph`] owns its activities in an arena keyed by [`Id`], its relations,
//! and an initial [`Marking`]. Parent/child links between activities are ids
//! into the arena, so ancestor and descendant walks are resolved here and the
//! structure stays acyclic-by-construction (a forest of nests).
//!
//! Structural queries ([`incoming`](Graph::incoming),
//! [`outgoing`](Graph::outgoing), [`sub_events`](Graph::sub_events)) and the
//! [`collapse`](Graph::collapse) rewrite are the foundation the projection
//! compiler builds on.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::debug;
use thiserror::Error;

use crate::activity::Activity;
use crate::identifier::Id;
use crate::marking::Marking;
use crate::relation::{Relation, RelationKind};

/// Structural errors raised while building a graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate activity id: {0}")]
    DuplicateActivity(Id),

    #[error("Unknown activity id: {0}")]
    UnknownActivity(Id),

    #[error("Activity {0} is not a nesting activity")]
    NotANest(Id),
}

/// A DCR graph: activities, relations, and an initial marking.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    activities: BTreeMap<Id, Activity>,
    relations: Vec<Relation>,
    marking: Marking,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an activity to the graph.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateActivity`] if the id is already taken.
    pub fn add_activity(&mut self, activity: Activity) -> Result<(), GraphError> {
        let id = activity.id().clone();
        if self.activities.contains_key(&id) {
            return Err(GraphError::DuplicateActivity(id));
        }
        self.activities.insert(id, activity);
        Ok(())
    }

    /// Add a relation between two existing activities.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownActivity`] if either endpoint is not in
    /// the graph.
    pub fn add_relation(&mut self, relation: Relation) -> Result<(), GraphError> {
        for endpoint in [relation.start(), relation.end()] {
            if !self.activities.contains_key(endpoint) {
                return Err(GraphError::UnknownActivity(endpoint.clone()));
            }
        }
        self.relations.push(relation);
        Ok(())
    }

    /// Put `child` under `nest`: sets the child's parent and registers it in
    /// the nest's children.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownActivity`] if either id is not in the
    /// graph, or [`GraphError::NotANest`] if `nest` is not a nesting
    /// activity.
    pub fn add_child(&mut self, nest: &Id, child: &Id) -> Result<(), GraphError> {
        if !self.activities.contains_key(child) {
            return Err(GraphError::UnknownActivity(child.clone()));
        }
        match self.activities.get_mut(nest) {
            None => return Err(GraphError::UnknownActivity(nest.clone())),
            Some(parent) if !parent.is_nest() => return Err(GraphError::NotANest(nest.clone())),
            Some(parent) => parent.insert_child(child.clone()),
        }
        self.activities
            .get_mut(child)
            .expect("presence checked above")
            .set_parent(Some(nest.clone()));
        Ok(())
    }

    /// Look up an activity by id.
    pub fn activity(&self, id: &Id) -> Option<&Activity> {
        self.activities.get(id)
    }

    /// Look up an activity by label; ties resolve to the smallest id.
    pub fn find_by_label(&self, label: &str) -> Option<&Activity> {
        self.activities.values().find(|a| a.label() == label)
    }

    /// All activities, in id order.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.activities.values()
    }

    /// All non-nest activities, in id order.
    pub fn interactions(&self) -> impl Iterator<Item = &Activity> {
        self.activities.values().filter(|a| !a.is_nest())
    }

    /// Activities with no parent, in id order.
    pub fn roots(&self) -> impl Iterator<Item = &Activity> {
        self.activities.values().filter(|a| a.parent().is_none())
    }

    /// All relations, in insertion order.
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// The initial marking.
    pub fn marking(&self) -> &Marking {
        &self.marking
    }

    /// Mutable access to the initial marking.
    pub fn marking_mut(&mut self) -> &mut Marking {
        &mut self.marking
    }

    /// The parent nests of `id`: its parent, the parent's parent, and so on.
    ///
    /// Does not contain `id` itself. The walk terminates because nesting
    /// forms a forest.
    pub fn ancestors(&self, id: &Id) -> BTreeSet<Id> {
        let mut ancestors = BTreeSet::new();
        let mut current = self.activities.get(id).and_then(|a| a.parent().cloned());
        while let Some(parent) = current {
            current = self
                .activities
                .get(&parent)
                .and_then(|a| a.parent().cloned());
            if !ancestors.insert(parent) {
                break;
            }
        }
        ancestors
    }

    /// The transitive closure of `children` under `id`; empty for non-nests.
    ///
    /// Contains nested nests as well as leaves.
    pub fn descendants(&self, id: &Id) -> BTreeSet<Id> {
        let mut descendants = BTreeSet::new();
        let mut queue: Vec<Id> = match self.activities.get(id) {
            Some(a) => a.children().iter().cloned().collect(),
            None => Vec::new(),
        };
        while let Some(child) = queue.pop() {
            if let Some(a) = self.activities.get(&child) {
                queue.extend(a.children().iter().cloned());
            }
            descendants.insert(child);
        }
        descendants
    }

    /// The non-nest leaves reachable from `id` via `children`; for a
    /// non-nest, `{id}`.
    pub fn sub_events(&self, id: &Id) -> BTreeSet<Id> {
        match self.activities.get(id) {
            Some(a) if a.is_nest() => self
                .descendants(id)
                .into_iter()
                .filter(|d| self.activities.get(d).is_some_and(|a| !a.is_nest()))
                .collect(),
            Some(_) => BTreeSet::from([id.clone()]),
            None => BTreeSet::new(),
        }
    }

    /// Relations whose end is `id` or, when `include_ancestors` is set, any
    /// ancestor of `id`. An empty `kinds` slice matches any kind.
    pub fn incoming(
        &self,
        id: &Id,
        include_ancestors: bool,
        kinds: &[RelationKind],
    ) -> Vec<&Relation> {
        let targets = self.query_set(id, include_ancestors);
        self.relations
            .iter()
            .filter(|r| targets.contains(r.end()) && (kinds.is_empty() || kinds.contains(&r.kind())))
            .collect()
    }

    /// Relations whose start is `id` or, when `include_ancestors` is set, any
    /// ancestor of `id`. An empty `kinds` slice matches any kind.
    pub fn outgoing(
        &self,
        id: &Id,
        include_ancestors: bool,
        kinds: &[RelationKind],
    ) -> Vec<&Relation> {
        let sources = self.query_set(id, include_ancestors);
        self.relations
            .iter()
            .filter(|r| {
                sources.contains(r.start()) && (kinds.is_empty() || kinds.contains(&r.kind()))
            })
            .collect()
    }

    fn query_set(&self, id: &Id, include_ancestors: bool) -> BTreeSet<Id> {
        let mut set = if include_ancestors {
            self.ancestors(id)
        } else {
            BTreeSet::new()
        };
        set.insert(id.clone());
        set
    }

    /// Collapse redundant nests, once and non-recursively.
    ///
    /// A nest is removed if it has exactly one child, or if it has no
    /// incoming and no outgoing relations of its own (ancestor expansion
    /// ignored). Children are re-parented to the nest's parent; in the
    /// single-child case every relation and marking reference to the nest is
    /// rewritten to the child. Relation queries include ancestors by
    /// default, so the rewrite preserves their meaning.
    pub fn collapse(&mut self) {
        let nest_ids: Vec<Id> = self
            .activities
            .values()
            .filter(|a| a.is_nest())
            .map(|a| a.id().clone())
            .collect();

        for nest_id in nest_ids {
            let children: Vec<Id> = self.activities[&nest_id].children().iter().cloned().collect();
            let detached = self.incoming(&nest_id, false, &[]).is_empty()
                && self.outgoing(&nest_id, false, &[]).is_empty();
            if children.len() != 1 && !detached {
                continue;
            }

            debug!(nest:% = nest_id; "Collapsing redundant nest");
            let parent = self.activities[&nest_id].parent().cloned();
            if let Some(parent_id) = &parent {
                if let Some(parent_nest) = self.activities.get_mut(parent_id) {
                    parent_nest.remove_child(&nest_id);
                }
            }
            for child_id in &children {
                if let Some(child) = self.activities.get_mut(child_id) {
                    child.set_parent(parent.clone());
                }
                if let Some(parent_id) = &parent {
                    if let Some(parent_nest) = self.activities.get_mut(parent_id) {
                        parent_nest.insert_child(child_id.clone());
                    }
                }
            }

            if let [only_child] = children.as_slice() {
                for relation in &mut self.relations {
                    if relation.start() == &nest_id {
                        relation.set_start(only_child.clone());
                    }
                    if relation.end() == &nest_id {
                        relation.set_end(only_child.clone());
                    }
                }
                self.marking.substitute(&nest_id, only_child);
            } else {
                self.marking.remove(&nest_id);
            }

            self.activities.remove(&nest_id);
        }
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, activity: &Activity, indent: usize) -> fmt::Result {
        let pad = "    ".repeat(indent);
        write!(f, "\n{pad}{activity}")?;
        for relation in self.incoming(activity.id(), false, &[]) {
            write!(f, "\n{pad}<-{relation}")?;
        }
        for relation in self.outgoing(activity.id(), false, &[]) {
            write!(f, "\n{pad}->{relation}")?;
        }
        for child in activity.children() {
            if let Some(child) = self.activities.get(child) {
                self.fmt_node(f, child, indent + 1)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Graph {
    /// Recursive pretty print of the graph: each root activity with its
    /// relations, children indented below their nest.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for root in self.roots() {
            self.fmt_node(f, root, 0)?;
        }
        Ok(())
    }
}

/// A choreography: a DCR graph whose non-nest events are interactions, plus
/// the partition of its role names into users and services.
#[derive(Debug, Clone)]
pub struct Choreography {
    graph: Graph,
    users: BTreeSet<String>,
    services: BTreeSet<String>,
}

impl Choreography {
    /// Wrap a graph with its role partition.
    pub fn new(graph: Graph, users: BTreeSet<String>, services: BTreeSet<String>) -> Self {
        Self {
            graph,
            users,
            services,
        }
    }

    /// The underlying graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Roles classified as users.
    pub fn users(&self) -> &BTreeSet<String> {
        &self.users
    }

    /// Roles classified as services.
    pub fn services(&self) -> &BTreeSet<String> {
        &self.services
    }

    /// All roles of the graph, in lexicographic order.
    pub fn roles(&self) -> BTreeSet<String> {
        self.users.union(&self.services).cloned().collect()
    }

    /// Whether a role is classified as a user.
    pub fn is_user(&self, role: &str) -> bool {
        self.users.contains(role)
    }
}

/// An end-point projection: a DCR graph of endpoint activities, tagged with
/// the actor it was projected for.
#[derive(Debug, Clone)]
pub struct Projection {
    actor: String,
    graph: Graph,
    users: BTreeSet<String>,
    services: BTreeSet<String>,
}

impl Projection {
    /// Wrap a projected graph for `actor`. Redundant nests are collapsed.
    pub fn new(
        actor: impl Into<String>,
        mut graph: Graph,
        users: BTreeSet<String>,
        services: BTreeSet<String>,
    ) -> Self {
        graph.collapse();
        Self {
            actor: actor.into(),
            graph,
            users,
            services,
        }
    }

    /// The actor this projection was made for.
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// The underlying graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Roles classified as users.
    pub fn users(&self) -> &BTreeSet<String> {
        &self.users
    }

    /// Roles classified as services.
    pub fn services(&self) -> &BTreeSet<String> {
        &self.services
    }

    /// Whether the projection's actor is a user.
    pub fn is_user_actor(&self) -> bool {
        self.users.contains(&self.actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::Activity;

    fn plain(id: &str) -> Activity {
        Activity::plain(Id::new(id), id.to_uppercase(), None)
    }

    fn nest(id: &str) -> Activity {
        Activity::nest(Id::new(id), id.to_uppercase())
    }

    /// a, b inside nest n1; n1 inside n2; c outside.
    fn nested_graph() -> Graph {
        let mut graph = Graph::new();
        for activity in [plain("a"), plain("b"), plain("c"), nest("n1"), nest("n2")] {
            graph.add_activity(activity).unwrap();
        }
        graph.add_child(&Id::new("n1"), &Id::new("a")).unwrap();
        graph.add_child(&Id::new("n1"), &Id::new("b")).unwrap();
        graph.add_child(&Id::new("n2"), &Id::new("n1")).unwrap();
        graph
    }

    #[test]
    fn test_duplicate_activity_rejected() {
        let mut graph = Graph::new();
        graph.add_activity(plain("a")).unwrap();

        assert_eq!(
            graph.add_activity(plain("a")),
            Err(GraphError::DuplicateActivity(Id::new("a")))
        );
    }

    #[test]
    fn test_relation_requires_endpoints() {
        let mut graph = Graph::new();
        graph.add_activity(plain("a")).unwrap();

        let missing = Relation::new(Id::new("a"), Id::new("ghost"), RelationKind::Response);
        assert_eq!(
            graph.add_relation(missing),
            Err(GraphError::UnknownActivity(Id::new("ghost")))
        );
    }

    #[test]
    fn test_parent_child_coherence() {
        let graph = nested_graph();

        let a = graph.activity(&Id::new("a")).unwrap();
        assert_eq!(a.parent(), Some(&Id::new("n1")));
        assert!(
            graph
                .activity(&Id::new("n1"))
                .unwrap()
                .children()
                .contains(&Id::new("a"))
        );
    }

    #[test]
    fn test_add_child_rejects_non_nest() {
        let mut graph = nested_graph();
        assert_eq!(
            graph.add_child(&Id::new("a"), &Id::new("c")),
            Err(GraphError::NotANest(Id::new("a")))
        );
    }

    #[test]
    fn test_ancestors() {
        let graph = nested_graph();

        assert_eq!(
            graph.ancestors(&Id::new("a")),
            BTreeSet::from([Id::new("n1"), Id::new("n2")])
        );
        assert!(graph.ancestors(&Id::new("c")).is_empty());
        assert!(graph.ancestors(&Id::new("n2")).is_empty());
    }

    #[test]
    fn test_descendants_and_sub_events() {
        let graph = nested_graph();

        assert_eq!(
            graph.descendants(&Id::new("n2")),
            BTreeSet::from([Id::new("a"), Id::new("b"), Id::new("n1")])
        );
        assert_eq!(
            graph.sub_events(&Id::new("n2")),
            BTreeSet::from([Id::new("a"), Id::new("b")])
        );
        assert_eq!(graph.sub_events(&Id::new("c")), BTreeSet::from([Id::new("c")]));
        assert!(graph.descendants(&Id::new("c")).is_empty());
    }

    #[test]
    fn test_incoming_includes_ancestors() {
        let mut graph = nested_graph();
        graph
            .add_relation(Relation::new(
                Id::new("c"),
                Id::new("n2"),
                RelationKind::Condition,
            ))
            .unwrap();

        // A condition into the outer nest guards every nested event.
        assert_eq!(graph.incoming(&Id::new("a"), true, &[]).len(), 1);
        assert!(graph.incoming(&Id::new("a"), false, &[]).is_empty());
        assert_eq!(
            graph
                .incoming(&Id::new("a"), true, &[RelationKind::Condition])
                .len(),
            1
        );
        assert!(
            graph
                .incoming(&Id::new("a"), true, &[RelationKind::Response])
                .is_empty()
        );
    }

    #[test]
    fn test_outgoing_kind_filter() {
        let mut graph = nested_graph();
        graph
            .add_relation(Relation::new(
                Id::new("c"),
                Id::new("a"),
                RelationKind::Include,
            ))
            .unwrap();
        graph
            .add_relation(Relation::new(
                Id::new("c"),
                Id::new("b"),
                RelationKind::Exclude,
            ))
            .unwrap();

        assert_eq!(graph.outgoing(&Id::new("c"), true, &[]).len(), 2);
        assert_eq!(
            graph
                .outgoing(&Id::new("c"), true, &[RelationKind::Include])
                .len(),
            1
        );
    }

    #[test]
    fn test_collapse_single_child_rewrites_relations() {
        // Nest n with one child a, and a response x ->* n.
        let mut graph = Graph::new();
        for activity in [plain("a"), plain("x"), nest("n")] {
            graph.add_activity(activity).unwrap();
        }
        graph.add_child(&Id::new("n"), &Id::new("a")).unwrap();
        graph
            .add_relation(Relation::new(
                Id::new("x"),
                Id::new("n"),
                RelationKind::Response,
            ))
            .unwrap();
        graph.marking_mut().include(Id::new("n"));

        graph.collapse();

        assert!(graph.activity(&Id::new("n")).is_none());
        let relation = &graph.relations()[0];
        assert_eq!(relation.end(), &Id::new("a"));
        assert_eq!(relation.kind(), RelationKind::Response);
        assert_eq!(graph.activity(&Id::new("a")).unwrap().parent(), None);
        assert!(graph.marking().included().contains(&Id::new("a")));
    }

    #[test]
    fn test_collapse_keeps_connected_multi_child_nest() {
        let mut graph = nested_graph();
        graph
            .add_relation(Relation::new(
                Id::new("c"),
                Id::new("n1"),
                RelationKind::Include,
            ))
            .unwrap();

        graph.collapse();

        // n1 has two children and a relation: kept. n2 had one child: spliced.
        assert!(graph.activity(&Id::new("n1")).is_some());
        assert!(graph.activity(&Id::new("n2")).is_none());
        assert_eq!(graph.activity(&Id::new("n1")).unwrap().parent(), None);
    }

    #[test]
    fn test_collapse_detached_nest_moves_children_up() {
        // n1 has two children and no relations of its own: spliced, children
        // move up into n2.
        let mut graph = nested_graph();
        graph
            .add_relation(Relation::new(
                Id::new("c"),
                Id::new("n2"),
                RelationKind::Include,
            ))
            .unwrap();

        graph.collapse();

        assert!(graph.activity(&Id::new("n1")).is_none());
        let n2 = graph.activity(&Id::new("n2")).unwrap();
        assert!(n2.children().contains(&Id::new("a")));
        assert!(n2.children().contains(&Id::new("b")));
        assert_eq!(
            graph.activity(&Id::new("a")).unwrap().parent(),
            Some(&Id::new("n2"))
        );
    }

    #[test]
    fn test_collapse_preserves_non_nest_events() {
        let mut graph = nested_graph();
        let before: Vec<Id> = graph.interactions().map(|a| a.id().clone()).collect();

        graph.collapse();

        let after: Vec<Id> = graph.interactions().map(|a| a.id().clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_display_lists_roots() {
        let mut graph = nested_graph();
        graph
            .add_relation(Relation::new(
                Id::new("c"),
                Id::new("n2"),
                RelationKind::Condition,
            ))
            .unwrap();

        let printed = graph.to_string();
        assert!(printed.contains("N2"));
        assert!(printed.contains("->c-condition-n2"));
    }

    #[test]
    fn test_find_by_label() {
        let graph = nested_graph();
        assert_eq!(
            graph.find_by_label("A").map(|a| a.id().clone()),
            Some(Id::new("a"))
        );
        assert!(graph.find_by_label("missing").is_none());
    }
}
