//! Dependency closure over DCR relations.
//!
//! For an event `e`, the *dependees* are the events that must be observable
//! to an actor who observes `e`; the *dependers* are the events an observer
//! of `e` may affect. Both close over exactly one intermediate guard
//! relation: an Include or Exclude feeding a Condition or Milestone, and a
//! Response feeding a Milestone. Closure depth is exactly two hops, not
//! transitive.
//!
//! All relation queries include relations attached to ancestor nests, and
//! far endpoints contribute their non-nest leaves via
//! [`sub_events`](Graph::sub_events).

use std::collections::BTreeSet;

use dcr2jolie_core::{graph::Graph, identifier::Id, relation::RelationKind};

fn is_guard(kind: RelationKind) -> bool {
    matches!(kind, RelationKind::Condition | RelationKind::Milestone)
}

/// The events `e` depends on: `e` itself, the leaves of every relation
/// source into `e`, and the leaves feeding those sources across the two-hop
/// guard patterns.
pub fn direct_dependees(graph: &Graph, event: &Id) -> BTreeSet<Id> {
    let mut dependees = BTreeSet::from([event.clone()]);

    for relation in graph.incoming(event, true, &[]) {
        dependees.extend(graph.sub_events(relation.start()));

        if is_guard(relation.kind()) {
            for feeder in graph.incoming(relation.start(), true, &[]) {
                let feeds_guard = matches!(
                    feeder.kind(),
                    RelationKind::Include | RelationKind::Exclude
                ) || (feeder.kind() == RelationKind::Response
                    && relation.kind() == RelationKind::Milestone);
                if feeds_guard {
                    dependees.extend(graph.sub_events(feeder.start()));
                }
            }
        }
    }
    dependees
}

/// The events depending on `e`: `e` itself, the leaves of every relation
/// target of `e`, and the guard targets reached across the two-hop patterns.
pub fn direct_dependers(graph: &Graph, event: &Id) -> BTreeSet<Id> {
    let mut dependers = BTreeSet::from([event.clone()]);

    for relation in graph.outgoing(event, true, &[]) {
        dependers.extend(graph.sub_events(relation.end()));

        if matches!(
            relation.kind(),
            RelationKind::Include | RelationKind::Exclude | RelationKind::Response
        ) {
            for guarded in graph.outgoing(relation.end(), true, &[]) {
                let feeds_guard = (matches!(
                    relation.kind(),
                    RelationKind::Include | RelationKind::Exclude
                ) && is_guard(guarded.kind()))
                    || (relation.kind() == RelationKind::Response
                        && guarded.kind() == RelationKind::Milestone);
                if feeds_guard {
                    dependers.extend(graph.sub_events(guarded.end()));
                }
            }
        }
    }
    dependers
}

/// Union of [`direct_dependees`] over a set of events.
pub fn dependees<'a>(graph: &Graph, events: impl IntoIterator<Item = &'a Id>) -> BTreeSet<Id> {
    let mut union = BTreeSet::new();
    for event in events {
        union.extend(direct_dependees(graph, event));
    }
    union
}

/// Union of [`direct_dependers`] over a set of events.
pub fn dependers<'a>(graph: &Graph, events: impl IntoIterator<Item = &'a Id>) -> BTreeSet<Id> {
    let mut union = BTreeSet::new();
    for event in events {
        union.extend(direct_dependers(graph, event));
    }
    union
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use dcr2jolie_core::{activity::Activity, relation::Relation};

    fn graph_with(events: &[&str], relations: &[(&str, RelationKind, &str)]) -> Graph {
        let mut graph = Graph::new();
        for id in events {
            graph
                .add_activity(Activity::plain(Id::new(id), *id, None))
                .unwrap();
        }
        for (start, kind, end) in relations {
            graph
                .add_relation(Relation::new(Id::new(start), Id::new(end), *kind))
                .unwrap();
        }
        graph
    }

    fn ids(names: &[&str]) -> BTreeSet<Id> {
        names.iter().map(|n| Id::new(n)).collect()
    }

    #[test]
    fn test_event_depends_on_itself() {
        let graph = graph_with(&["a"], &[]);
        assert_eq!(direct_dependees(&graph, &Id::new("a")), ids(&["a"]));
        assert_eq!(direct_dependers(&graph, &Id::new("a")), ids(&["a"]));
    }

    #[test]
    fn test_one_hop_any_kind() {
        let graph = graph_with(&["s", "e"], &[("s", RelationKind::CoResponse, "e")]);
        assert_eq!(direct_dependees(&graph, &Id::new("e")), ids(&["e", "s"]));
        assert_eq!(direct_dependers(&graph, &Id::new("s")), ids(&["e", "s"]));
    }

    #[test]
    fn test_two_hop_include_into_condition() {
        // s -->+ t -->C e
        let graph = graph_with(
            &["s", "t", "e"],
            &[
                ("s", RelationKind::Include, "t"),
                ("t", RelationKind::Condition, "e"),
            ],
        );

        assert_eq!(direct_dependees(&graph, &Id::new("e")), ids(&["e", "s", "t"]));
        assert_eq!(direct_dependers(&graph, &Id::new("s")), ids(&["e", "s", "t"]));
    }

    #[test]
    fn test_two_hop_response_into_milestone() {
        let graph = graph_with(
            &["s", "t", "e"],
            &[
                ("s", RelationKind::Response, "t"),
                ("t", RelationKind::Milestone, "e"),
            ],
        );

        assert!(direct_dependees(&graph, &Id::new("e")).contains(&Id::new("s")));
        assert!(direct_dependers(&graph, &Id::new("s")).contains(&Id::new("e")));
    }

    #[test]
    fn test_response_into_condition_is_not_followed() {
        // Response feeds only Milestones, not Conditions.
        let graph = graph_with(
            &["s", "t", "e"],
            &[
                ("s", RelationKind::Response, "t"),
                ("t", RelationKind::Condition, "e"),
            ],
        );

        assert!(!direct_dependees(&graph, &Id::new("e")).contains(&Id::new("s")));
        assert!(!direct_dependers(&graph, &Id::new("s")).contains(&Id::new("e")));
    }

    #[test]
    fn test_closure_is_not_transitive() {
        // x -->+ s -->+ t -->C e: x is three hops from e and must stay out.
        let graph = graph_with(
            &["x", "s", "t", "e"],
            &[
                ("x", RelationKind::Include, "s"),
                ("s", RelationKind::Include, "t"),
                ("t", RelationKind::Condition, "e"),
            ],
        );

        let dependees = direct_dependees(&graph, &Id::new("e"));
        assert!(dependees.contains(&Id::new("s")));
        assert!(!dependees.contains(&Id::new("x")));
    }

    #[test]
    fn test_nested_endpoints_contribute_leaves() {
        // Relations attached to a nest count for its leaves, and nest
        // endpoints contribute their leaves to the closure.
        let mut graph = graph_with(&["a", "b", "e"], &[]);
        graph
            .add_activity(Activity::nest(Id::new("n"), "N"))
            .unwrap();
        graph.add_child(&Id::new("n"), &Id::new("a")).unwrap();
        graph.add_child(&Id::new("n"), &Id::new("b")).unwrap();
        graph
            .add_relation(Relation::new(
                Id::new("n"),
                Id::new("e"),
                RelationKind::Condition,
            ))
            .unwrap();

        assert_eq!(direct_dependees(&graph, &Id::new("e")), ids(&["a", "b", "e"]));
        // The relation starts at the nest, so each leaf inherits it.
        assert!(direct_dependers(&graph, &Id::new("a")).contains(&Id::new("e")));
    }

    #[test]
    fn test_set_form_is_union() {
        let graph = graph_with(
            &["s", "e1", "e2"],
            &[
                ("s", RelationKind::Condition, "e1"),
                ("s", RelationKind::Condition, "e2"),
            ],
        );

        let delta = ids(&["e1", "e2"]);
        assert_eq!(dependees(&graph, &delta), ids(&["e1", "e2", "s"]));
        assert_eq!(dependers(&graph, &ids(&["s"])), ids(&["e1", "e2", "s"]));
    }

    prop_compose! {
        /// A flat graph over a fixed event pool with random relations.
        fn arbitrary_graph()(
            relations in prop::collection::vec(
                (0usize..6, 0usize..6, 0usize..6),
                0..12,
            )
        ) -> Graph {
            const EVENTS: [&str; 6] = ["e0", "e1", "e2", "e3", "e4", "e5"];
            let mut graph = Graph::new();
            for id in EVENTS {
                graph.add_activity(Activity::plain(Id::new(id), id, None)).unwrap();
            }
            for (start, end, kind) in relations {
                let kind = RelationKind::ALL[kind];
                graph
                    .add_relation(Relation::new(
                        Id::new(EVENTS[start]),
                        Id::new(EVENTS[end]),
                        kind,
                    ))
                    .unwrap();
            }
            graph
        }
    }

    proptest! {
        /// e' is a dependee of e exactly when e is a depender of e'.
        #[test]
        fn prop_dependency_symmetry(graph in arbitrary_graph()) {
            let ids: Vec<Id> = graph.activities().map(|a| a.id().clone()).collect();
            for e in &ids {
                let dependees = direct_dependees(&graph, e);
                for e_prime in &ids {
                    let forward = dependees.contains(e_prime);
                    let backward = direct_dependers(&graph, e_prime).contains(e);
                    prop_assert_eq!(
                        forward,
                        backward,
                        "symmetry broken for {} / {}",
                        e,
                        e_prime
                    );
                }
            }
        }
    }
}
