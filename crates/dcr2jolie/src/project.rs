//! End-point projection of DCR choreographies.
//!
//! [`project_for`] derives the local DCR graph one role must observe:
//! it selects the events the role initiates (with their ancestor nests),
//! closes over their dependencies, adds the events the role receives,
//! rewrites the relations that reach into the delta, restricts the initial
//! marking, and rebuilds everything as fresh endpoint activities inside the
//! original nesting. [`project`] runs it for every role.

use std::collections::BTreeSet;

use log::{debug, info};

use dcr2jolie_core::{
    activity::{Activity, ActivityKind},
    graph::{Choreography, Graph, GraphError, Projection},
    identifier::Id,
    relation::{Relation, RelationKind},
};

use crate::{closure, error::Dcr2JolieError, projectable};

fn graph_error(err: GraphError) -> Dcr2JolieError {
    Dcr2JolieError::Graph(err.to_string())
}

/// Project the choreography for every role, in lexicographic role order.
///
/// # Errors
///
/// Returns [`Dcr2JolieError::NotProjectable`] for the first role that fails
/// the projectability check.
pub fn project(choreography: &Choreography) -> Result<Vec<Projection>, Dcr2JolieError> {
    choreography
        .roles()
        .iter()
        .map(|role| project_for(choreography, role))
        .collect()
}

/// Build the end-point projection of `choreography` for `actor`.
///
/// # Errors
///
/// Returns [`Dcr2JolieError::NotProjectable`] with every offending
/// event/depender pair if the projectability check fails for `actor`.
pub fn project_for(choreography: &Choreography, actor: &str) -> Result<Projection, Dcr2JolieError> {
    let violations = projectable::violations_for(choreography, actor);
    if !violations.is_empty() {
        return Err(Dcr2JolieError::NotProjectable {
            actor: actor.to_string(),
            violations,
        });
    }

    info!(actor; "Projecting choreography");
    let graph = choreography.graph();

    // The actor's initiated delta, with ancestor nests.
    let mut delta = BTreeSet::new();
    for event in graph
        .interactions()
        .filter(|a| a.initiator() == Some(actor))
    {
        delta.extend(graph.ancestors(event.id()));
        delta.insert(event.id().clone());
    }

    // Everything the delta depends on, two hops across guards.
    let dependee_events = closure::dependees(graph, &delta);

    // Events the actor receives.
    let receiver_events: BTreeSet<Id> = graph
        .interactions()
        .filter(|a| a.receivers().is_some_and(|r| r.contains(actor)))
        .map(|a| a.id().clone())
        .collect();

    let mut universe = delta.clone();
    universe.extend(dependee_events.iter().cloned());
    universe.extend(receiver_events.iter().cloned());

    // Projected marking. Events outside `blocking` cannot guard the delta,
    // so they are forced included; receiver-only events stay included
    // unless the delta projection excluded them.
    let marking = graph.marking();
    let executed: BTreeSet<Id> = marking
        .executed()
        .intersection(&dependee_events)
        .cloned()
        .collect();
    let pending: BTreeSet<Id> = marking
        .pending()
        .intersection(&dependee_events)
        .cloned()
        .collect();

    let guards = [RelationKind::Condition, RelationKind::Milestone];
    let mut blocking = delta.clone();
    for activity in graph.activities() {
        if graph
            .outgoing(activity.id(), true, &guards)
            .iter()
            .any(|r| delta.contains(r.end()))
        {
            blocking.insert(activity.id().clone());
        }
    }
    let mut included_delta: BTreeSet<Id> = marking
        .included()
        .intersection(&blocking)
        .cloned()
        .collect();
    included_delta.extend(dependee_events.difference(&blocking).cloned());
    let excluded_delta: BTreeSet<Id> = dependee_events
        .difference(&included_delta)
        .cloned()
        .collect();
    let included_receivers: BTreeSet<Id> = receiver_events
        .difference(&excluded_delta)
        .cloned()
        .collect();
    let included: BTreeSet<Id> = included_delta.union(&included_receivers).cloned().collect();

    let kept = select_relations(graph, &delta, &receiver_events, &universe);

    // Rebuild events and relations with fresh endpoint activities. Relation
    // endpoints are rebuilt too: a kept relation may start or end at a nest
    // whose leaves, not the nest itself, are in the universe.
    let mut projected = Graph::new();
    for id in &universe {
        add_event(graph, &mut projected, actor, id)?;
    }
    for relation in &kept {
        add_event(graph, &mut projected, actor, relation.start())?;
        add_event(graph, &mut projected, actor, relation.end())?;
        let mut fresh = Relation::new(
            relation.start().clone(),
            relation.end().clone(),
            relation.kind(),
        );
        if let Some(expression) = relation.expression() {
            fresh = fresh.with_expression(expression);
        }
        projected.add_relation(fresh).map_err(graph_error)?;
    }

    for id in executed {
        if projected.activity(&id).is_some() {
            projected.marking_mut().mark_executed(id);
        }
    }
    for id in pending {
        if projected.activity(&id).is_some() {
            projected.marking_mut().make_pending(id);
        }
    }
    for id in included {
        if projected.activity(&id).is_some() {
            projected.marking_mut().include(id);
        }
    }

    // Role partition, computed from the rebuilt events so a receiver
    // projection does not leak sibling receivers.
    let mut users = BTreeSet::new();
    let mut services = BTreeSet::new();
    for activity in projected.interactions() {
        let receivers = activity.receivers().into_iter().flatten();
        for role in activity.initiator().into_iter().chain(receivers.map(String::as_str)) {
            if choreography.is_user(role) {
                users.insert(role.to_string());
            } else {
                services.insert(role.to_string());
            }
        }
    }

    debug!(
        actor,
        events = projected.activities().count(),
        relations = projected.relations().len();
        "Projection built"
    );
    Ok(Projection::new(actor, projected, users, services))
}

/// The relations a projection keeps, per kind:
///
/// - Condition / Milestone: those into the delta, plus guards among observed
///   events (the end is received by the actor and the start is already in
///   the projected universe) so an input stays ordered behind the events
///   that enable it.
/// - Response / CoResponse: those into the delta, plus those into the start
///   of a Milestone-to-delta relation.
/// - Include / Exclude: those into the delta, plus those into the start of
///   a Condition-to-delta or Milestone-to-delta relation.
///
/// Guard propagation follows the delta-targeted guards only; guards on
/// merely-received events never pull foreign events into the projection.
fn select_relations<'g>(
    graph: &'g Graph,
    delta: &BTreeSet<Id>,
    receiver_events: &BTreeSet<Id>,
    universe: &BTreeSet<Id>,
) -> Vec<&'g Relation> {
    let relations = graph.relations();
    let guards_observed = |r: &Relation| {
        delta.contains(r.end())
            || (receiver_events.contains(r.end()) && universe.contains(r.start()))
    };

    let conditions: Vec<&Relation> = relations
        .iter()
        .filter(|r| r.kind() == RelationKind::Condition && guards_observed(r))
        .collect();
    let milestones: Vec<&Relation> = relations
        .iter()
        .filter(|r| r.kind() == RelationKind::Milestone && guards_observed(r))
        .collect();

    let milestone_starts: BTreeSet<&Id> = milestones
        .iter()
        .filter(|r| delta.contains(r.end()))
        .map(|r| r.start())
        .collect();
    let guard_starts: BTreeSet<&Id> = conditions
        .iter()
        .chain(milestones.iter())
        .filter(|r| delta.contains(r.end()))
        .map(|r| r.start())
        .collect();

    let mut kept = conditions.clone();
    kept.extend(milestones.iter().copied());
    for relation in relations {
        let keep = match relation.kind() {
            RelationKind::Response | RelationKind::CoResponse => {
                delta.contains(relation.end()) || milestone_starts.contains(relation.end())
            }
            RelationKind::Include | RelationKind::Exclude => {
                delta.contains(relation.end()) || guard_starts.contains(relation.end())
            }
            RelationKind::Condition | RelationKind::Milestone => false,
        };
        if keep {
            kept.push(relation);
        }
    }
    kept
}

/// Recursively add the projected copy of `id` to the projection, together
/// with its ancestor chain. Already-added events are left untouched.
///
/// An interaction is rebuilt as an endpoint activity: an output with the
/// original receivers when `actor` initiates it, otherwise an input whose
/// only receiver is `actor` (a receiver cannot learn about other
/// receivers).
fn add_event(
    graph: &Graph,
    projected: &mut Graph,
    actor: &str,
    id: &Id,
) -> Result<(), Dcr2JolieError> {
    if projected.activity(id).is_some() {
        return Ok(());
    }
    let Some(original) = graph.activity(id) else {
        return Ok(());
    };

    let mut fresh = match original.kind() {
        ActivityKind::Nest { .. } => Activity::nest(id.clone(), original.label()),
        ActivityKind::Interaction {
            initiator,
            receivers,
            datatype,
        } => {
            let is_output = initiator == actor;
            let receivers = if is_output {
                receivers.clone()
            } else {
                BTreeSet::from([actor.to_string()])
            };
            Activity::endpoint(
                id.clone(),
                original.label(),
                initiator.clone(),
                receivers,
                datatype.clone(),
                is_output,
            )
        }
        _ => {
            return Err(Dcr2JolieError::Graph(format!(
                "choreography event '{id}' is not an interaction"
            )));
        }
    };
    fresh.set_roles(original.roles().iter().cloned());
    projected.add_activity(fresh).map_err(graph_error)?;

    if let Some(parent_id) = original.parent() {
        let parent_id = parent_id.clone();
        add_event(graph, projected, actor, &parent_id)?;
        projected.add_child(&parent_id, id).map_err(graph_error)?;
    }
    Ok(())
}
