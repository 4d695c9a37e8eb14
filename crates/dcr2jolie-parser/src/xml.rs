//! DCR portal XML ingestion.
//!
//! This module reads the DCR-Graph XML format into a
//! [`Choreography`]: label mappings, the (recursively nested) event tree,
//! the constraint groups, and the initial marking. The public entry point is
//! [`parse`].
//!
//! The parser performs no I/O; the caller supplies the document text.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use log::{debug, trace};
use roxmltree::{Document, Node};

use dcr2jolie_core::{
    activity::Activity,
    graph::{Choreography, Graph},
    identifier::Id,
    relation::{Relation, RelationKind},
};

use crate::error::{ParseError, Result};
use crate::role::parse_role;

/// Parse a DCR choreography from XML text.
///
/// # Errors
///
/// Returns [`ParseError`] for malformed documents, role strings violating
/// the choreography grammar, duplicate event ids, and references to unknown
/// event ids.
///
/// # Examples
///
/// ```no_run
/// let source = std::fs::read_to_string("choreography.xml").unwrap();
/// let choreography = dcr2jolie_parser::parse(&source).expect("Failed to parse");
/// ```
pub fn parse(source: &str) -> Result<Choreography> {
    let document = Document::parse(source)?;
    let root = document.root_element();

    let mut parser = ChoreographyParser::default();
    parser.read_label_mappings(root)?;
    parser.read_events(root)?;
    parser.read_constraints(root)?;
    parser.into_choreography(root)
}

fn missing(element: &str, attribute: &str) -> ParseError {
    ParseError::MissingAttribute {
        element: element.to_string(),
        attribute: attribute.to_string(),
    }
}

fn elements<'a, 'd: 'a>(node: Node<'a, 'd>, tag: &'static str) -> impl Iterator<Item = Node<'a, 'd>> {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name(tag))
}

/// Accumulates document state before the graph is sealed.
///
/// Events are kept in document order while reading; the arena orders them by
/// id when the graph is built.
#[derive(Default)]
struct ChoreographyParser {
    mappings: BTreeMap<String, String>,
    activities: IndexMap<Id, Activity>,
    nest_links: Vec<(Id, Id)>,
    relations: Vec<Relation>,
    users: BTreeSet<String>,
    services: BTreeSet<String>,
}

impl ChoreographyParser {
    /// Relate activity labels to event ids.
    fn read_label_mappings(&mut self, root: Node<'_, '_>) -> Result<()> {
        for mapping in root
            .descendants()
            .filter(|n| n.has_tag_name("labelMapping"))
        {
            let event_id = mapping
                .attribute("eventId")
                .ok_or_else(|| missing("labelMapping", "eventId"))?;
            let label_id = mapping
                .attribute("labelId")
                .ok_or_else(|| missing("labelMapping", "labelId"))?;
            self.mappings
                .insert(event_id.to_string(), label_id.to_string());
        }
        trace!(mappings = self.mappings.len(); "Read label mappings");
        Ok(())
    }

    /// Read every `events` container, recursing into nested events.
    fn read_events(&mut self, root: Node<'_, '_>) -> Result<()> {
        for events in root.descendants().filter(|n| n.has_tag_name("events")) {
            for event in elements(events, "event") {
                self.read_event_or_nest(event)?;
            }
        }
        debug!(events = self.activities.len(); "Read event tree");
        Ok(())
    }

    /// An `event` node with child `event`s is a nest; children are read
    /// first, then linked under the fresh nest.
    fn read_event_or_nest(&mut self, event: Node<'_, '_>) -> Result<Id> {
        let id_attr = event.attribute("id").ok_or_else(|| missing("event", "id"))?;
        let id = Id::new(id_attr);
        let label = self
            .mappings
            .get(id_attr)
            .cloned()
            .unwrap_or_else(|| id_attr.to_string());

        let nested: Vec<Node<'_, '_>> = elements(event, "event").collect();
        if nested.is_empty() {
            let activity = self.read_interaction(event, id.clone(), label)?;
            self.insert_activity(activity)?;
        } else {
            let child_ids = nested
                .into_iter()
                .map(|child| self.read_event_or_nest(child))
                .collect::<Result<Vec<Id>>>()?;
            self.insert_activity(Activity::nest(id.clone(), label))?;
            for child in child_ids {
                self.nest_links.push((id.clone(), child));
            }
        }
        Ok(id)
    }

    /// Read a leaf event: datatype tag plus the role declarations, which
    /// must name exactly one initiator and at least one receiver.
    fn read_interaction(&mut self, event: Node<'_, '_>, id: Id, label: String) -> Result<Activity> {
        let datatype = elements(event, "custom")
            .next()
            .and_then(|custom| elements(custom, "eventData").next())
            .and_then(|data| elements(data, "dataType").next())
            .and_then(|node| node.text())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(String::from);

        let mut initiator: Option<String> = None;
        let mut receivers = BTreeSet::new();
        let mut roles = BTreeSet::new();
        for role_node in event.descendants().filter(|n| n.has_tag_name("role")) {
            let Some(text) = role_node.text().map(str::trim).filter(|t| !t.is_empty()) else {
                continue;
            };
            let decl = parse_role(text)?;
            if decl.is_initiator {
                if initiator.is_some() {
                    return Err(ParseError::ExtraInitiator(id.to_string()));
                }
                initiator = Some(decl.name.clone());
            } else {
                receivers.insert(decl.name.clone());
            }
            if decl.is_user {
                self.users.insert(decl.name.clone());
            } else {
                self.services.insert(decl.name.clone());
            }
            roles.insert(decl.name);
        }

        let initiator = initiator.ok_or_else(|| ParseError::MissingInitiator(id.to_string()))?;
        if receivers.is_empty() {
            return Err(ParseError::MissingReceivers(id.to_string()));
        }

        let mut activity = Activity::interaction(id, label, initiator, receivers, datatype);
        activity.set_roles(roles);
        Ok(activity)
    }

    fn insert_activity(&mut self, activity: Activity) -> Result<()> {
        let id = activity.id().clone();
        if self.activities.insert(id.clone(), activity).is_some() {
            return Err(ParseError::DuplicateEvent(id.to_string()));
        }
        Ok(())
    }

    /// Read every constraint group; the leaf tag names the relation kind.
    fn read_constraints(&mut self, root: Node<'_, '_>) -> Result<()> {
        for constraints in root.descendants().filter(|n| n.has_tag_name("constraints")) {
            for group in constraints.children().filter(Node::is_element) {
                for relation in group.children().filter(Node::is_element) {
                    let tag = relation.tag_name().name();
                    let kind: RelationKind = tag
                        .parse()
                        .map_err(|_| ParseError::UnknownRelation(tag.to_string()))?;
                    let source = relation
                        .attribute("sourceId")
                        .ok_or_else(|| missing(tag, "sourceId"))?;
                    let target = relation
                        .attribute("targetId")
                        .ok_or_else(|| missing(tag, "targetId"))?;

                    let mut parsed = Relation::new(Id::new(source), Id::new(target), kind);
                    if let Some(expression) = relation.attribute("expressionId") {
                        parsed = parsed.with_expression(expression);
                    }
                    self.relations.push(parsed);
                }
            }
        }
        debug!(relations = self.relations.len(); "Read constraints");
        Ok(())
    }

    /// Ids listed under every marking group with the given tag.
    fn read_marked(&self, root: Node<'_, '_>, tag: &'static str) -> Result<Vec<Id>> {
        let mut ids = Vec::new();
        for group in root.descendants().filter(|n| n.has_tag_name(tag)) {
            for event in elements(group, "event") {
                let id = event.attribute("id").ok_or_else(|| missing("event", "id"))?;
                let id = Id::new(id);
                if !self.activities.contains_key(&id) {
                    return Err(ParseError::DanglingReference(id.to_string()));
                }
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Seal the accumulated state into a choreography graph.
    fn into_choreography(self, root: Node<'_, '_>) -> Result<Choreography> {
        let included = self.read_marked(root, "included")?;
        let executed = self.read_marked(root, "executed")?;
        let pending = self.read_marked(root, "pendingResponses")?;

        for relation in &self.relations {
            for endpoint in [relation.start(), relation.end()] {
                if !self.activities.contains_key(endpoint) {
                    return Err(ParseError::DanglingReference(endpoint.to_string()));
                }
            }
        }

        let mut graph = Graph::new();
        for (_, activity) in self.activities {
            graph
                .add_activity(activity)
                .expect("duplicates rejected while reading");
        }
        for (nest, child) in &self.nest_links {
            graph
                .add_child(nest, child)
                .expect("nest links point at activities read from the same tree");
        }
        for relation in self.relations {
            graph
                .add_relation(relation)
                .expect("endpoints validated above");
        }
        for id in included {
            graph.marking_mut().include(id);
        }
        for id in executed {
            graph.marking_mut().mark_executed(id);
        }
        for id in pending {
            graph.marking_mut().make_pending(id);
        }

        Ok(Choreography::new(graph, self.users, self.services))
    }
}
