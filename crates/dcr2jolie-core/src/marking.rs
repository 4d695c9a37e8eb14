//! Graph marking: the (Included, Pending, Executed) triple.

use std::collections::BTreeSet;

use crate::identifier::Id;

/// The state of a DCR graph.
///
/// Three sets of activity ids: `included` activities may fire, `pending`
/// activities must eventually fire, `executed` activities have fired at
/// least once. The projection compiler only reads markings; it never fires
/// events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marking {
    included: BTreeSet<Id>,
    pending: BTreeSet<Id>,
    executed: BTreeSet<Id>,
}

impl Marking {
    /// Create an empty marking.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a marking from its three sets.
    pub fn from_sets(
        included: BTreeSet<Id>,
        pending: BTreeSet<Id>,
        executed: BTreeSet<Id>,
    ) -> Self {
        Self {
            included,
            pending,
            executed,
        }
    }

    /// The currently included activities.
    pub fn included(&self) -> &BTreeSet<Id> {
        &self.included
    }

    /// The activities with a pending response obligation.
    pub fn pending(&self) -> &BTreeSet<Id> {
        &self.pending
    }

    /// The activities that have been executed.
    pub fn executed(&self) -> &BTreeSet<Id> {
        &self.executed
    }

    /// Mark an activity as initially included.
    pub fn include(&mut self, id: Id) {
        self.included.insert(id);
    }

    /// Mark an activity as initially pending.
    pub fn make_pending(&mut self, id: Id) {
        self.pending.insert(id);
    }

    /// Mark an activity as initially executed.
    pub fn mark_executed(&mut self, id: Id) {
        self.executed.insert(id);
    }

    /// Replace every occurrence of `old` with `new` in all three sets.
    ///
    /// Used when collapse substitutes a nest's only child for the nest.
    pub(crate) fn substitute(&mut self, old: &Id, new: &Id) {
        for set in [&mut self.included, &mut self.pending, &mut self.executed] {
            if set.remove(old) {
                set.insert(new.clone());
            }
        }
    }

    /// Remove an id from all three sets.
    pub(crate) fn remove(&mut self, id: &Id) {
        self.included.remove(id);
        self.pending.remove(id);
        self.executed.remove(id);
    }
}
