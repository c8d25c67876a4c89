// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A simulation entity.
//!
//! Every tuner, slice, bus and arbiter holds an entity so that the model forms
//! a hierarchy of named parts. The entity carries the unique ID and the
//! [`Tracker`] used for all of its _log_ / _trace_ events.

use std::fmt;
use std::rc::Rc;

use crate::{Id, Tracker, create, destroy};

/// A simulation entity
///
/// An entity is part of a hierarchical simulation in which it must have a
/// parent. The top of the hierarchy is created using [`toplevel`].
pub struct Entity {
    /// Name of this entity.
    pub name: String,

    /// `None` only for the top-level entity.
    pub parent: Option<Rc<Entity>>,

    /// Identifies this entity in every event it emits.
    pub id: Id,

    /// Shared by the whole hierarchy.
    pub tracker: Tracker,
}

const JOIN: &str = "::";

impl Entity {
    /// Create a new entity below `parent`.
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        let tracker = parent.tracker.clone();
        let id = tracker.unique_id();
        tracker.add_entity(id, &format!("{}{JOIN}{name}", parent.full_name()));

        let entity = Self {
            name: name.to_string(),
            parent: Some(parent.clone()),
            id,
            tracker,
        };
        create!(entity);
        entity
    }

    /// The `::` separated names from the top-level down to this entity.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}{JOIN}{}", parent.full_name(), self.name),
            None => self.name.clone(),
        }
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        destroy!(self);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("id", &self.id)
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// Create the top-level entity. This should be the only entity without a
/// parent.
pub fn toplevel(tracker: &Tracker, name: &str) -> Rc<Entity> {
    let id = tracker.unique_id();
    tracker.add_entity(id, name);
    let top = Rc::new(Entity {
        parent: None,
        name: String::from(name),
        id,
        tracker: tracker.clone(),
    });
    create!(top);
    top
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_init;

    #[test]
    fn full_names_are_joined() {
        let (_test_tracker, tracker) = test_init!(10);
        let top = toplevel(&tracker, "top");
        let bus = Rc::new(Entity::new(&top, "bus"));
        let slice = Entity::new(&bus, "slice3");
        assert_eq!(slice.full_name(), "top::bus::slice3");
        assert_eq!(format!("{slice}"), "top::bus::slice3");
    }
}
