// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The [`Track`] interface and the trackers that implement it.

/// Tracker that discards everything.
pub mod dev_null;
/// Tracker that writes one text line per event.
pub mod text;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub use dev_null::DevNullTracker;
use regex::Regex;
pub use text::TextTracker;

use crate::{Id, ROOT};

/// A tracker could not be built from the options given.
#[derive(Debug)]
pub struct TrackConfigError(pub String);

impl fmt::Display for TrackConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracker configuration error: {}", self.0)
    }
}

impl std::error::Error for TrackConfigError {}

/// Receiver of every _log_ / _trace_ event emitted by the entity hierarchy.
pub trait Track {
    /// Hand out an ID no other entity has been given.
    fn unique_id(&self) -> Id;

    /// Whether events of `level` from entity `id` should be emitted.
    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool;

    /// Register the full name of a new entity so filters can be applied.
    fn add_entity(&self, id: Id, entity_name: &str);

    /// Entity `created_obj` was created below `created_by`.
    fn create(&self, created_by: Id, created_obj: Id, name: &str);

    /// Entity `destroyed_obj` was dropped.
    fn destroy(&self, destroyed_by: Id, destroyed_obj: Id);

    /// A text message.
    fn log(&self, msg_by: Id, level: log::Level, msg: fmt::Arguments);

    /// Lock-step tick `tick` is starting.
    fn tick(&self, set_by: Id, tick: u64);

    /// Flush anything buffered before the process exits.
    fn shutdown(&self);
}

/// Handle to a [`Track`] shared by every entity of a run.
pub type Tracker = Rc<dyn Track>;

/// A [`Tracker`] that drops every event.
#[must_use]
pub fn dev_null_tracker() -> Tracker {
    Rc::new(DevNullTracker)
}

/// Decides the level each entity emits at and allocates entity IDs.
///
/// Entities take the level of the first filter whose regular expression
/// matches their full name, or the default level if none does.
pub struct EntityManager {
    default_level: log::Level,
    filters: Vec<(Regex, log::Level)>,
    next_id: Cell<u64>,

    /// Only entities whose level differs from the default are stored.
    overrides: RefCell<HashMap<Id, log::Level>>,
}

impl EntityManager {
    /// Create a manager with no filters.
    #[must_use]
    pub fn new(default_level: log::Level) -> Self {
        Self {
            default_level,
            filters: Vec::new(),
            next_id: Cell::new(ROOT.0 + 1),
            overrides: RefCell::new(HashMap::new()),
        }
    }

    fn unique_id(&self) -> Id {
        let id = Id(self.next_id.get());
        self.next_id.set(id.0 + 1);
        id
    }

    fn level_of(&self, id: Id) -> log::Level {
        self.overrides
            .borrow()
            .get(&id)
            .copied()
            .unwrap_or(self.default_level)
    }

    fn is_enabled(&self, id: Id, level: log::Level) -> bool {
        level <= self.level_of(id)
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        let level = self.filtered_level(entity_name);
        if level == self.default_level {
            return;
        }
        let previous = self.overrides.borrow_mut().insert(id, level);
        assert!(previous.is_none(), "{entity_name} reuses entity ID {id}");
    }

    fn filtered_level(&self, entity_name: &str) -> log::Level {
        self.filters
            .iter()
            .find(|(regex, _)| regex.is_match(entity_name))
            .map_or(self.default_level, |(_, level)| *level)
    }

    /// Emit at `level` for every entity whose full name matches `regex_str`.
    ///
    /// ```rust
    /// use wdm_track::tracker::EntityManager;
    /// let mut manager = EntityManager::new(log::Level::Warn);
    /// manager.add_entity_level_filter(".*slice.*", log::Level::Trace).unwrap();
    /// ```
    pub fn add_entity_level_filter(
        &mut self,
        regex_str: &str,
        level: log::Level,
    ) -> Result<(), TrackConfigError> {
        let regex = Regex::new(regex_str)
            .map_err(|e| TrackConfigError(format!("bad entity filter '{regex_str}': {e}")))?;
        self.filters.push((regex, level));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use log::Level;

    use super::*;

    const NAMES: [&str; 4] = [
        "top",
        "top::sut",
        "top::sut::bus::slice0",
        "top::sut::bus::slice1",
    ];

    fn levels(manager: &EntityManager) -> Vec<Level> {
        NAMES.iter().map(|n| manager.filtered_level(n)).collect()
    }

    #[test]
    fn default_level_without_filters() {
        let manager = EntityManager::new(Level::Error);
        assert_eq!(levels(&manager), [Level::Error; 4]);
    }

    #[test]
    fn filter_below_sut() {
        let mut manager = EntityManager::new(Level::Error);
        manager.add_entity_level_filter(r"::sut", Level::Trace).unwrap();
        assert_eq!(
            levels(&manager),
            [Level::Error, Level::Trace, Level::Trace, Level::Trace]
        );
    }

    #[test]
    fn first_filter_wins() {
        let mut manager = EntityManager::new(Level::Error);
        manager.add_entity_level_filter(r"slice0$", Level::Warn).unwrap();
        manager.add_entity_level_filter(r"::bus::", Level::Info).unwrap();
        assert_eq!(
            levels(&manager),
            [Level::Error, Level::Error, Level::Warn, Level::Info]
        );
    }

    #[test]
    fn overrides_apply_by_id() {
        let mut manager = EntityManager::new(Level::Warn);
        manager.add_entity_level_filter(r"slice1$", Level::Debug).unwrap();
        let quiet = manager.unique_id();
        let loud = manager.unique_id();
        manager.add_entity(quiet, NAMES[2]);
        manager.add_entity(loud, NAMES[3]);
        assert!(!manager.is_enabled(quiet, Level::Debug));
        assert!(manager.is_enabled(loud, Level::Debug));
        assert!(!manager.is_enabled(loud, Level::Trace));
    }

    #[test]
    fn bad_regex_is_reported() {
        let mut manager = EntityManager::new(Level::Error);
        assert!(manager.add_entity_level_filter(r"slice(", Level::Info).is_err());
    }

    #[test]
    fn ids_start_after_root() {
        let manager = EntityManager::new(Level::Error);
        let ids: Vec<Id> = (0..3).map(|_| manager.unique_id()).collect();
        assert_eq!(ids, [Id(ROOT.0 + 1), Id(ROOT.0 + 2), Id(ROOT.0 + 3)]);
    }
}
