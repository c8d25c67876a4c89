// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::fmt;

use crate::Id;
use crate::tracker::Track;

/// A tracker that does nothing.
///
/// Useful for batch runs that only want the run result.
pub struct DevNullTracker;

impl Track for DevNullTracker {
    fn unique_id(&self) -> Id {
        Id(0)
    }
    fn is_entity_enabled(&self, _id: Id, _level: log::Level) -> bool {
        false
    }
    fn add_entity(&self, _id: Id, _entity_name: &str) {}
    fn create(&self, _created_by: Id, _obj: Id, _name: &str) {}
    fn destroy(&self, _destroyed_by: Id, _obj: Id) {}
    fn log(&self, _id: Id, _level: log::Level, _msg: fmt::Arguments) {}
    fn tick(&self, _set_by: Id, _tick: u64) {}
    fn shutdown(&self) {}
}
