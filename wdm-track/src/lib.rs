// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Logging and event tracking for the WDM arbitration workspace.
//!
//! Every tuner, slice, bus and arbiter owns an [`Entity`](crate::entity::Entity)
//! whose full name is its path in the model, e.g. `top::sut::bus::slice2`.
//! Events are emitted through the [`Tracker`] shared by the whole hierarchy:
//!
//!   - text messages at a [`log::Level`] using [`trace!`], [`debug!`],
//!     [`info!`], [`warn!`] and [`error!`],
//!   - entity creation and destruction ([`create!`], [`destroy!`]),
//!   - the start of each lock-step tick ([`set_tick!`]).
//!
//! Which entities emit at which level is chosen by regular expressions on
//! their full names, see [`builder::setup_trackers`].

#![warn(missing_docs)]

use std::cell::RefCell;
use std::rc::Rc;

pub use log;

pub mod builder;
pub mod entity;
pub mod id;

pub mod tracker;
pub use tracker::{Track, Tracker};

/// Destination of a text tracker.
pub type Writer = Box<dyn std::io::Write>;
type SharedWriter = Rc<RefCell<Writer>>;

pub use id::Id;

pub mod test_helpers;

/// ID value which indicates where there is no valid ID
pub const NO_ID: Id = id::Id(0);

/// The root ID from which all other IDs are derived
pub const ROOT: Id = id::Id(1);

/// Emit the creation event of an entity.
#[macro_export]
macro_rules! create {
    ($entity:expr) => {{
        if $entity
            .tracker
            .is_entity_enabled($entity.id, $crate::log::Level::Trace)
        {
            let parent_id = match &$entity.parent {
                Some(parent) => parent.id,
                None => $crate::NO_ID,
            };
            $entity
                .tracker
                .create(parent_id, $entity.id, $entity.full_name().as_str());
        }
    }};
}

/// Emit the destruction event of an entity.
#[macro_export]
macro_rules! destroy {
    ($entity:expr) => {{
        if $entity
            .tracker
            .is_entity_enabled($entity.id, $crate::log::Level::Trace)
        {
            match &$entity.parent {
                Some(parent) => $entity.tracker.destroy(parent.id, $entity.id),
                None => $entity.tracker.destroy($crate::NO_ID, $entity.id),
            };
        }
    }};
}

/// Record the lock-step tick that is about to be executed.
#[macro_export]
macro_rules! set_tick {
    ($entity:expr ; $tick:expr) => {{
        if $entity
            .tracker
            .is_entity_enabled($entity.id, $crate::log::Level::Trace)
        {
            $entity.tracker.tick($entity.id, $tick);
        }
    }};
}

/// Emit a message at a level given at run time.
///
/// Nothing is formatted unless the entity is enabled at that level.
#[macro_export]
macro_rules! log_base {
    ($entity:expr ; $lvl:expr, $($arg:tt)+) => (
        if $entity.tracker.is_entity_enabled($entity.id, $lvl) {
            $entity.tracker.log($entity.id, $lvl, format_args!($($arg)+));
        }
    );
}

/// Emit a `Trace` level log message.
#[macro_export]
macro_rules! trace {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Trace, $($arg)+)
    );
}

/// Emit a `Debug` level log message.
#[macro_export]
macro_rules! debug {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Debug, $($arg)+)
    );
}

/// Emit an `Info` level log message.
#[macro_export]
macro_rules! info {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Info, $($arg)+)
    );
}

/// Emit a `Warn` level log message.
#[macro_export]
macro_rules! warn {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Warn, $($arg)+)
    );
}

/// Emit an `Error` level log message.
#[macro_export]
macro_rules! error {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Error, $($arg)+)
    );
}
