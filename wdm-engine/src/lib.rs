// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! The lock-step engine used to drive wavelength arbitration algorithms.
//!
//! An arbitration algorithm is written as a normal `async` procedure. Each
//! time it `await`s a [`Suspend`](crate::suspend::Suspend) it gives up control
//! at the end of one logical _tick_. The owner of the
//! [`ArbitrationTask`](crate::task::ArbitrationTask) resumes it once per tick
//! and performs whatever global update is required in between (for the WDM
//! system this is the propagation of light along the bus).
//!
//! ```text
//!          tick()                 tick()                 tick()
//!   ──────────┬───────────────────────┬───────────────────────┬────▶
//!   algorithm │ insts.. suspend       │ insts.. suspend       │ end_state
//!   driver    │              propagate│              propagate│ (stop)
//! ```
//!
//! Sub-procedures are plain `async fn`s that the algorithm `await`s. A
//! suspension inside any nested sub-procedure suspends the whole task, and
//! when a sub-procedure returns its caller carries on within the same tick.
//!
//! # Simple Application
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use wdm_engine::suspend::tick_boundary;
//! use wdm_engine::task::{ArbitrationTask, TaskFlags, TaskState};
//! use wdm_track::entity::toplevel;
//! use wdm_track::tracker::dev_null_tracker;
//!
//! let top = toplevel(&dev_null_tracker(), "top");
//! let flags = Rc::new(TaskFlags::default());
//! let task_flags = flags.clone();
//! let mut task = ArbitrationTask::new(&top, flags, async move {
//!     tick_boundary().await;
//!     task_flags.set_end_state();
//!     tick_boundary().await;
//!     Ok(())
//! });
//!
//! assert!(task.tick().unwrap());
//! assert!(!task.tick().unwrap());
//! assert_eq!(task.state(), TaskState::EndedSuccess);
//! ```

pub mod suspend;
pub mod task;
pub mod test_helpers;
pub mod types;
