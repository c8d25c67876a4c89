// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The arbitration task: a resumable algorithm driven one tick at a time.
//!
//! The task owns the algorithm's future and polls it once per
//! [`tick()`](ArbitrationTask::tick). Between polls the future sits at a
//! [`Suspend`](crate::suspend::Suspend) point.
//!
//! The algorithm terminates the task through the shared [`TaskFlags`]:
//!  - `end_state`: the algorithm has finished successfully.
//!  - `lock_error_state`: the algorithm has given up.
//!
//! A procedure that returns an `Err` aborts the task and the error is passed
//! back to the caller of `tick()`. So does a procedure that returns `Ok(())`
//! without having raised either flag.

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use futures::task::noop_waker_ref;
use wdm_track::entity::Entity;
use wdm_track::{debug, error, info, set_tick};

use crate::types::SimError;

/// The two termination signals an algorithm can raise.
#[derive(Debug, Default)]
pub struct TaskFlags {
    end_state: Cell<bool>,
    lock_error_state: Cell<bool>,
}

impl TaskFlags {
    pub fn set_end_state(&self) {
        self.end_state.set(true);
    }

    pub fn set_lock_error_state(&self) {
        self.lock_error_state.set(true);
    }

    #[must_use]
    pub fn end_state(&self) -> bool {
        self.end_state.get()
    }

    #[must_use]
    pub fn lock_error_state(&self) -> bool {
        self.lock_error_state.get()
    }
}

/// States of an [`ArbitrationTask`].
///
/// `Running` and `Suspended` alternate with each `tick()`. The `Ended` states
/// are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Suspended,
    EndedSuccess,
    EndedError,
}

impl TaskState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::EndedSuccess | TaskState::EndedError)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskState::Running => write!(f, "Running"),
            TaskState::Suspended => write!(f, "Suspended"),
            TaskState::EndedSuccess => write!(f, "Ended-Success"),
            TaskState::EndedError => write!(f, "Ended-Error"),
        }
    }
}

/// A single algorithm being driven in lock-step.
pub struct ArbitrationTask {
    entity: Rc<Entity>,
    future: Option<LocalBoxFuture<'static, Result<(), SimError>>>,
    flags: Rc<TaskFlags>,
    state: TaskState,
    ticks: u64,
}

impl ArbitrationTask {
    /// Create a task that will run `procedure`.
    ///
    /// Nothing of the procedure is executed until the first `tick()`.
    pub fn new(
        parent: &Rc<Entity>,
        flags: Rc<TaskFlags>,
        procedure: impl Future<Output = Result<(), SimError>> + 'static,
    ) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, "task")),
            future: Some(Box::pin(procedure)),
            flags,
            state: TaskState::Suspended,
            ticks: 0,
        }
    }

    /// Resume the algorithm until its next suspension point.
    ///
    /// Returns `Ok(true)` while more ticks are expected and `Ok(false)` once
    /// the algorithm has raised either termination flag. Once `false` has been
    /// returned every further call returns `false` without resuming anything.
    pub fn tick(&mut self) -> Result<bool, SimError> {
        let Some(future) = self.future.as_mut() else {
            return Ok(false);
        };

        self.ticks += 1;
        self.state = TaskState::Running;
        set_tick!(self.entity ; self.ticks);

        let mut context = Context::from_waker(noop_waker_ref());
        match future.as_mut().poll(&mut context) {
            Poll::Ready(Ok(())) => {
                if self.flags.lock_error_state() || self.flags.end_state() {
                    self.finish();
                    Ok(false)
                } else {
                    self.abort(SimError::Task(
                        "algorithm returned without raising end_state or lock_error_state"
                            .to_string(),
                    ))
                }
            }
            Poll::Ready(Err(e)) => self.abort(e),
            Poll::Pending => {
                if self.flags.lock_error_state() || self.flags.end_state() {
                    self.finish();
                    Ok(false)
                } else {
                    self.state = TaskState::Suspended;
                    debug!(self.entity ; "suspended at tick {}", self.ticks);
                    Ok(true)
                }
            }
        }
    }

    fn abort(&mut self, e: SimError) -> Result<bool, SimError> {
        self.future = None;
        self.state = TaskState::EndedError;
        error!(self.entity ; "aborted at tick {}: {e}", self.ticks);
        Err(e)
    }

    fn finish(&mut self) {
        // Dropping the future abandons anything after the final suspension.
        self.future = None;
        self.state = if self.flags.lock_error_state() {
            TaskState::EndedError
        } else {
            TaskState::EndedSuccess
        };
        info!(self.entity ; "{} after {} ticks", self.state, self.ticks);
    }

    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Number of ticks that have resumed the algorithm.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn flags(&self) -> &Rc<TaskFlags> {
        &self.flags
    }
}
