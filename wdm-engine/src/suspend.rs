// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The future used to mark the end of a lock-step tick.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Possible states of a [`Suspend`].
enum SuspendState {
    Pending,
    Resumed,
}

/// Future that suspends the enclosing task until the next `tick()`.
///
/// The first poll returns `Pending`, which unwinds through every enclosing
/// `async` frame back to the task. The next poll, made by the following
/// `tick()`, completes it.
pub struct Suspend {
    state: SuspendState,
}

impl Suspend {
    #[must_use = "Futures do nothing unless you `.await` or otherwise use them"]
    pub fn new() -> Self {
        Self {
            state: SuspendState::Pending,
        }
    }
}

impl Default for Suspend {
    fn default() -> Self {
        Self::new()
    }
}

impl Future for Suspend {
    type Output = ();
    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.state {
            SuspendState::Pending => {
                self.state = SuspendState::Resumed;
                Poll::Pending
            }
            SuspendState::Resumed => Poll::Ready(()),
        }
    }
}

/// Returns a [`Suspend`] which must be `await`ed to end the current tick.
#[must_use = "Futures do nothing unless you `.await` or otherwise use them"]
pub fn tick_boundary() -> Suspend {
    Suspend::new()
}
