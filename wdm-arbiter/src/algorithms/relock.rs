// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! One-by-one locking that retries a starving slice by moving its upstream
//! neighbour.
//!
//! ```text
//!   lock_with_retry(i)
//!     ├─ acquire(i)                       found something: done
//!     └─ relock_next(i-1, attempt)        nothing seen
//!          ├─ unlock(i-1)       tick      release the upstream wavelength
//!          ├─ acquire(i-1, select=attempt)
//!          └─                   tick      propagate, then retry slice i
//! ```

use async_trait::async_trait;
use wdm_engine::types::{SimError, SimResult};
use wdm_track::{debug, info};

use super::acquire;
use crate::algorithm::Algorithm;
use crate::context::ArbiterContext;
use crate::instruction::SelectionPolicy;

pub struct OneByOneRelock {
    max_attempts: usize,
}

impl OneByOneRelock {
    #[must_use]
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for OneByOneRelock {
    fn default() -> Self {
        Self::new(3)
    }
}

#[async_trait(?Send)]
impl Algorithm for OneByOneRelock {
    fn name(&self) -> &str {
        "one_by_one_relock"
    }

    async fn run(&self, ctx: ArbiterContext) -> SimResult {
        for slice in 0..ctx.num_slices() {
            if !lock_with_retry(&ctx, slice, self.max_attempts).await? {
                info!(ctx.entity() ; "slice{slice} left unlocked after {} attempts", self.max_attempts);
            }
            ctx.tick().await;
        }

        ctx.set_end_state();
        ctx.tick().await;
        Ok(())
    }
}

async fn lock_with_retry(
    ctx: &ArbiterContext,
    slice: usize,
    max_attempts: usize,
) -> Result<bool, SimError> {
    for attempt in 1..=max_attempts {
        if acquire(ctx, slice, SelectionPolicy::LeastSignificant, 0).await? {
            return Ok(true);
        }
        if slice == 0 || attempt == max_attempts {
            break;
        }
        debug!(ctx.entity() ; "slice{slice} starving, moving slice{}", slice - 1);
        if !relock_next(ctx, slice - 1, attempt).await? {
            break;
        }
    }
    Ok(false)
}

/// Move `slice` onto its `select`-th lowest candidate.
///
/// Returns false, leaving the slice on its lowest candidate, if it has no
/// such candidate.
async fn relock_next(ctx: &ArbiterContext, slice: usize, select: usize) -> Result<bool, SimError> {
    ctx.unlock(slice)?;
    ctx.tick().await;

    ctx.search(slice)?;
    let num_candidates = ctx.num_candidates(slice)?;
    let moved = select < num_candidates;
    if num_candidates > 0 {
        let select = if moved { select } else { 0 };
        ctx.lock(slice, SelectionPolicy::LeastSignificant, select)?;
    }
    ctx.tick().await;
    Ok(moved)
}
