// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use async_trait::async_trait;
use wdm_engine::types::SimResult;
use wdm_track::warn;

use super::acquire;
use crate::algorithm::Algorithm;
use crate::context::ArbiterContext;
use crate::instruction::SelectionPolicy;

/// Lock one slice per tick, nearest the laser first.
///
/// Each slice therefore searches after every upstream lock has been
/// propagated. A slice that sees nothing is left unlocked, unless the
/// algorithm is `strict` in which case it declares a lock error.
pub struct OneByOne {
    policy: SelectionPolicy,
    strict: bool,
}

impl OneByOne {
    #[must_use]
    pub fn new(policy: SelectionPolicy, strict: bool) -> Self {
        Self { policy, strict }
    }

    #[must_use]
    pub fn strict() -> Self {
        Self::new(SelectionPolicy::LeastSignificant, true)
    }
}

impl Default for OneByOne {
    fn default() -> Self {
        Self::new(SelectionPolicy::LeastSignificant, false)
    }
}

#[async_trait(?Send)]
impl Algorithm for OneByOne {
    fn name(&self) -> &str {
        if self.strict {
            "one_by_one_strict"
        } else {
            "one_by_one"
        }
    }

    async fn run(&self, ctx: ArbiterContext) -> SimResult {
        for slice in 0..ctx.num_slices() {
            let locked = acquire(&ctx, slice, self.policy, 0).await?;
            if !locked && self.strict && ctx.check_zero_lock(slice)? {
                warn!(ctx.entity() ; "slice{slice} can never lock");
                ctx.set_lock_error_state();
                ctx.tick().await;
                return Ok(());
            }
            ctx.tick().await;
        }

        ctx.set_end_state();
        ctx.tick().await;
        Ok(())
    }
}
