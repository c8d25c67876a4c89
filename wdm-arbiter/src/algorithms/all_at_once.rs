// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use async_trait::async_trait;
use wdm_engine::types::SimResult;

use super::acquire;
use crate::algorithm::Algorithm;
use crate::context::ArbiterContext;
use crate::instruction::SelectionPolicy;

/// Search and lock every slice within a single tick.
///
/// No propagation happens between the locks, so every slice sees the full
/// laser grid. This is only safe when the sweep windows do not contend.
#[derive(Default)]
pub struct AllAtOnce {
    policy: SelectionPolicy,
}

impl AllAtOnce {
    #[must_use]
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait(?Send)]
impl Algorithm for AllAtOnce {
    fn name(&self) -> &str {
        "all_at_once"
    }

    async fn run(&self, ctx: ArbiterContext) -> SimResult {
        for slice in 0..ctx.num_slices() {
            acquire(&ctx, slice, self.policy, 0).await?;
        }
        ctx.tick().await;

        ctx.set_end_state();
        ctx.tick().await;
        Ok(())
    }
}
