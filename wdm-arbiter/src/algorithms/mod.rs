// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Built-in arbitration algorithms and the sub-procedures they share.

mod all_at_once;
mod one_by_one;
mod relock;

pub use all_at_once::AllAtOnce;
pub use one_by_one::OneByOne;
pub use relock::OneByOneRelock;
use wdm_engine::types::SimError;
use wdm_track::debug;

use crate::context::ArbiterContext;
use crate::instruction::SelectionPolicy;

/// Search `slice` and lock it if the search saw anything.
///
/// Returns whether the slice is now locked. Does not end the tick.
pub async fn acquire(
    ctx: &ArbiterContext,
    slice: usize,
    policy: SelectionPolicy,
    select: usize,
) -> Result<bool, SimError> {
    ctx.search(slice)?;
    let num_candidates = ctx.num_candidates(slice)?;
    if num_candidates == 0 {
        debug!(ctx.entity() ; "slice{slice} sees no candidates");
        return Ok(false);
    }
    ctx.lock(slice, policy, select)?;
    Ok(true)
}
