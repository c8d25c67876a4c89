// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use wdm_track::entity::{Entity, toplevel};
use wdm_track::test_helpers::create_tracker;

/// Create the top-level entity for a test with a tracker writing to
/// `traces/<test file stem>.log`.
#[must_use]
pub fn start_test(full_filepath: &str) -> Rc<Entity> {
    toplevel(&create_tracker(full_filepath), "top")
}
