// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! One complete arbitration run.
//!
//! The [`SystemUnderTest`](crate::system_under_test::SystemUnderTest) builds
//! the bus, the allocation memory and the arbitration task, then alternates
//!
//! ```text
//!   while task.tick()? {
//!       bus.propagate();
//!   }
//! ```
//!
//! before [classifying](crate::outcome) the locks that were left in the
//! memory.

pub mod outcome;
