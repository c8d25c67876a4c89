// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Wavelength arbitration for a row of microring slices.
//!
//! An [`Algorithm`](crate::algorithm::Algorithm) never touches the slices
//! directly. It works through an [`ArbiterContext`](crate::context::ArbiterContext)
//! that lets it:
//!  - issue [instructions](crate::instruction) (search, lock, unlock),
//!  - read back what those instructions recorded in the
//!    [allocation memory](crate::memory),
//!  - end the current tick, and
//!  - raise the end or lock-error termination flags.

pub mod algorithm;
pub mod algorithms;
pub mod context;
pub mod instruction;
pub mod memory;
