// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Models of the optical parts of a WDM receiver.
//!
//! A laser grid feeds one waveguide bus. Along the bus sit a row of
//! microring [slices](crate::slice::Slice), each of which can tune its ring
//! onto one of the wavelengths that reaches it and extract it from the bus.
//!
//! ```text
//!   laser ──▶ slice0 ──▶ slice1 ──▶ slice2 ──▶ slice3
//!   {λ0..λ3}    │ λa       │ λb       │          │
//!              lock       lock      unlocked    lock
//! ```
//!
//! The [`Bus`](crate::bus::Bus) applies the spatial priority: a slice only
//! sees what every slice closer to the laser has left behind.

pub mod bus;
pub mod slice;
pub mod tuner;
pub mod wavelength;
