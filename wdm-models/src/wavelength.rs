// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A wavelength in nanometres.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Wavelength in nm with a total order so it can be sorted and compared.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wavelength(f64);

impl Wavelength {
    #[must_use]
    pub fn from_nm(nm: f64) -> Self {
        Self(nm)
    }

    #[must_use]
    pub fn nm(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Wavelength {
    fn from(nm: f64) -> Self {
        Self(nm)
    }
}

impl PartialEq for Wavelength {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Wavelength {}

impl PartialOrd for Wavelength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Wavelength {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Wavelength {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
