// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The interface to an arbitration algorithm and the registry used to find
//! one by name.

use std::collections::BTreeMap;
use std::rc::Rc;

use async_trait::async_trait;
use wdm_engine::types::{SimError, SimResult};

use crate::algorithms::{AllAtOnce, OneByOne, OneByOneRelock};
use crate::context::ArbiterContext;

/// An arbitration algorithm.
///
/// `run` is resumed once per tick. It ends a tick by awaiting
/// [`ArbiterContext::tick`] and terminates by raising either the end or the
/// lock-error state before its final tick. Returning an error aborts the run.
#[async_trait(?Send)]
pub trait Algorithm {
    fn name(&self) -> &str;

    async fn run(&self, ctx: ArbiterContext) -> SimResult;
}

/// Function that builds a fresh instance of an algorithm.
pub type AlgorithmConstructor = fn() -> Rc<dyn Algorithm>;

/// Maps algorithm identifiers to their constructors.
#[derive(Default)]
pub struct AlgorithmRegistry {
    constructors: BTreeMap<String, AlgorithmConstructor>,
}

impl AlgorithmRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry populated with every algorithm in this crate.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, AlgorithmConstructor); 4] = [
            ("one_by_one", || Rc::new(OneByOne::default())),
            ("one_by_one_strict", || Rc::new(OneByOne::strict())),
            ("all_at_once", || Rc::new(AllAtOnce::default())),
            ("one_by_one_relock", || Rc::new(OneByOneRelock::default())),
        ];
        for (id, constructor) in builtins {
            registry.constructors.insert(id.to_string(), constructor);
        }
        registry
    }

    /// Add a constructor. Identifiers must be unique.
    pub fn register(&mut self, id: &str, constructor: AlgorithmConstructor) -> SimResult {
        if self.constructors.contains_key(id) {
            return Err(SimError::Config(format!(
                "algorithm '{id}' is already registered"
            )));
        }
        self.constructors.insert(id.to_string(), constructor);
        Ok(())
    }

    /// Build a new instance of the algorithm registered as `id`.
    pub fn create(&self, id: &str) -> Result<Rc<dyn Algorithm>, SimError> {
        match self.constructors.get(id) {
            Some(constructor) => Ok(constructor()),
            None => Err(SimError::Config(format!(
                "unknown algorithm '{id}' (known: {})",
                self.ids().collect::<Vec<_>>().join(", ")
            ))),
        }
    }

    /// Registered identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}
