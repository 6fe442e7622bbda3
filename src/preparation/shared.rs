//! Preparations several checks can request without staging them twice.

use std::collections::HashSet;

use serde_json::Value;

use super::Preparation;
use crate::error::Result;

/// Builds a preparation from its arguments.
pub type PreparationFactory = fn(&Value) -> Result<Box<dyn Preparation>>;

/// A preparation identified by kind and constructor arguments.
///
/// Two requests with the same kind and arguments denote the same staged
/// fragment and are instantiated once per run.
#[derive(Clone)]
pub struct SharedPreparation {
    kind: String,
    args: Value,
    factory: PreparationFactory,
}

impl SharedPreparation {
    pub fn new(kind: impl Into<String>, args: Value, factory: PreparationFactory) -> Self {
        Self {
            kind: kind.into(),
            args,
            factory,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn args(&self) -> &Value {
        &self.args
    }

    /// De-duplication key: kind plus canonical JSON of the arguments.
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind, self.args)
    }

    /// Instantiate the preparation.
    pub fn build(&self) -> Result<Box<dyn Preparation>> {
        (self.factory)(&self.args)
    }
}

impl std::fmt::Debug for SharedPreparation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedPreparation")
            .field("kind", &self.kind)
            .field("args", &self.args)
            .finish()
    }
}

/// Drop repeated requests, keeping the first occurrence of each key in
/// declaration order.
pub fn dedupe_shared<I>(requests: I) -> Vec<SharedPreparation>
where
    I: IntoIterator<Item = SharedPreparation>,
{
    let mut seen = HashSet::new();
    requests
        .into_iter()
        .filter(|request| seen.insert(request.key()))
        .collect()
}
