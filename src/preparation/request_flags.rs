//! Neutralize request classification signals.

use super::{Cleanup, Preparation};
use crate::error::Result;
use crate::host::{Environment, RequestFlags};

/// Forces "admin area" and "async request" signals off so runtime checks
/// exercise the front-end code path.
#[derive(Debug, Clone, Default)]
pub struct NeutralRequestFlagsPreparation;

impl Preparation for NeutralRequestFlagsPreparation {
    fn name(&self) -> &str {
        "neutral-request-flags"
    }

    fn prepare(&self, env: &mut Environment) -> Result<Cleanup> {
        let snapshot = std::mem::replace(&mut env.flags, RequestFlags::default());
        Ok(Cleanup::new(self.name(), move |env| {
            env.flags = snapshot;
        }))
    }
}
