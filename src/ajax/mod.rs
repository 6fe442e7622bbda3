//! Async request actions.
//!
//! Two actions are served:
//!
//! - `plugin_check_get_checks_to_run` lists the checks a run would execute
//! - `plugin_check_run_checks` runs them through the [`Bootstrap`] lifecycle
//!
//! Both answer with an [`Envelope`]; errors never escape as `Err`.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{PluginCheckError, Result};
use crate::host::Environment;
use crate::result::CheckResult;
use crate::runner::{
    AjaxRequest, Bootstrap, CheckRunner, Invocation, RequestSource, Runner, GET_CHECKS_ACTION,
    RUN_CHECKS_ACTION,
};

/// JSON response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    pub data: Value,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: json!({ "message": message.into() }),
        }
    }
}

/// Serves the async actions of the host.
pub struct AjaxHandler {
    bootstrap: Bootstrap,
}

impl AjaxHandler {
    pub fn new(bootstrap: Bootstrap) -> Self {
        Self { bootstrap }
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    /// Dispatch a request by action name.
    pub fn handle(&mut self, request: &AjaxRequest, env: &mut Environment) -> Envelope {
        let outcome = match request.action.as_str() {
            GET_CHECKS_ACTION => self.get_checks_to_run(request, env),
            RUN_CHECKS_ACTION => self.run_checks(request, env),
            other => Err(PluginCheckError::Other(anyhow::anyhow!(
                "Invalid action '{}'",
                other
            ))),
        };

        match outcome {
            Ok(data) => Envelope::success(data),
            Err(err) => {
                warn!("Request '{}' failed: {}", request.action, err);
                Envelope::error(err.to_string())
            }
        }
    }

    /// Resolve the plugin and checks without staging anything.
    fn get_checks_to_run(&self, request: &AjaxRequest, env: &Environment) -> Result<Value> {
        let selector = self.bootstrap.selector();
        let mut runner = CheckRunner::new(
            RequestSource::new(request.clone(), selector.verifier().clone()),
            selector.settings().clone(),
            Rc::clone(selector.registry()),
        );
        runner.configure(env)?;

        let plugin = runner
            .context()
            .map(|context| context.basename().to_string())
            .unwrap_or_default();
        Ok(json!({
            "plugin": plugin,
            "checks": runner.planned_checks(),
        }))
    }

    fn run_checks(&mut self, request: &AjaxRequest, env: &mut Environment) -> Result<Value> {
        let invocation = Invocation::Request(request.clone());
        self.bootstrap.handle(&invocation, env, |runner, env| {
            let runner = runner.ok_or_else(|| {
                PluginCheckError::Other(anyhow::anyhow!("No runner accepted the request"))
            })?;
            let result = runner.run(env)?;
            Ok(result_payload(&result))
        })
    }
}

/// JSON form of a result.
pub fn result_payload(result: &CheckResult) -> Value {
    json!({
        "plugin": result.context().basename(),
        "errors": result.errors(),
        "warnings": result.warnings(),
        "error_count": result.error_count(),
        "warning_count": result.warning_count(),
        "failures": result.failures(),
    })
}
