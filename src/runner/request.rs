//! Runner for async check requests.
//!
//! Requests carry their parameters as a JSON object and a token proving the
//! caller may run checks. Tokens are bound to [`RUN_CHECKS_ACTION`].

use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::engine::{CheckRunner, InvocationSource, RunnerSettings};
use super::selector::Invocation;
use crate::checks::ChecksRegistry;
use crate::error::{PluginCheckError, Result};

/// Action that runs checks; also the namespace request tokens are bound to.
pub const RUN_CHECKS_ACTION: &str = "plugin_check_run_checks";

/// Action that lists the checks a run would execute.
pub const GET_CHECKS_ACTION: &str = "plugin_check_get_checks_to_run";

/// An async request as received by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AjaxRequest {
    pub action: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl AjaxRequest {
    pub fn new(action: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            action: action.into(),
            params,
        }
    }

    /// A string parameter, or `""` when absent.
    pub fn param_str(&self, name: &str) -> &str {
        self.params.get(name).and_then(Value::as_str).unwrap_or("")
    }

    /// A list parameter given either as an array or a comma-separated string.
    pub fn param_list(&self, name: &str) -> Vec<String> {
        match self.params.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            Some(Value::String(list)) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// A boolean parameter; `"1"` and `"true"` count as set.
    pub fn param_bool(&self, name: &str) -> bool {
        match self.params.get(name) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag == "1" || flag.eq_ignore_ascii_case("true"),
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            _ => false,
        }
    }
}

/// Issues and verifies request tokens.
#[derive(Debug, Clone)]
pub struct NonceVerifier {
    secret: String,
}

impl NonceVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verifier for a host, using the configured secret or one derived from
    /// the host root.
    pub fn for_host(host_root: &Path, secret: Option<&str>) -> Self {
        match secret {
            Some(secret) => Self::new(secret),
            None => Self::new(hex::encode(Sha256::digest(
                host_root.to_string_lossy().as_bytes(),
            ))),
        }
    }

    /// Token for `action`.
    pub fn token(&self, action: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b":");
        hasher.update(action.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn verify(&self, token: &str, action: &str) -> bool {
        let expected = self.token(action);
        // Compare every byte regardless of where they differ.
        expected.len() == token.len()
            && expected
                .bytes()
                .zip(token.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }

    /// Verify the `nonce` parameter of a request.
    pub fn authorize(&self, request: &AjaxRequest) -> Result<()> {
        let token = request.param_str("nonce");
        if token.is_empty() {
            return Err(PluginCheckError::Unauthorized {
                message: "missing request token".to_string(),
            });
        }
        if !self.verify(token, RUN_CHECKS_ACTION) {
            return Err(PluginCheckError::Unauthorized {
                message: "invalid request token".to_string(),
            });
        }
        Ok(())
    }
}

/// Target and selection taken from request parameters.
#[derive(Debug, Clone)]
pub struct RequestSource {
    request: AjaxRequest,
    verifier: NonceVerifier,
    plugin: String,
    checks: Vec<String>,
    categories: Vec<String>,
    include_experimental: bool,
}

impl RequestSource {
    pub fn new(request: AjaxRequest, verifier: NonceVerifier) -> Self {
        Self {
            plugin: request.param_str("plugin").to_string(),
            checks: request.param_list("checks"),
            categories: request.param_list("categories"),
            include_experimental: request.param_bool("include-experimental")
                || request.param_bool("include_experimental"),
            request,
            verifier,
        }
    }
}

impl InvocationSource for RequestSource {
    fn kind(&self) -> &'static str {
        "request"
    }

    fn authorize(&self) -> Result<()> {
        self.verifier.authorize(&self.request)
    }

    fn target(&self) -> &str {
        &self.plugin
    }

    fn check_slugs(&self) -> &[String] {
        &self.checks
    }

    fn categories(&self) -> &[String] {
        &self.categories
    }

    fn include_experimental(&self) -> bool {
        self.include_experimental
    }
}

/// Runner serving async requests.
pub type RequestRunner = CheckRunner<RequestSource>;

impl RequestRunner {
    /// A runner for `invocation` if it is a run-checks request.
    pub fn recognize(
        invocation: &Invocation,
        settings: &RunnerSettings,
        registry: &Rc<ChecksRegistry>,
        verifier: &NonceVerifier,
    ) -> Option<Self> {
        match invocation {
            Invocation::Request(request) if request.action == RUN_CHECKS_ACTION => {
                Some(CheckRunner::new(
                    RequestSource::new(request.clone(), verifier.clone()),
                    settings.clone(),
                    Rc::clone(registry),
                ))
            }
            _ => None,
        }
    }
}
