//! Request command implementation.
//!
//! `plugin-check request <action> --data '{...}'` serves one async request
//! the way the host would and prints the JSON envelope.

use serde_json::{Map, Value};

use crate::ajax::{AjaxHandler, Envelope};
use crate::cli::args::RequestArgs;
use crate::error::Result;
use crate::runner::AjaxRequest;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::host::HostSetup;

/// The request command implementation.
pub struct RequestCommand {
    setup: HostSetup,
    args: RequestArgs,
}

impl RequestCommand {
    pub fn new(setup: HostSetup, args: RequestArgs) -> Self {
        Self { setup, args }
    }

    fn params(&self) -> std::result::Result<Map<String, Value>, String> {
        match serde_json::from_str::<Value>(&self.args.data) {
            Ok(Value::Object(params)) => Ok(params),
            Ok(_) => Err("Request data must be a JSON object".to_string()),
            Err(e) => Err(format!("Invalid request data: {}", e)),
        }
    }

    /// Serve the request against the stored host state.
    fn serve(&self, request: &AjaxRequest) -> Result<Envelope> {
        let store = self.setup.store();
        let mut env = store.load()?;
        let before = env.clone();

        let mut handler = AjaxHandler::new(self.setup.bootstrap());
        let envelope = handler.handle(request, &mut env);

        if env != before {
            store.save(&env)?;
        }
        Ok(envelope)
    }
}

impl Command for RequestCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let envelope = match self.params() {
            Ok(params) => self.serve(&AjaxRequest::new(self.args.action.clone(), params))?,
            Err(message) => Envelope::error(message),
        };

        let json = serde_json::to_string_pretty(&envelope).map_err(anyhow::Error::from)?;
        ui.emit(&json);

        if envelope.success {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{GET_CHECKS_ACTION, RUN_CHECKS_ACTION};
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn host() -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("plugins/foo");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("foo.php"), "<?php\n/*\n * Plugin Name: Foo\n */\n").unwrap();
        temp
    }

    fn run(temp: &TempDir, action: &str, data: &str) -> (CommandResult, Value) {
        let setup = HostSetup::load(temp.path(), None).unwrap();
        let cmd = RequestCommand::new(
            setup,
            RequestArgs {
                action: action.into(),
                data: data.into(),
            },
        );
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();
        (result, serde_json::from_str(&ui.emitted_text()).unwrap())
    }

    fn token(temp: &TempDir) -> String {
        HostSetup::load(temp.path(), None)
            .unwrap()
            .verifier()
            .token(RUN_CHECKS_ACTION)
    }

    #[test]
    fn run_checks_returns_result_payload() {
        let temp = host();
        let data = serde_json::json!({"plugin": "foo", "nonce": token(&temp)}).to_string();

        let (result, envelope) = run(&temp, RUN_CHECKS_ACTION, &data);
        assert_eq!(result.exit_code, 0);
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["data"]["plugin"], "foo/foo.php");
        assert_eq!(envelope["data"]["error_count"], 1);
        assert_eq!(
            envelope["data"]["errors"][""]["0"]["0"][0]["code"],
            "no_plugin_readme"
        );
    }

    #[test]
    fn get_checks_lists_plan() {
        let temp = host();
        let data = serde_json::json!({"plugin": "foo", "nonce": token(&temp)}).to_string();

        let (_, envelope) = run(&temp, GET_CHECKS_ACTION, &data);
        assert_eq!(
            envelope["data"]["checks"],
            serde_json::json!(["file_type", "plugin_readme"])
        );
    }

    #[test]
    fn forged_token_fails() {
        let temp = host();
        let (result, envelope) = run(&temp, RUN_CHECKS_ACTION, r#"{"plugin":"foo","nonce":"x"}"#);
        assert_eq!(result.exit_code, 1);
        assert_eq!(envelope["success"], false);
    }

    #[test]
    fn malformed_data_fails_as_envelope() {
        let temp = host();
        let (result, envelope) = run(&temp, RUN_CHECKS_ACTION, "[1, 2]");
        assert_eq!(result.exit_code, 1);
        assert_eq!(
            envelope["data"]["message"],
            "Request data must be a JSON object"
        );
    }
}
