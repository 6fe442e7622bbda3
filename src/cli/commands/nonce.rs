//! Nonce command implementation.
//!
//! Prints the token a request for the given action must carry, so scripts
//! can drive `plugin-check request` or the host's async endpoint.

use crate::cli::args::NonceArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::host::HostSetup;

/// The nonce command implementation.
pub struct NonceCommand {
    setup: HostSetup,
    args: NonceArgs,
}

impl NonceCommand {
    pub fn new(setup: HostSetup, args: NonceArgs) -> Self {
        Self { setup, args }
    }
}

impl Command for NonceCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.emit(&self.setup.verifier().token(&self.args.action));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RUN_CHECKS_ACTION;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    #[test]
    fn prints_verifiable_token() {
        let temp = TempDir::new().unwrap();
        let setup = HostSetup::load(temp.path(), None).unwrap();
        let verifier = setup.verifier().clone();
        let cmd = NonceCommand::new(
            setup,
            NonceArgs {
                action: RUN_CHECKS_ACTION.into(),
            },
        );

        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();
        assert!(verifier.verify(&ui.emitted_text(), RUN_CHECKS_ACTION));
    }
}
