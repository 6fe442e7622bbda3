//! List command implementations.
//!
//! `plugin-check list-checks` and `plugin-check list-categories` describe
//! what the host's registry offers.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::checks::{matches_categories, CategoryId, Check, Stability};
use crate::cli::args::{ListCategoriesArgs, ListChecksArgs};
use crate::error::Result;
use crate::ui::{PluginCheckTheme, Table, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::host::HostSetup;

/// A listed check.
#[derive(Debug, Serialize)]
struct CheckListing<'a> {
    slug: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    categories: Vec<String>,
    stability: Stability,
    description: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    url: &'a str,
}

impl<'a> CheckListing<'a> {
    fn new(check: &'a Check) -> Self {
        let info = check.info();
        Self {
            slug: info.slug(),
            kind: check.kind(),
            categories: info
                .categories()
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            stability: info.stability(),
            description: info.description(),
            url: info.documentation_url(),
        }
    }
}

/// The list-checks command implementation.
pub struct ListChecksCommand {
    setup: HostSetup,
    args: ListChecksArgs,
}

impl ListChecksCommand {
    pub fn new(setup: HostSetup, args: ListChecksArgs) -> Self {
        Self { setup, args }
    }

    fn listings(&self) -> Vec<CheckListing<'_>> {
        let requested: BTreeSet<CategoryId> =
            self.args.categories.iter().map(CategoryId::new).collect();
        self.setup
            .registry()
            .iter()
            .filter(|check| self.args.include_experimental || !check.info().is_experimental())
            .filter(|check| matches_categories(&check.info().categories(), &requested))
            .map(CheckListing::new)
            .collect()
    }
}

impl Command for ListChecksCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let listings = self.listings();

        if self.args.json {
            let json = serde_json::to_string_pretty(&listings).map_err(anyhow::Error::from)?;
            ui.emit(&json);
            return Ok(CommandResult::success());
        }

        if listings.is_empty() {
            ui.warning("No checks match the given filters");
            return Ok(CommandResult::success());
        }

        let theme = PluginCheckTheme::new();
        let mut table = Table::new(&["Check", "Type", "Categories", "Stability", "Description"]);
        for listing in &listings {
            table.add_row([
                theme.slug.apply_to(listing.slug).to_string(),
                listing.kind.to_string(),
                listing.categories.join(", "),
                listing.stability.to_string(),
                listing.description.to_string(),
            ]);
        }
        ui.message(&table.render());
        Ok(CommandResult::success())
    }
}

/// The list-categories command implementation.
pub struct ListCategoriesCommand {
    setup: HostSetup,
    args: ListCategoriesArgs,
}

impl ListCategoriesCommand {
    pub fn new(setup: HostSetup, args: ListCategoriesArgs) -> Self {
        Self { setup, args }
    }
}

impl Command for ListCategoriesCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let categories = self.setup.registry().categories();

        if self.args.json {
            let listing: Vec<_> = categories
                .iter()
                .map(|(id, label)| serde_json::json!({ "slug": id.as_str(), "name": label }))
                .collect();
            let json = serde_json::to_string_pretty(&listing).map_err(anyhow::Error::from)?;
            ui.emit(&json);
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(&["Category", "Name"]);
        for (id, label) in categories.iter() {
            table.add_row([id.as_str(), label]);
        }
        ui.message(&table.render());
        Ok(CommandResult::success())
    }
}
