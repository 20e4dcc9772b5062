//! List available actions

use clap::Args;
use tracing::info;

use crate::actions;
use crate::cli::{output, Cli, OutputFormat};

/// List available actions
#[derive(Debug, Args)]
pub struct ActionsCommand {}

impl ActionsCommand {
    /// Execute the actions command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing actions command");
        let registry = actions::registry();

        match cli.format {
            OutputFormat::Json => {
                let list: Vec<_> = registry
                    .all()
                    .iter()
                    .map(|a| serde_json::json!({ "name": a.name(), "description": a.description() }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&list)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    println!("{}", output::header("Available actions"));
                }
                let width = registry.names().iter().map(String::len).max().unwrap_or(0);
                for action in registry.all() {
                    println!(
                        "  {}  {}",
                        output::key_style().apply_to(format!("{:width$}", action.name(), width = width)),
                        action.description()
                    );
                }
            }
        }

        Ok(())
    }
}
