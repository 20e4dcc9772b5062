//! Resolve an action's options

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::{debug, info};

use lanes_core::{parse_action_options, Action, Configuration, Inputs, Interactivity, ResolutionContext};

use super::{lookup_action, reject_hidden_inputs};
use crate::cli::output::{self, ConsoleReporter};
use crate::cli::prompt::TerminalPrompter;
use crate::cli::{Cli, OutputFormat};

/// Resolve an action's options and print the result
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Action name
    pub action: String,

    /// Option values, e.g. `username:alice@example.com`
    #[arg(value_name = "KEY:VALUE")]
    pub values: Vec<String>,

    /// Options file to load instead of the one found from the working directory
    #[arg(long)]
    pub options_file: Option<PathBuf>,

    /// Never prompt for missing values
    #[arg(long)]
    pub non_interactive: bool,

    /// Include options without a value in the summary
    #[arg(long)]
    pub show_unset: bool,
}

impl RunCommand {
    /// Execute the run command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            action = %self.action,
            values = self.values.len(),
            non_interactive = self.non_interactive,
            "executing run command"
        );
        let action = lookup_action(&self.action)?;
        let inputs = Inputs::parse_pairs(&self.values).map_err(anyhow::Error::msg)?;
        reject_hidden_inputs(&action.available_options()?, &inputs)?;

        let mut context = ResolutionContext::detect(Arc::new(TerminalPrompter));
        if self.non_interactive {
            context.interactivity = Interactivity::NonInteractive;
        }

        let mut config = parse_action_options(action.as_ref(), inputs, context)?;
        if let Some(path) = self.load_options_file(&mut config, action.as_ref())? {
            if cli.verbose {
                output::info(&format!("Using options file {}", path.display()));
            }
        }
        config.fetch_all()?;

        match cli.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&config.to_json(self.show_unset))?
                );
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    config.report_values(
                        &format!("Summary for {}", action.name()),
                        self.show_unset,
                        &ConsoleReporter,
                    );
                    println!();
                }
                output::success(&format!("Options for '{}' resolved", action.name()));
            }
        }

        Ok(())
    }

    fn load_options_file(
        &self,
        config: &mut Configuration,
        action: &dyn Action,
    ) -> anyhow::Result<Option<PathBuf>> {
        if let Some(path) = &self.options_file {
            config.load_options_file(path)?;
            return Ok(Some(path.clone()));
        }

        let cwd = std::env::current_dir()?;
        let found = config.load_options_file_from_dir(&cwd, &action.options_file_base())?;
        if found.is_none() {
            debug!(action = action.name(), "no options file found");
        }
        Ok(found)
    }
}
