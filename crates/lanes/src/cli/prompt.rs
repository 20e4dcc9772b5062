//! Terminal prompting

use std::io;

use dialoguer::{Confirm, Input, Password};
use lanes_core::{PromptError, Prompter};

/// Asks on the attached terminal; sensitive values are read without echo
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn prompt_for_value(&self, description: &str, sensitive: bool) -> Result<String, PromptError> {
        let answer = if sensitive {
            Password::new()
                .with_prompt(description)
                .allow_empty_password(true)
                .interact()
        } else {
            Input::<String>::new()
                .with_prompt(description)
                .allow_empty(true)
                .interact_text()
        };
        answer.map_err(prompt_error)
    }

    fn confirm(&self, message: &str) -> Result<bool, PromptError> {
        Confirm::new()
            .with_prompt(message)
            .interact()
            .map_err(prompt_error)
    }
}

fn prompt_error(err: dialoguer::Error) -> PromptError {
    match err {
        dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => PromptError::Cancelled,
        other => PromptError::Unavailable(other.to_string()),
    }
}
