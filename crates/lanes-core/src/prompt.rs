//! Interactive prompting collaborator

use std::collections::VecDeque;
use std::sync::Mutex;

use thiserror::Error;

/// Prompting failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    /// The user aborted the prompt
    #[error("Operation cancelled by user")]
    Cancelled,

    /// No way to ask (no terminal, no scripted answers left, ...)
    #[error("Cannot prompt for a value: {0}")]
    Unavailable(String),
}

/// Asks a person for option values
pub trait Prompter: Send + Sync {
    /// Ask for a free-form value; sensitive values are read without echo
    fn prompt_for_value(&self, description: &str, sensitive: bool) -> Result<String, PromptError>;

    /// Ask a yes/no question
    fn confirm(&self, message: &str) -> Result<bool, PromptError>;
}

/// Prompter for contexts where nobody can answer
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompter;

impl Prompter for NoPrompter {
    fn prompt_for_value(&self, _description: &str, _sensitive: bool) -> Result<String, PromptError> {
        Err(PromptError::Unavailable("no prompter configured".to_string()))
    }

    fn confirm(&self, _message: &str) -> Result<bool, PromptError> {
        Err(PromptError::Unavailable("no prompter configured".to_string()))
    }
}

/// A recorded prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asked {
    Value { description: String, sensitive: bool },
    Confirm { message: String },
}

/// Scripted answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    YesNo(bool),
    Cancel,
}

/// Replays queued answers in order and records every question.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<Asked>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, text: impl Into<String>) -> Self {
        self.push(Answer::Text(text.into()));
        self
    }

    pub fn confirm_with(self, yes: bool) -> Self {
        self.push(Answer::YesNo(yes));
        self
    }

    pub fn cancel(self) -> Self {
        self.push(Answer::Cancel);
        self
    }

    fn push(&self, answer: Answer) {
        if let Ok(mut answers) = self.answers.lock() {
            answers.push_back(answer);
        }
    }

    fn next(&self, asked: Asked) -> Option<Answer> {
        if let Ok(mut log) = self.asked.lock() {
            log.push(asked);
        }
        self.answers.lock().ok().and_then(|mut a| a.pop_front())
    }

    /// Questions asked so far
    pub fn asked(&self) -> Vec<Asked> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt_for_value(&self, description: &str, sensitive: bool) -> Result<String, PromptError> {
        let asked = Asked::Value {
            description: description.to_string(),
            sensitive,
        };
        match self.next(asked) {
            Some(Answer::Text(text)) => Ok(text),
            Some(Answer::YesNo(yes)) => Ok(yes.to_string()),
            Some(Answer::Cancel) => Err(PromptError::Cancelled),
            None => Err(PromptError::Unavailable("no scripted answers left".to_string())),
        }
    }

    fn confirm(&self, message: &str) -> Result<bool, PromptError> {
        let asked = Asked::Confirm {
            message: message.to_string(),
        };
        match self.next(asked) {
            Some(Answer::YesNo(yes)) => Ok(yes),
            Some(Answer::Text(text)) => Ok(matches!(text.as_str(), "y" | "yes" | "true")),
            Some(Answer::Cancel) => Err(PromptError::Cancelled),
            None => Err(PromptError::Unavailable("no scripted answers left".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_prompter_is_unavailable() {
        assert!(matches!(
            NoPrompter.prompt_for_value("Username", false),
            Err(PromptError::Unavailable(_))
        ));
        assert!(NoPrompter.confirm("Continue?").is_err());
    }

    #[test]
    fn test_scripted_prompter_replays_in_order() {
        let prompter = ScriptedPrompter::new()
            .answer("alice")
            .confirm_with(true)
            .cancel();

        assert_eq!(prompter.prompt_for_value("Username", false).unwrap(), "alice");
        assert!(prompter.confirm("Development?").unwrap());
        assert_eq!(
            prompter.prompt_for_value("Password", true),
            Err(PromptError::Cancelled)
        );
        assert!(matches!(
            prompter.confirm("Again?"),
            Err(PromptError::Unavailable(_))
        ));

        let asked = prompter.asked();
        assert_eq!(asked.len(), 4);
        assert_eq!(
            asked[2],
            Asked::Value {
                description: "Password".to_string(),
                sensitive: true
            }
        );
    }
}
