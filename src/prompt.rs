//! Interactive prompting capability.
//!
//! Prompter trait: confirm / select_one (free text with autocomplete)
//! InquirePrompter: terminal implementation backed by `inquire`
//! select_valid: re-prompt until the answer is one of the candidates

use anyhow::Result;
use inquire::autocompletion::{Autocomplete, Replacement};
use inquire::{Confirm, CustomUserError, Text};

pub trait Prompter {
    /// Yes/no question.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Free-text answer with autocomplete over `candidates`. The answer is not
    /// guaranteed to be one of them; see `select_valid`.
    fn select_one(&mut self, message: &str, candidates: &[String]) -> Result<String>;
}

#[derive(Debug, Default)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new(message).with_default(default).prompt()?)
    }

    fn select_one(&mut self, message: &str, candidates: &[String]) -> Result<String> {
        let answer = Text::new(message)
            .with_autocomplete(CandidateCompleter {
                candidates: candidates.to_vec(),
            })
            .with_page_size(10)
            .prompt()?;
        Ok(answer.trim().to_string())
    }
}

#[derive(Debug, Clone)]
struct CandidateCompleter {
    candidates: Vec<String>,
}

impl Autocomplete for CandidateCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        let needle = input.trim().to_ascii_lowercase();
        Ok(self
            .candidates
            .iter()
            .filter(|c| c.to_ascii_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn get_completion(
        &mut self,
        input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        if highlighted_suggestion.is_some() {
            return Ok(highlighted_suggestion);
        }
        Ok(self
            .candidates
            .iter()
            .find(|c| c.starts_with(input.trim()))
            .cloned())
    }
}

/// Ask with `message`, then with `retry_message` until the answer is one of
/// `candidates`. Invalid answers are logged as `'<x>' is not a valid <label> name`.
pub fn select_valid(
    prompter: &mut dyn Prompter,
    label: &str,
    message: &str,
    retry_message: &str,
    candidates: &[String],
) -> Result<String> {
    let mut answer = prompter.select_one(message, candidates)?;
    while !candidates.iter().any(|c| c == &answer) {
        tracing::info!("'{answer}' is not a valid {label} name");
        answer = prompter.select_one(retry_message, candidates)?;
    }
    Ok(answer)
}

#[cfg(test)]
pub use scripted::ScriptedPrompter;
