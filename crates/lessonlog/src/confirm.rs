//! Confirmation prompts for destructive actions.

use std::io::{self, BufRead, Write};

use tracing::warn;

/// Asks the user to approve a destructive action.
pub trait Confirm {
    /// Whether the user approved `prompt`.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Approves everything (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Prompts on stderr and reads the answer from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = io::stderr().lock();
        if let Err(e) = write!(stderr, "{prompt} [y/N] ").and_then(|()| stderr.flush()) {
            warn!(error = %e, "failed to write confirmation prompt");
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                warn!(error = %e, "failed to read confirmation answer");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "نعم" | "ن"
    )
}
