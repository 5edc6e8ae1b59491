//! Yes/no confirmation before destructive writes.

use std::io::{self, BufRead, Write};

use crate::error::ExportError;

/// Something that can answer a yes/no question.
///
/// The CLI uses [`ConfirmPolicy`]; tests and embedders can pass any
/// `Fn(&str) -> bool`.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> Result<bool, ExportError>;
}

/// How confirmation prompts are answered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfirmPolicy {
    /// Ask on the terminal.
    #[default]
    Prompt,
    /// Answer yes without asking.
    Accept,
    /// Answer no without asking.
    Refuse,
}

impl Confirm for ConfirmPolicy {
    fn confirm(&self, prompt: &str) -> Result<bool, ExportError> {
        match self {
            ConfirmPolicy::Accept => Ok(true),
            ConfirmPolicy::Refuse => Ok(false),
            ConfirmPolicy::Prompt => ask(prompt, &mut io::stdin().lock(), &mut io::stderr()),
        }
    }
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> Result<bool, ExportError> {
        Ok(self(prompt))
    }
}

fn ask(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool, ExportError> {
    write!(output, "{prompt}\nDo you want to proceed? (y/N): ").map_err(ExportError::Prompt)?;
    output.flush().map_err(ExportError::Prompt)?;

    let mut answer = String::new();
    input.read_line(&mut answer).map_err(ExportError::Prompt)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
