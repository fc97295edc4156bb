//! Drift detection between stored and regenerated help text.

use thiserror::Error;

use super::{render_help, render_options};
use crate::schema::{Argument, Command, Registry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HelpDrift {
    #[error("help for '{command}' differs at line {line}: stored {expected:?}, rendered {actual:?}")]
    Mismatch {
        command: String,
        /// 1-based.
        line: usize,
        expected: String,
        actual: String,
    },

    #[error("help for '{command}' wraps a description onto a line starting with '--': {text:?}")]
    FlagContinuation { command: String, text: String },
}

impl HelpDrift {
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Mismatch { command, .. } | Self::FlagContinuation { command, .. } => command,
        }
    }
}

/// Compare a command's stored help with a fresh rendering.
///
/// # Errors
///
/// Returns the first differing line, or a wrapped description line that would
/// read as a flag.
pub fn check_help(command: &Command) -> Result<(), HelpDrift> {
    let arguments: Vec<&Argument> = command.arguments().collect();
    if let Some(line) = render_options(&arguments)
        .into_iter()
        .find(|line| line.continuation && line.text.trim_start().starts_with("--"))
    {
        return Err(HelpDrift::FlagContinuation {
            command: command.key().to_string(),
            text: line.text,
        });
    }

    let rendered = render_help(command);
    let stored = command.help();
    if rendered == stored {
        return Ok(());
    }

    let mut expected = stored.split('\n');
    let mut actual = rendered.split('\n');
    let mut line = 1;
    loop {
        match (expected.next(), actual.next()) {
            (Some(want), Some(got)) if want == got => line += 1,
            (want, got) => {
                return Err(HelpDrift::Mismatch {
                    command: command.key().to_string(),
                    line,
                    expected: want.unwrap_or_default().to_string(),
                    actual: got.unwrap_or_default().to_string(),
                })
            }
        }
    }
}

/// Check every command, collecting all drift.
#[must_use]
pub fn verify_registry(registry: &Registry) -> Vec<HelpDrift> {
    let drift: Vec<HelpDrift> = registry
        .commands()
        .filter_map(|command| check_help(command).err())
        .collect();
    tracing::debug!(
        commands = registry.len(),
        drifted = drift.len(),
        "help verified"
    );
    drift
}
