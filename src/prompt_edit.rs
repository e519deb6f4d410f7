//! External-editor round-trip for the system prompt.
//!
//! The current prompt is written to a temporary file, the user edits it with
//! whatever editor they like, confirms, and the file is read back. The file is
//! removed when the [`NamedTempFile`] guard drops, whichever way the command
//! ends.

use std::fs;
use std::io::Write;

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::config::{Settings, SettingsBackend};
use crate::error::AppError;
use crate::ui::Prompter;

/// Result of an `edit-prompt` round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEdit {
    /// The trimmed file contents were stored as the new prompt.
    Updated(String),
    /// The file was empty or the user declined; nothing was stored.
    Unchanged,
}

fn write_temp_prompt(prompt: &str) -> Result<NamedTempFile, AppError> {
    let mut file = Builder::new()
        .prefix("commitit-prompt-")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(prompt.as_bytes())?;
    file.flush()?;
    Ok(file)
}

pub fn edit_prompt<B, P>(settings: &Settings<B>, prompter: &P) -> Result<PromptEdit, AppError>
where
    B: SettingsBackend,
    P: Prompter,
{
    let file = write_temp_prompt(&settings.prompt()?)?;
    debug!(path = %file.path().display(), "prompt written for editing");

    if !prompter.confirm_prompt_edited(file.path())? {
        return Ok(PromptEdit::Unchanged);
    }

    // Read by path: editors often replace the file rather than write in place.
    let edited = fs::read_to_string(file.path())?;
    let edited = edited.trim();
    if edited.is_empty() {
        return Ok(PromptEdit::Unchanged);
    }

    settings.set_prompt(edited)?;
    Ok(PromptEdit::Updated(edited.to_string()))
}
