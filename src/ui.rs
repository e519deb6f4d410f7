//! User interaction and prompts.
//!
//! Everything that reads from the terminal goes through [`Prompter`] so the
//! commit flow and the prompt-edit round-trip can be driven by a mock in
//! tests. [`TerminalPrompter`] is the dialoguer implementation.

use std::path::Path;

use console::style;
use dialoguer::{Confirm, Input, Password, Select};

/// User's choice after reviewing a generated commit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
    /// Commit with the generated message as-is.
    Commit,
    /// Ask the model for another message for the same diff.
    Regenerate,
    /// Edit the message, then commit.
    Edit,
    /// Leave without committing.
    Cancel,
}

/// Menu entries, in display order.
pub const ACTION_LABELS: [&str; 4] = [
    "Commit now with this message",
    "Generate another message",
    "Edit message",
    "Cancel",
];

impl CommitAction {
    /// Maps a menu selection to an action. No selection (escape) and any
    /// out-of-range index fall through to [`CommitAction::Cancel`].
    pub fn from_selection(selection: Option<usize>) -> Self {
        match selection {
            Some(0) => CommitAction::Commit,
            Some(1) => CommitAction::Regenerate,
            Some(2) => CommitAction::Edit,
            _ => CommitAction::Cancel,
        }
    }
}

/// Terminal interactions used by the commands.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    /// Shows the generated message and asks what to do with it.
    fn choose_action(&self, message: &str) -> Result<CommitAction, dialoguer::Error>;

    /// Asks for a replacement message, pre-filled with `message`.
    fn edit_message(&self, message: &str) -> Result<String, dialoguer::Error>;

    /// Reads a non-empty API key with masked input.
    fn read_api_key(&self) -> Result<String, dialoguer::Error>;

    /// Waits until the user says they are done editing `path`.
    fn confirm_prompt_edited(&self, path: &Path) -> Result<bool, dialoguer::Error>;
}

/// [`Prompter`] on the real terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn choose_action(&self, message: &str) -> Result<CommitAction, dialoguer::Error> {
        println!();
        println!("{}", style("Generated message:").bold());
        println!("  {}", style(message).yellow());
        println!();

        let selection = Select::new()
            .with_prompt("What would you like to do?")
            .items(&ACTION_LABELS)
            .default(0)
            .interact_opt()?;

        Ok(CommitAction::from_selection(selection))
    }

    fn edit_message(&self, message: &str) -> Result<String, dialoguer::Error> {
        Input::<String>::new()
            .with_prompt("Edit message")
            .with_initial_text(message)
            .interact_text()
    }

    fn read_api_key(&self) -> Result<String, dialoguer::Error> {
        loop {
            let key = Password::new()
                .with_prompt("Enter your OpenAI API key")
                .allow_empty_password(true)
                .interact()?;

            let key = key.trim();
            if !key.is_empty() {
                return Ok(key.to_string());
            }
            println!("  {} API key cannot be empty", style("→").dim());
        }
    }

    fn confirm_prompt_edited(&self, path: &Path) -> Result<bool, dialoguer::Error> {
        println!(
            "{} Edit the prompt in {}",
            style("→").cyan(),
            style(path.display()).yellow()
        );
        Confirm::new()
            .with_prompt("Done editing?")
            .default(true)
            .interact()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selections_map_in_menu_order() {
        assert_eq!(CommitAction::from_selection(Some(0)), CommitAction::Commit);
        assert_eq!(CommitAction::from_selection(Some(1)), CommitAction::Regenerate);
        assert_eq!(CommitAction::from_selection(Some(2)), CommitAction::Edit);
        assert_eq!(CommitAction::from_selection(Some(3)), CommitAction::Cancel);
    }

    #[test]
    fn unmapped_selection_cancels() {
        assert_eq!(CommitAction::from_selection(None), CommitAction::Cancel);
        assert_eq!(CommitAction::from_selection(Some(7)), CommitAction::Cancel);
    }
}
