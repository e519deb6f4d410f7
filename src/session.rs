//! The interactive generate-and-commit flow.
//!
//! Runs as an explicit state machine: fetch the staged diff once, then
//! generate and present until the user commits, edits or cancels. Regenerating
//! loops back to [`State::Generating`] with the same diff.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::api::MessageGenerator;
use crate::config::{Settings, SettingsBackend};
use crate::error::AppError;
use crate::git::Repository;
use crate::ui::{CommitAction, Prompter};

/// How a session ended when it didn't fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Nothing was staged; the generator was never called.
    NoStagedChanges,
    /// A commit was created with this message.
    Committed(String),
    /// The user backed out without committing.
    Cancelled,
}

#[derive(Debug)]
enum State {
    Generating,
    Presenting(String),
    Committing(String),
    Editing(String),
    Done(SessionOutcome),
}

/// Collaborators for one run of the commit flow.
pub struct Session<'a, R, G, P, B> {
    pub repo: &'a R,
    pub generator: &'a G,
    pub prompter: &'a P,
    pub settings: &'a Settings<B>,
    /// Per-run model override; takes precedence over the stored model.
    pub model_override: Option<String>,
}

impl<R, G, P, B> Session<'_, R, G, P, B>
where
    R: Repository,
    G: MessageGenerator,
    P: Prompter,
    B: SettingsBackend,
{
    pub async fn run(&self) -> Result<SessionOutcome, AppError> {
        let diff = match self.repo.staged_diff().await? {
            Some(diff) => diff,
            None => return Ok(SessionOutcome::NoStagedChanges),
        };

        let api_key = self.settings.api_key()?;
        let model = match self.model_override.as_deref() {
            Some(model) if !model.is_empty() => model.to_string(),
            _ => self.settings.model()?,
        };
        let prompt = self.settings.prompt()?;
        debug!(%model, diff_bytes = diff.len(), "starting session");

        let mut state = State::Generating;
        loop {
            debug!(?state, "session state");
            state = match state {
                State::Generating => {
                    let spinner = generating_spinner();
                    let result = self
                        .generator
                        .generate(&diff, &model, &prompt, &api_key)
                        .await;
                    spinner.finish_and_clear();
                    State::Presenting(result?)
                }
                State::Presenting(message) => match self.prompter.choose_action(&message)? {
                    CommitAction::Commit => State::Committing(message),
                    CommitAction::Edit => State::Editing(message),
                    CommitAction::Regenerate => State::Generating,
                    CommitAction::Cancel => State::Done(SessionOutcome::Cancelled),
                },
                State::Editing(message) => {
                    let edited = self.prompter.edit_message(&message)?;
                    State::Committing(edited)
                }
                State::Committing(message) => {
                    self.repo.commit(&message).await?;
                    State::Done(SessionOutcome::Committed(message))
                }
                State::Done(outcome) => return Ok(outcome),
            };
        }
    }
}

fn generating_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} Generating commit message...")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
