//! commitit - commit messages for your staged changes.
//!
//! commitit sends the staged diff to an OpenAI chat model and lets you commit
//! the suggested message, edit it, ask for another one, or back out.
//!
//! # Modules
//!
//! - [`api`]: Chat completion API integration
//! - [`cli`]: Command-line interface
//! - [`config`]: Persistent settings (API key, model, prompt)
//! - [`error`]: Error types
//! - [`git`]: Git operations
//! - [`prompt_edit`]: Temporary-file editing of the system prompt
//! - [`session`]: The interactive commit flow
//! - [`ui`]: User interaction prompts
//!
//! # Quick Start
//!
//! ```bash
//! commitit set-key
//! git add .
//! commitit
//! ```

use std::process::ExitCode;

use clap::Parser;
use console::style;
use reqwest::Client;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod config;
mod error;
mod git;
mod prompt_edit;
mod session;
mod ui;

use api::OpenAiClient;
use cli::{Cli, Commands};
use config::{config_path, FileBackend, Settings};
use error::AppError;
use git::GitCli;
use prompt_edit::{edit_prompt, PromptEdit};
use session::{Session, SessionOutcome};
use ui::{Prompter, TerminalPrompter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red(), e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so they never mix with messages printed for the user.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("commitit=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("commitit=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let path = config_path();
    debug!(path = %path.display(), "settings file");
    let settings = Settings::new(FileBackend::new(path));
    let prompter = TerminalPrompter;

    let Some(command) = cli.command else {
        return run_commit_flow(&settings, &prompter, cli.model).await;
    };

    match command {
        Commands::SetKey { key } => {
            let key = match key {
                Some(key) => key,
                None => prompter.read_api_key()?,
            };
            settings.set_api_key(&key)?;
            println!("{} API key saved", style("✓").green());
        }
        Commands::UnsetKey => {
            settings.unset_api_key()?;
            println!("{} API key removed", style("✓").green());
        }
        Commands::SetModel { model } => {
            settings.set_model(&model)?;
            println!("{} {} set to {}", style("✓").green(), style("model").cyan(), style(&model).yellow());
        }
        Commands::ShowModel => {
            println!("{}", settings.model()?);
        }
        Commands::EditPrompt => match edit_prompt(&settings, &prompter)? {
            PromptEdit::Updated(_) => println!("{} Prompt updated", style("✓").green()),
            PromptEdit::Unchanged => println!("{} No change", style("—").dim()),
        },
        Commands::ShowPrompt => {
            println!("{}", settings.prompt()?);
        }
        Commands::ResetPrompt => {
            let prompt = settings.reset_prompt()?;
            println!("{} Prompt reset to default:", style("✓").green());
            println!();
            println!("{}", prompt);
        }
        Commands::ShowConfig => {
            let set_style = |v: bool| if v { style("[set]").green() } else { style("[not set]").red() };
            println!("{}", style("Configuration").bold());
            println!("  {} {}", style("file:").dim(), settings.backend().path().display());
            println!();
            println!("  {} {}", style("model:").cyan(), style(settings.model()?).yellow());
            println!("  {} {}", style("api_key:").cyan(), set_style(settings.has_api_key()?));
            println!(
                "  {} {}",
                style("prompt:").cyan(),
                if settings.has_prompt_override()? {
                    style("[custom]").yellow()
                } else {
                    style("[default]").dim()
                }
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_commit_flow(
    settings: &Settings<FileBackend>,
    prompter: &TerminalPrompter,
    model_override: Option<String>,
) -> Result<ExitCode, AppError> {
    let repo = GitCli::new();
    let generator = OpenAiClient::new(Client::new());

    let session = Session {
        repo: &repo,
        generator: &generator,
        prompter,
        settings,
        model_override,
    };

    Ok(ExitCode::from(report(&session.run().await?)))
}

/// Prints the end-of-session notice and returns the process exit status.
/// Only an empty staging area fails; cancelling is a normal exit.
fn report(outcome: &SessionOutcome) -> u8 {
    match outcome {
        SessionOutcome::NoStagedChanges => {
            println!("{} No staged changes found", style("⚠").yellow());
            println!("  {} Stage some changes first with 'git add'", style("→").dim());
            1
        }
        SessionOutcome::Committed(_) => {
            println!("{} Committed", style("✓").green());
            0
        }
        SessionOutcome::Cancelled => {
            println!("{} Cancelled", style("—").dim());
            0
        }
    }
}
