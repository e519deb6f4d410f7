//! Command-line interface definitions for commitit.
//!
//! This module defines all CLI arguments and subcommands using the
//! [clap](https://docs.rs/clap) crate with derive macros.
//!
//! # Commands
//!
//! - Default (no subcommand): Generate a message for the staged changes and commit
//! - `set-key`, `unset-key`: Manage the stored API key
//! - `set-model`, `show-model`: Manage the model
//! - `edit-prompt`, `show-prompt`, `reset-prompt`: Manage the system prompt
//! - `show-config`: Show where settings live and what is set

use clap::{Parser, Subcommand};

/// Main CLI structure for commitit.
#[derive(Parser, Debug)]
#[command(name = "commitit")]
#[command(version)]
#[command(about = "Generate commit messages for your staged changes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override model for this run
    #[arg(short, long)]
    pub model: Option<String>,

    /// Show detailed operation logs
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store your OpenAI API key (prompts if omitted)
    SetKey {
        /// API key to store
        key: Option<String>,
    },
    /// Remove the stored API key
    UnsetKey,
    /// Set the model used for generation
    SetModel {
        /// Model identifier (e.g., gpt-4o-mini)
        model: String,
    },
    /// Show the model used for generation
    ShowModel,
    /// Edit the system prompt in a temporary file
    EditPrompt,
    /// Show the system prompt
    ShowPrompt,
    /// Restore the built-in system prompt
    ResetPrompt,
    /// Show current configuration
    ShowConfig,
}
