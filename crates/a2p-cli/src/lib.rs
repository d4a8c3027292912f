//! A2P CLI Library
//!
//! Command-line interface for batch US A2P 10DLC onboarding.
//!
//! # Overview
//!
//! Every command works on a CSV checkpoint, one business per row:
//!
//! - **Registration**: profile, trust bundle, brand, service and campaign (`a2p register`)
//! - **Resumption**: finish rows whose brand was still in review (`a2p resume`)
//! - **Status**: record the latest brand and campaign status (`a2p refresh`)
//! - **Numbers**: attach phone numbers to verified campaigns (`a2p attach-numbers`)
//! - **Corrections**: rewrite and resubmit registered data (`a2p update`)
//! - **Templates**: write an empty checkpoint (`a2p init`)

pub mod commands;
pub mod config;
pub mod error;
pub mod progress;

// Re-export commonly used types
pub use config::Settings;
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// a2p - batch A2P 10DLC onboarding
#[derive(Parser, Debug)]
#[command(name = "a2p")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Rows processed at once (overrides A2P_CONCURRENCY)
    #[arg(short = 'j', long, global = true)]
    pub concurrency: Option<usize>,

    /// Ask for mock brands (overrides IS_MOCK)
    #[arg(long, global = true)]
    pub mock: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register every row that has no customer profile yet
    Register {
        /// Checkpoint to read
        #[arg(short, long, env = "FILE_PATH")]
        input: PathBuf,

        /// Where to write the updated checkpoint
        #[arg(short, long, env = "FILE_OUTPUT")]
        output: PathBuf,
    },

    /// Finish rows whose brand was still under review
    Resume {
        /// Checkpoint to read and rewrite
        #[arg(short, long, env = "FILE_OUTPUT")]
        file: PathBuf,
    },

    /// Record the current brand and campaign status
    Refresh {
        /// Checkpoint to read and rewrite
        #[arg(short, long, env = "FILE_OUTPUT")]
        file: PathBuf,
    },

    /// Attach phone numbers to verified campaigns
    AttachNumbers {
        /// Checkpoint to read and rewrite
        #[arg(short, long, env = "FILE_OUTPUT")]
        file: PathBuf,
    },

    /// Rewrite registered profiles, trust bundles and brands
    Update {
        /// Checkpoint holding the corrected cells
        #[arg(short, long, env = "UPDATE_FILE")]
        input: PathBuf,

        /// Where to write the updated checkpoint
        #[arg(short, long, env = "UPDATE_FILE_OUTPUT")]
        output: PathBuf,
    },

    /// Write an empty checkpoint with the expected header
    Init {
        /// File to create
        #[arg(default_value = "applicants.csv")]
        path: PathBuf,

        /// Overwrite the file if it exists
        #[arg(short, long)]
        force: bool,
    },
}
