//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::adapters::live::llm::LlmProvider;
use crate::pipeline::DEFAULT_MAX_TOKENS;
use crate::stack::presets::DEFAULT_STACK;

/// Top-level CLI parser for `islgen`.
#[derive(Debug, Parser)]
#[command(
    name = "islgen",
    version,
    about = "Generate implementation files from intent specifications, incrementally"
)]
pub struct Cli {
    /// Log pipeline details (`RUST_LOG` takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Oracle selection shared by the commands that call it.
#[derive(Debug, Clone, Args)]
pub struct OracleArgs {
    /// Hosted provider backing the oracle.
    #[arg(long, default_value_t = LlmProvider::Anthropic)]
    pub provider: LlmProvider,
    /// Model identifier; defaults to `ISLGEN_MODEL` or the provider's default.
    #[arg(long)]
    pub model: Option<String>,
    /// Completion budget per request.
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate every changed manifest entry.
    Generate {
        /// Manifest file, or the project directory containing it.
        manifest: PathBuf,
        /// Output base directory (default: `<project>/bin`).
        output_dir: Option<PathBuf>,
        /// Built-in stack id.
        #[arg(long, default_value = DEFAULT_STACK, conflicts_with = "stack_file")]
        stack: String,
        /// Custom stack configuration (YAML).
        #[arg(long)]
        stack_file: Option<PathBuf>,
        /// Regenerate every entry, ignoring the lock.
        #[arg(long)]
        force: bool,
        /// Dump each assembled request.
        #[arg(long)]
        debug: bool,
        /// Where request dumps go (default: `<output>/promptDebug`).
        #[arg(long, requires = "debug")]
        debug_dir: Option<PathBuf>,
        /// Oracle options.
        #[command(flatten)]
        oracle: OracleArgs,
    },
    /// Ask the oracle to review a generated file.
    Review {
        /// File to review.
        file: PathBuf,
        /// Build context whose dependency signatures the file must respect.
        #[arg(long)]
        build_file: Option<PathBuf>,
        /// Output base directory the dependency sidecars live in (default: the file's directory).
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Built-in stack id.
        #[arg(long, default_value = DEFAULT_STACK)]
        stack: String,
        /// Oracle options.
        #[command(flatten)]
        oracle: OracleArgs,
    },
    /// List the built-in stacks.
    Stacks,
}
