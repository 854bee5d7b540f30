//! Command dispatch and handlers.

pub mod generate;
pub mod review;
pub mod stacks;

use std::env;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::adapters::live::llm::LlmProvider;
use crate::cassette::config::CassetteConfig;
use crate::cassette::session::RecordingSession;
use crate::cli::{Cli, Command, OracleArgs};
use crate::context::ServiceContext;
use crate::pipeline::GenerateOptions;
use crate::stack::StackConfig;

/// Records every port interaction into cassettes under this directory.
pub const RECORD_ENV: &str = "ISLGEN_RECORD";
/// Replays the ports that have a cassette in this directory; the rest stay live.
pub const REPLAY_ENV: &str = "ISLGEN_REPLAY";
/// Default model override.
pub const MODEL_ENV: &str = "ISLGEN_MODEL";

/// Dispatch a parsed command to its handler.
///
/// When `ISLGEN_RECORD` is set to a directory path, all port interactions are
/// recorded to per-port cassette files in that directory. When
/// `ISLGEN_REPLAY` is set, cassettes found there are served instead of the
/// live ports.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let provider = match &cli.command {
        Command::Generate { oracle, .. } | Command::Review { oracle, .. } => oracle.provider,
        Command::Stacks => LlmProvider::default(),
    };

    let (ctx, session) = if let Ok(dir) = env::var(RECORD_ENV) {
        let (ctx, session) = ServiceContext::recording_at(Path::new(&dir), provider)?;
        (ctx, Some(session))
    } else if let Ok(dir) = env::var(REPLAY_ENV) {
        let config = CassetteConfig::from_session_dir(Path::new(&dir));
        (ServiceContext::live(provider).with_replay(&config)?, None)
    } else {
        (ServiceContext::live(provider), None)
    };

    let result = dispatch_with_context(&cli.command, &ctx);

    // Finish recording after command completes (even on error)
    if let Some(session) = session {
        // Drop context first to release Arc references
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

/// Dispatch a command with the given service context.
fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<(), String> {
    match command {
        Command::Generate {
            manifest,
            output_dir,
            stack,
            stack_file,
            force,
            debug,
            debug_dir,
            oracle,
        } => {
            let stack = resolve_stack(ctx, stack, stack_file.as_deref())?;
            let options = GenerateOptions {
                force: *force,
                debug: *debug,
                debug_dir: debug_dir.clone(),
                model: resolve_model(oracle),
                max_tokens: oracle.max_tokens,
                ..GenerateOptions::default()
            };
            generate::run(ctx, manifest, output_dir.as_deref(), &stack, &options)
        }
        Command::Review { file, build_file, output_dir, stack, oracle } => {
            let stack = StackConfig::select(stack);
            let request = review::ReviewRequest {
                file,
                build_file: build_file.as_deref(),
                output_dir: output_dir.as_deref(),
                model: resolve_model(oracle),
                max_tokens: oracle.max_tokens,
            };
            review::run(ctx, &stack, &request)
        }
        Command::Stacks => stacks::run(),
    }
}

fn resolve_stack(
    ctx: &ServiceContext,
    id: &str,
    file: Option<&Path>,
) -> Result<StackConfig, String> {
    match file {
        Some(path) => StackConfig::load(ctx.fs.as_ref(), path).map_err(|e| e.to_string()),
        None => Ok(StackConfig::select(id)),
    }
}

fn resolve_model(oracle: &OracleArgs) -> String {
    oracle
        .model
        .clone()
        .or_else(|| env::var(MODEL_ENV).ok().filter(|m| !m.trim().is_empty()))
        .unwrap_or_else(|| oracle.provider.default_model().to_string())
}

/// Drive an async handler to completion on a single-threaded runtime.
///
/// Entries are processed one at a time, so one thread is all the pipeline needs.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start async runtime: {e}"))?;
    Ok(runtime.block_on(future))
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir: PathBuf = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}
