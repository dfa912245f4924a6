//! `prompt-enhancer hook` — the UserPromptSubmit hook.
//!
//! Reads one JSON request on stdin and prints exactly one payload on stdout:
//! the bypassed prompt, the enhanced document or the fallback document.
//! Exit codes: 0 on success (including bypass and empty or unreadable
//! input), 130 when interrupted, 1 on an unhandled failure. On failure the
//! raw prompt is still printed when it is known.

use super::read_stdin;
use enhancer_config::ConfigCache;
use enhancer_core::message::HookInput;
use enhancer_enrichment::Enhancer;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INTERRUPTED: u8 = 130;

pub async fn run(config_path: PathBuf) -> ExitCode {
    let reader = tokio::task::spawn_blocking(read_stdin);

    let raw = tokio::select! {
        joined = reader => joined,
        _ = tokio::signal::ctrl_c() => {
            println!("Process interrupted");
            let _ = std::io::stdout().flush();
            // The blocking stdin read cannot be cancelled; leave without
            // waiting for it.
            std::process::exit(i32::from(EXIT_INTERRUPTED));
        }
    };

    // Unreadable input counts as an empty request.
    let raw = match raw {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            warn!(error = %e, "Failed to read hook input, treating as empty");
            String::new()
        }
        Err(e) => {
            warn!(error = %e, "Stdin reader task failed, treating as empty");
            String::new()
        }
    };

    let input = HookInput::parse(&raw);
    match respond(&input, ConfigCache::new(config_path)) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Unexpected error");
            println!("{}", input.prompt);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// The stdout payload for one request.
pub fn respond(input: &HookInput, config: ConfigCache) -> enhancer_core::Result<String> {
    if input.is_empty() {
        return Ok(String::new());
    }
    let enhancer = Enhancer::new(config)?;
    Ok(enhancer.process(input).output().to_string())
}
