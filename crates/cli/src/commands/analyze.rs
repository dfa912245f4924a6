//! `prompt-enhancer analyze` — show the analyzer's view of a prompt.

use super::read_stdin;
use enhancer_config::ConfigCache;
use enhancer_core::message::HookInput;
use enhancer_enrichment::Enhancer;
use std::path::PathBuf;

pub async fn run(
    config_path: PathBuf,
    prompt: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = match prompt {
        Some(prompt) => HookInput::new(prompt),
        None => HookInput::parse(&tokio::task::spawn_blocking(read_stdin).await??),
    };

    let enhancer = Enhancer::new(ConfigCache::new(config_path))?;
    let report = enhancer.analyze(&input);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
