//! `prompt-enhancer config` — Configuration management commands.

use enhancer_config::EnhancerConfig;
use std::path::Path;

pub async fn validate(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating {}...", path.display());

    if !path.exists() {
        println!("   ⚠️  No config file, built-in defaults apply");
        return Ok(());
    }

    match EnhancerConfig::load_from(path) {
        Ok(config) => {
            println!("   ✅ Config parsed and validated");
            println!();
            println!(
                "   Enrichment:  {}",
                if config.enrichment.enabled { "enabled" } else { "disabled" }
            );
            println!(
                "   Ultra mode:  {} (trigger: {})",
                if config.enrichment.ultra_mode.enabled { "enabled" } else { "disabled" },
                config.enrichment.ultra_mode.trigger_complexity
            );
            println!(
                "   ToT:         {}-{} approaches, confidence ≥ {}",
                config.tot_reflection.min_approaches,
                config.tot_reflection.max_approaches,
                config.tot_reflection.confidence_threshold
            );
            println!("   Bypass:      {:?}", config.bypass.prefixes);
            println!("   Templates:   {}", config.templates_dir().display());
            println!(
                "   Learning:    {}",
                if config.learning.enabled { "enabled" } else { "disabled" }
            );
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = EnhancerConfig::load_from(path).map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", config.to_json_pretty());
    Ok(())
}

pub async fn path(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn validate_reports_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"tot_reflection": {"min_approaches": 5, "max_approaches": 2}}"#)
            .unwrap();
        assert!(validate(&path).await.is_err());
    }

    #[tokio::test]
    async fn validate_accepts_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate(&dir.path().join("absent.json")).await.is_ok());
    }

    #[test]
    fn default_path_names_the_config_file() {
        let path = EnhancerConfig::default_path();
        assert!(path.to_str().unwrap().ends_with(".json"));
    }
}
