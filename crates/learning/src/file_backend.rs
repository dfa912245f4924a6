//! File-based learner.
//!
//! Layout under the learning directory:
//!
//! ```text
//! patterns.json               { "<id>": { "pattern_regex", "confidence_threshold", "success_rate" } }
//! success_metrics.json        { "task_types": { "<task>": { "success_rate" } } }
//! analytics/interactions.log  one JSON-encoded InteractionRecord per line
//! ```
//!
//! The JSON inputs are maintained by an external process, so they are
//! re-read on every lookup. Missing or malformed files mean "no data".

use crate::model::{PatternBook, SuccessMetrics, match_patterns, success_guidance};
use enhancer_core::error::LearningError;
use enhancer_core::learning::{InteractionRecord, PatternInsight, PatternLearner};
use serde::de::DeserializeOwned;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub const PATTERNS_FILE: &str = "patterns.json";
pub const SUCCESS_METRICS_FILE: &str = "success_metrics.json";
pub const ANALYTICS_DIR: &str = "analytics";
pub const INTERACTIONS_LOG: &str = "interactions.log";

pub struct FileLearner {
    dir: PathBuf,
    /// Serializes appends from concurrent requests in one process.
    append_lock: Mutex<()>,
}

impl FileLearner {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        debug!(dir = %dir.display(), "File learner ready");
        Self {
            dir,
            append_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn interactions_path(&self) -> PathBuf {
        self.dir.join(ANALYTICS_DIR).join(INTERACTIONS_LOG)
    }

    pub fn load_patterns(&self) -> PatternBook {
        or_no_data(read_json(&self.dir.join(PATTERNS_FILE)))
    }

    pub fn load_success_metrics(&self) -> SuccessMetrics {
        or_no_data(read_json(&self.dir.join(SUCCESS_METRICS_FILE)))
    }

    /// Every record in the interactions log, skipping corrupted lines.
    pub fn load_interactions(&self) -> Vec<InteractionRecord> {
        let content = match std::fs::read_to_string(self.interactions_path()) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted interaction record");
                    None
                }
            })
            .collect()
    }
}

/// An absent or unreadable file is "no data"; a file that does not parse
/// is reported as malformed.
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, LearningError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Learning data unavailable");
            return Ok(T::default());
        }
    };
    serde_json::from_str(&content).map_err(|e| LearningError::Malformed {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn or_no_data<T: Default>(result: Result<T, LearningError>) -> T {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring learning data");
        T::default()
    })
}

impl PatternLearner for FileLearner {
    fn name(&self) -> &str {
        "file"
    }

    fn insights(&self, prompt: &str) -> Vec<PatternInsight> {
        match_patterns(&self.load_patterns(), prompt)
    }

    fn success_guidance(&self) -> Vec<String> {
        success_guidance(&self.load_success_metrics())
    }

    fn record(&self, record: &InteractionRecord) -> Result<(), LearningError> {
        let path = self.interactions_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LearningError::Storage(format!("Failed to create analytics directory: {e}"))
            })?;
        }

        let mut line = serde_json::to_string(record).map_err(|e| {
            LearningError::Storage(format!("Failed to serialize interaction: {e}"))
        })?;
        line.push('\n');

        let _guard = self.append_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LearningError::Storage(format!("Failed to open interactions log: {e}")))?;
        file.write_all(line.as_bytes())
            .map_err(|e| LearningError::Storage(format!("Failed to append interaction: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::new_interaction;
    use enhancer_core::features::ComplexityLevel;
    use enhancer_core::profile::EnrichmentProfile;

    fn learner() -> (tempfile::TempDir, FileLearner) {
        let dir = tempfile::tempdir().unwrap();
        let learner = FileLearner::new(dir.path());
        (dir, learner)
    }

    #[test]
    fn missing_files_mean_no_data() {
        let (_dir, learner) = learner();
        assert!(learner.insights("anything").is_empty());
        assert!(learner.success_guidance().is_empty());
        assert!(learner.load_interactions().is_empty());
    }

    #[test]
    fn reads_patterns_and_metrics() {
        let (dir, learner) = learner();
        std::fs::write(
            dir.path().join(PATTERNS_FILE),
            r#"{"api_design": {"pattern_regex": "\\bapi\\b", "success_rate": 0.9}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(SUCCESS_METRICS_FILE),
            r#"{"task_types": {"refactoring": {"success_rate": 0.92}}}"#,
        )
        .unwrap();

        let insights = learner.insights("Design a REST API");
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].pattern_id, "api_design");
        assert_eq!(learner.success_guidance().len(), 1);
    }

    #[test]
    fn malformed_json_is_ignored() {
        let (dir, learner) = learner();
        std::fs::write(dir.path().join(PATTERNS_FILE), "{ not json").unwrap();
        assert!(learner.insights("api").is_empty());
    }

    #[test]
    fn malformed_json_names_the_file() {
        let (dir, _learner) = learner();
        let path = dir.path().join(SUCCESS_METRICS_FILE);
        std::fs::write(&path, r#"{"task_types": 3}"#).unwrap();

        let err = read_json::<SuccessMetrics>(&path).unwrap_err();
        let LearningError::Malformed { file, .. } = &err else {
            panic!("expected malformed data, got {err:?}");
        };
        assert!(file.ends_with(SUCCESS_METRICS_FILE));
        assert!(err.to_string().contains("Malformed learning data"));
    }

    #[test]
    fn records_append_as_json_lines() {
        let (_dir, learner) = learner();
        for length in [10, 20] {
            let record = new_interaction(
                length,
                500,
                EnrichmentProfile::Ultra,
                ComplexityLevel::Extreme,
                vec!["reasoning_protocol".into()],
                1.5,
            );
            learner.record(&record).unwrap();
        }

        let records = learner.load_interactions();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].prompt_length, 10);
        assert_eq!(records[1].prompt_length, 20);
        assert_eq!(records[1].profile, EnrichmentProfile::Ultra);
    }

    #[test]
    fn corrupted_log_lines_are_skipped() {
        let (_dir, learner) = learner();
        let record =
            new_interaction(3, 4, EnrichmentProfile::Standard, ComplexityLevel::Low, vec![], 0.1);
        learner.record(&record).unwrap();

        let mut file = OpenOptions::new().append(true).open(learner.interactions_path()).unwrap();
        writeln!(file, "garbage").unwrap();

        assert_eq!(learner.load_interactions().len(), 1);
    }
}
