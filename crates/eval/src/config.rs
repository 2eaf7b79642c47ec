use anyhow::{Context, Result};
use extract::ExtractorConfig;
use ingest::EntityFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "pipeline.json";

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub notes_path: PathBuf,
    pub entities_path: PathBuf,
    pub preabstract_path: PathBuf,
    pub report_dir: PathBuf,

    /// Entities below this confidence are dropped at load time.
    pub min_entity_confidence: Option<f64>,
    pub parallel: bool,

    pub extraction: ExtractorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            notes_path: PathBuf::from("data/notes.jsonl"),
            entities_path: PathBuf::from("data/entities.jsonl"),
            preabstract_path: PathBuf::from("data/processed/preabstract.jsonl"),
            report_dir: PathBuf::from("reports"),
            min_entity_confidence: Some(0.55),
            parallel: true,
            extraction: ExtractorConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load config from file, or fall back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .context(format!("Failed to read config file: {:?}", path))?;
            serde_json::from_str(&content)
                .context(format!("Failed to parse config file: {:?}", path))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context(format!("Failed to write config file: {:?}", path))
    }

    pub fn entity_filter(&self) -> EntityFilter {
        EntityFilter {
            min_confidence: self.min_entity_confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.entity_filter(), EntityFilter::min_confidence(0.55));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(
            &path,
            r#"{"parallel": false, "min_entity_confidence": null,
                "extraction": {"biomarkers": {"window_chars": 60}}}"#,
        )
        .unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert!(!config.parallel);
        assert_eq!(config.min_entity_confidence, None);
        assert_eq!(config.extraction.biomarkers.window_chars, 60);
        assert_eq!(config.extraction.site, ExtractorConfig::default().site);
        assert_eq!(config.report_dir, PathBuf::from("reports"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        let mut config = PipelineConfig::default();
        config.report_dir = PathBuf::from("out/reports");

        config.save(&path).unwrap();
        assert_eq!(PipelineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(PipelineConfig::load(&path).is_err());
    }
}
