//! coursegen configuration

use std::path::{Path, PathBuf};

use anyhow::Context;
use curriculum_agent::OrchestratorConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub generation: OrchestratorConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Text-generation backend (any OpenAI-compatible endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL up to and including the API version, e.g. `http://localhost:11434/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl BackendConfig {
    /// API key from the configured environment variable, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding saved courses and recent activity
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

// Defaults
fn default_base_url() -> String { "http://localhost:11434/v1".to_string() }
fn default_model() -> String { "llama3.1".to_string() }
fn default_api_key_env() -> String { "COURSEGEN_API_KEY".to_string() }
fn default_store_path() -> PathBuf { PathBuf::from("coursegen-data.json") }

impl Config {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curriculum::SchemaVersion;
    use curriculum_agent::OrchestrationShape;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.backend.api_key_env, "COURSEGEN_API_KEY");
        assert_eq!(config.generation.shape, OrchestrationShape::SingleCall);
        assert_eq!(
            config.generation.schema_version,
            SchemaVersion::NestedWithResources
        );
        assert_eq!(config.generation.timeout_ms, 60_000);
        assert_eq!(config.store.path, PathBuf::from("coursegen-data.json"));
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.backend.model, "llama3.1");
        assert_eq!(config.generation.bounds.max_lessons, 20);
    }

    #[test]
    fn test_partial_sections() {
        let toml_str = r#"
[backend]
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"

[generation]
shape = "two_stage"
timeout_ms = 30000

[generation.bounds]
max_lessons = 12

[store]
path = "/tmp/courses.json"
"#;

        let config: Config = toml::from_str(toml_str).unwrap();

        assert_eq!(config.backend.model, "gpt-4o-mini");
        assert_eq!(config.backend.api_key_env, "COURSEGEN_API_KEY");
        assert_eq!(config.generation.shape, OrchestrationShape::TwoStage);
        assert_eq!(config.generation.timeout_ms, 30_000);
        assert_eq!(config.generation.max_tokens, 8192);
        assert_eq!(config.generation.bounds.max_lessons, 12);
        assert_eq!(config.generation.bounds.min_micro_lessons, 2);
        assert_eq!(config.store.path, PathBuf::from("/tmp/courses.json"));
    }

    #[test]
    fn test_load_missing_and_present() {
        let dir = tempfile::tempdir().unwrap();

        let missing = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(missing.backend.model, "llama3.1");

        let path = dir.path().join("coursegen.toml");
        std::fs::write(&path, "[generation]\nschema_version = \"flat\"\n").unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.generation.schema_version, SchemaVersion::Flat);

        std::fs::write(&path, "[generation\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_api_key_env() {
        let backend = BackendConfig {
            api_key_env: "COURSEGEN_TEST_UNSET_KEY_VARIABLE".to_string(),
            ..Default::default()
        };
        assert_eq!(backend.api_key(), None);
    }
}
