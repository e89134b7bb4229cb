// src/config/tutor.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

pub const DEFAULT_TUTOR_CONFIG_PATH: &str = "config/tutor.json";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";

fn default_enabled() -> bool {
    true
}
fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-pro".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Only "gemini" is supported (case-insensitive).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// "ENV" means: read from GEMINI_API_KEY. Empty after resolution = local feedback only.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: default_provider(),
            api_key: default_api_key(),
            model: default_model(),
        }
    }
}

impl TutorConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let cfg: TutorConfig = serde_json::from_str(&data)?;
        cfg.resolve()
    }

    /// `config/tutor.json` if present, otherwise defaults (key from env).
    pub fn load_default() -> anyhow::Result<Self> {
        if Path::new(DEFAULT_TUTOR_CONFIG_PATH).exists() {
            return Self::load_from_file(DEFAULT_TUTOR_CONFIG_PATH);
        }
        Self::default().resolve()
    }

    fn resolve(mut self) -> anyhow::Result<Self> {
        // Normalize provider
        self.provider = self.provider.trim().to_lowercase();
        if self.provider != "gemini" {
            anyhow::bail!("Unsupported tutor provider in config: {}", self.provider);
        }

        // Resolve api key if "ENV"; a missing variable simply disables the remote tutor
        if self.api_key.trim().eq_ignore_ascii_case("env") {
            self.api_key = env::var(ENV_GEMINI_API_KEY).unwrap_or_default();
        }
        self.api_key = self.api_key.trim().to_string();

        if let Ok(model) = env::var(ENV_GEMINI_MODEL) {
            if !model.trim().is_empty() {
                self.model = model.trim().to_string();
            }
        }

        Ok(self)
    }

    /// Remote tutor is used only when enabled AND a key is available.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn env_key_is_resolved_and_activates() {
        env::set_var(ENV_GEMINI_API_KEY, "k-123");
        env::remove_var(ENV_GEMINI_MODEL);
        let cfg = TutorConfig::default().resolve().unwrap();
        assert_eq!(cfg.api_key, "k-123");
        assert_eq!(cfg.model, "gemini-pro");
        assert!(cfg.is_active());
        env::remove_var(ENV_GEMINI_API_KEY);
    }

    #[serial_test::serial]
    #[test]
    fn missing_key_means_local_only() {
        env::remove_var(ENV_GEMINI_API_KEY);
        let cfg = TutorConfig::default().resolve().unwrap();
        assert!(!cfg.is_active());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("tutor.json");
        fs::write(&p, r#"{"provider":"OpenAI","api_key":"x"}"#).unwrap();
        assert!(TutorConfig::load_from_file(&p).is_err());
    }

    #[test]
    fn disabled_with_literal_key_stays_inactive() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("tutor.json");
        fs::write(&p, r#"{"enabled":false,"provider":"Gemini","api_key":" literal "}"#).unwrap();
        let cfg = TutorConfig::load_from_file(&p).unwrap();
        assert_eq!(cfg.provider, "gemini");
        assert_eq!(cfg.api_key, "literal");
        assert!(!cfg.is_active());
    }
}
