// src/config/site.rs
//! Site/content configuration.
//!
//! File lookup order:
//! 1) $SITE_CONFIG_PATH
//! 2) config/site.toml
//! 3) config/site.json
//! 4) built-in defaults
//!
//! Keys follow the front-end config object (`sheetId`, `apiKey`, `sheetName`)
//! plus `podcastApiUrl`. Environment variables override whatever the file says.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_SITE_CONFIG_PATH: &str = "SITE_CONFIG_PATH";

pub const DEFAULT_SHEET_ID: &str = "1WbU27bSvjaHWCdCl7deU9-iEBTCmlSZe8l99-ppxfS8";
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";
pub const DEFAULT_PODCAST_API_URL: &str =
    "https://podcast.arnavray.ca/.netlify/functions/generate-podcast";

/// Env overrides, first non-empty wins within each group.
const ENV_SHEET_ID: &[&str] = &["GOOGLE_SHEET_ID", "VITE_GOOGLE_SHEET_ID"];
const ENV_API_KEY: &[&str] = &["GOOGLE_API_KEY", "VITE_GOOGLE_API_KEY"];
const ENV_SHEET_NAME: &[&str] = &["SHEET_NAME"];
const ENV_PODCAST_API_URL: &[&str] = &["PODCAST_API_URL"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub sheet_id: String,
    /// Sheets API key. `None` skips the authenticated source.
    pub api_key: Option<String>,
    pub sheet_name: String,
    pub podcast_api_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            sheet_id: DEFAULT_SHEET_ID.to_string(),
            api_key: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            podcast_api_url: DEFAULT_PODCAST_API_URL.to_string(),
        }
    }
}

/// Partial file form; anything missing keeps its default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SiteFile {
    sheet_id: Option<String>,
    api_key: Option<String>,
    sheet_name: Option<String>,
    podcast_api_url: Option<String>,
}

impl SiteConfig {
    /// Load from an explicit path (TOML or JSON), then apply env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading site config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let file = parse_site_file(&content, ext.as_str())?;
        let mut cfg = Self::default().merged(file);
        cfg.apply_env();
        Ok(cfg)
    }

    /// Load using env var + fallbacks (see module docs).
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_SITE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("SITE_CONFIG_PATH points to non-existent path"));
            }
        }
        for candidate in ["config/site.toml", "config/site.json"] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from(&p);
            }
        }
        let mut cfg = Self::default();
        cfg.apply_env();
        Ok(cfg)
    }

    fn merged(mut self, file: SiteFile) -> Self {
        if let Some(v) = non_empty(file.sheet_id) {
            self.sheet_id = v;
        }
        if let Some(v) = non_empty(file.api_key) {
            self.api_key = Some(v);
        }
        if let Some(v) = non_empty(file.sheet_name) {
            self.sheet_name = v;
        }
        if let Some(v) = non_empty(file.podcast_api_url) {
            self.podcast_api_url = v;
        }
        self
    }

    fn apply_env(&mut self) {
        if let Some(v) = first_env(ENV_SHEET_ID) {
            self.sheet_id = v;
        }
        if let Some(v) = first_env(ENV_API_KEY) {
            self.api_key = Some(v);
        }
        if let Some(v) = first_env(ENV_SHEET_NAME) {
            self.sheet_name = v;
        }
        if let Some(v) = first_env(ENV_PODCAST_API_URL) {
            self.podcast_api_url = v;
        }
    }
}

fn parse_site_file(s: &str, hint_ext: &str) -> Result<SiteFile> {
    if hint_ext == "toml" {
        return toml::from_str(s).context("parsing site config toml");
    }
    if hint_ext == "json" {
        return serde_json::from_str(s).context("parsing site config json");
    }
    // Unknown extension: JSON first, then TOML.
    if let Ok(v) = serde_json::from_str(s) {
        return Ok(v);
    }
    toml::from_str(s).map_err(|_| anyhow!("unsupported site config format"))
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|n| non_empty(std::env::var(n).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_keys_in_both_formats() {
        let toml_src = r#"
sheetId = "abc"
apiKey = "  "
sheetName = "Artikel"
"#;
        let json_src = r#"{"sheetId":"xyz","apiKey":"key-1","podcastApiUrl":"http://localhost:9/p"}"#;

        let t = SiteConfig::default().merged(parse_site_file(toml_src, "toml").unwrap());
        assert_eq!(t.sheet_id, "abc");
        assert_eq!(t.api_key, None);
        assert_eq!(t.sheet_name, "Artikel");

        let j = SiteConfig::default().merged(parse_site_file(json_src, "").unwrap());
        assert_eq!(j.sheet_id, "xyz");
        assert_eq!(j.api_key.as_deref(), Some("key-1"));
        assert_eq!(j.sheet_name, DEFAULT_SHEET_NAME);
        assert_eq!(j.podcast_api_url, "http://localhost:9/p");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_site_file("not [valid", "").is_err());
    }
}
