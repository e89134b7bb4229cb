// src/content/mod.rs
//! Content proxy: the article sheet (fallback chain of sources) and the
//! podcast upstream, plus the parsers that turn their payloads into records.

pub mod article;
pub mod library;
pub mod podcast;
pub mod sample;
pub mod sources;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use metrics::{counter, histogram};

use crate::config::SiteConfig;
use crate::content::sources::{CsvExportSource, GvizSource, SheetsApiSource};
use crate::content::types::{SheetSource, SheetValues};

/// Header + at least one data row, otherwise the source counts as failed.
pub const MIN_SHEET_ROWS: usize = 2;

/// Shared client for all upstream calls. Only a connect timeout is set; the
/// overall request time is bounded by the platform, not by us.
pub fn build_http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("deutsch-daily/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .context("building upstream http client")
}

/// Decode HTML entities, normalize line endings, trim.
pub fn clean_cell(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    decoded.replace("\r\n", "\n").trim().to_string()
}

/// Result of one pass over the chain.
#[derive(Debug, Clone)]
pub struct SheetFetch {
    pub values: SheetValues,
    /// Name of the source that answered (`"sample"` for the built-in data).
    pub source: &'static str,
    pub fallback: bool,
}

/// Ordered sheet sources; the first one that yields a usable table wins.
/// When all fail, the built-in sample dataset is returned.
#[derive(Clone)]
pub struct SheetChain {
    sources: Vec<Arc<dyn SheetSource>>,
}

impl SheetChain {
    pub fn new(sources: Vec<Arc<dyn SheetSource>>) -> Self {
        Self { sources }
    }

    /// Sheets API (only with a key) -> public gviz JSON -> CSV export.
    pub fn from_config(cfg: &SiteConfig, http: reqwest::Client) -> Self {
        let mut sources: Vec<Arc<dyn SheetSource>> = Vec::with_capacity(3);
        if let Some(key) = &cfg.api_key {
            sources.push(Arc::new(SheetsApiSource::new(
                http.clone(),
                &cfg.sheet_id,
                &cfg.sheet_name,
                key,
            )));
        }
        sources.push(Arc::new(GvizSource::new(
            http.clone(),
            &cfg.sheet_id,
            &cfg.sheet_name,
        )));
        sources.push(Arc::new(CsvExportSource::new(
            http,
            &cfg.sheet_id,
            &cfg.sheet_name,
        )));
        Self::new(sources)
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// One sequential best-effort pass. Never fails.
    pub async fn fetch(&self) -> SheetFetch {
        for source in &self.sources {
            let t0 = std::time::Instant::now();
            let res = source.fetch_values().await;
            histogram!("content_fetch_ms", "source" => source.name())
                .record(t0.elapsed().as_secs_f64() * 1_000.0);

            match res {
                Ok(values) if values.len() >= MIN_SHEET_ROWS => {
                    counter!("content_fetch_total", "source" => source.name(), "outcome" => "ok")
                        .increment(1);
                    tracing::info!(source = source.name(), rows = values.len(), "sheet fetched");
                    return SheetFetch {
                        values,
                        source: source.name(),
                        fallback: false,
                    };
                }
                Ok(values) => {
                    counter!("content_fetch_total", "source" => source.name(), "outcome" => "empty")
                        .increment(1);
                    tracing::warn!(source = source.name(), rows = values.len(), "sheet source returned no data rows");
                }
                Err(e) => {
                    counter!("content_fetch_total", "source" => source.name(), "outcome" => "error")
                        .increment(1);
                    tracing::warn!(error = ?e, source = source.name(), "sheet source failed");
                }
            }
        }

        counter!("content_fallback_total").increment(1);
        tracing::warn!("all sheet sources failed, serving sample data");
        SheetFetch {
            values: sample::sample_sheet_values(),
            source: "sample",
            fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::sources::StaticSource;

    #[test]
    fn clean_cell_decodes_and_trims() {
        assert_eq!(clean_cell("  Wer billig kauft &amp; so\r\n "), "Wer billig kauft & so");
    }

    #[tokio::test]
    async fn first_usable_source_wins() {
        let chain = SheetChain::new(vec![
            Arc::new(StaticSource::failing("down")),
            Arc::new(StaticSource::new("only-header", vec![vec!["DATE".into()]])),
            Arc::new(StaticSource::new(
                "good",
                vec![vec!["DATE".into()], vec!["2024-01-01".into()]],
            )),
            Arc::new(StaticSource::new(
                "never",
                vec![vec!["X".into()], vec!["Y".into()]],
            )),
        ]);
        let out = chain.fetch().await;
        assert_eq!(out.source, "good");
        assert!(!out.fallback);
    }

    #[tokio::test]
    async fn everything_failing_serves_sample() {
        let chain = SheetChain::new(vec![Arc::new(StaticSource::failing("down"))]);
        let out = chain.fetch().await;
        assert!(out.fallback);
        assert_eq!(out.source, "sample");
        assert!(out.values.len() > 1);
    }

    #[test]
    fn api_source_only_with_key() {
        let http = reqwest::Client::new();
        let mut cfg = SiteConfig::default();
        assert_eq!(
            SheetChain::from_config(&cfg, http.clone()).source_names(),
            vec!["gviz", "csv-export"]
        );
        cfg.api_key = Some("k".into());
        assert_eq!(
            SheetChain::from_config(&cfg, http).source_names(),
            vec!["sheets-api", "gviz", "csv-export"]
        );
    }
}
