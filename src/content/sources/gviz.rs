// src/content/sources/gviz.rs
//! Public visualization endpoint (`gviz/tq?tqx=out:json`).
//!
//! The body is JavaScript, not JSON:
//! `/*O_o*/ google.visualization.Query.setResponse({...});`
//! We keep what lies between the first `(` and the last `)`.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::sheets_api::cell_to_string;
use super::DOCS_BASE_URL;
use crate::content::types::{SheetSource, SheetValues};

#[derive(Debug, Deserialize)]
struct GvizResponse {
    table: Option<GvizTable>,
}

#[derive(Debug, Deserialize)]
struct GvizTable {
    #[serde(default)]
    cols: Vec<GvizCol>,
    #[serde(default)]
    rows: Vec<GvizRow>,
}

#[derive(Debug, Deserialize)]
struct GvizCol {
    #[serde(default)]
    label: String,
}

#[derive(Debug, Deserialize)]
struct GvizRow {
    #[serde(default)]
    c: Vec<Option<GvizCell>>,
}

#[derive(Debug, Deserialize)]
struct GvizCell {
    #[serde(default)]
    v: Value,
}

// gviz encodes date cells as `Date(2024,0,20)` with a zero-based month.
static GVIZ_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Date\((\d{4}),(\d{1,2}),(\d{1,2})").expect("gviz date regex"));

fn gviz_cell(cell: &Option<GvizCell>) -> String {
    let Some(cell) = cell else {
        return String::new();
    };
    if let Value::String(s) = &cell.v {
        if let Some(caps) = GVIZ_DATE.captures(s) {
            let y: u32 = caps[1].parse().unwrap_or(0);
            let m: u32 = caps[2].parse().unwrap_or(0);
            let d: u32 = caps[3].parse().unwrap_or(0);
            return format!("{y:04}-{:02}-{d:02}", m + 1);
        }
    }
    cell_to_string(&cell.v)
}

/// Parse a gviz JSON response body into row-major values.
/// The header row comes from the column labels, unless every label is empty.
pub fn parse_gviz(body: &str) -> Result<SheetValues> {
    let start = body
        .find('(')
        .ok_or_else(|| anyhow!("gviz response has no wrapper"))?;
    let end = body
        .rfind(')')
        .filter(|&e| e > start)
        .ok_or_else(|| anyhow!("gviz response has no wrapper"))?;

    let parsed: GvizResponse =
        serde_json::from_str(&body[start + 1..end]).context("parsing gviz json")?;
    let table = parsed
        .table
        .ok_or_else(|| anyhow!("gviz response has no table"))?;

    let mut out = Vec::with_capacity(table.rows.len() + 1);
    if table.cols.iter().any(|c| !c.label.trim().is_empty()) {
        out.push(table.cols.iter().map(|c| c.label.trim().to_string()).collect());
    }
    for row in &table.rows {
        out.push(row.c.iter().map(gviz_cell).collect());
    }
    Ok(out)
}

pub struct GvizSource {
    http: reqwest::Client,
    base_url: String,
    sheet_id: String,
    sheet_name: String,
}

impl GvizSource {
    pub fn new(http: reqwest::Client, sheet_id: &str, sheet_name: &str) -> Self {
        Self {
            http,
            base_url: DOCS_BASE_URL.to_string(),
            sheet_id: sheet_id.to_string(),
            sheet_name: sheet_name.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SheetSource for GvizSource {
    async fn fetch_values(&self) -> Result<SheetValues> {
        let url = format!(
            "{}/{}/gviz/tq",
            self.base_url.trim_end_matches('/'),
            self.sheet_id
        );
        let resp = self
            .http
            .get(url)
            .query(&[("tqx", "out:json"), ("sheet", self.sheet_name.as_str())])
            .send()
            .await
            .context("gviz get()")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("gviz request failed: {status}"));
        }
        let body = resp.text().await.context("gviz .text()")?;
        parse_gviz(&body)
    }

    fn name(&self) -> &'static str {
        "gviz"
    }
}
