// src/content/sources/csv_export.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

use super::DOCS_BASE_URL;
use crate::content::types::{SheetSource, SheetValues};

/// Minimal RFC 4180 reader: quoted fields, `""` escapes, CRLF or LF row
/// ends, newlines inside quotes. Blank lines are skipped.
pub fn parse_csv(body: &str) -> SheetValues {
    let mut rows: SheetValues = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = body.chars().peekable();

    let end_row = |row: &mut Vec<String>, rows: &mut SheetValues| {
        let taken = std::mem::take(row);
        if !(taken.len() == 1 && taken[0].is_empty()) {
            rows.push(taken);
        }
    };

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut field));
                end_row(&mut row, &mut rows);
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        end_row(&mut row, &mut rows);
    }
    rows
}

/// Public CSV export (`gviz/tq?tqx=out:csv`). Last resort before sample data.
pub struct CsvExportSource {
    http: reqwest::Client,
    base_url: String,
    sheet_id: String,
    sheet_name: String,
}

impl CsvExportSource {
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
impl SheetSource for CsvExportSource {
    async fn fetch_values(&self) -> Result<SheetValues> {
        let url = format!(
            "{}/{}/gviz/tq",
            self.base_url.trim_end_matches('/'),
            self.sheet_id
        );
        let resp = self
            .http
            .get(url)
            .query(&[("tqx", "out:csv"), ("sheet", self.sheet_name.as_str())])
            .send()
            .await
            .context("csv export get()")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("csv export failed: {status}"));
        }
        let body = resp.text().await.context("csv export .text()")?;
        // A private sheet answers 200 with a login page.
        if body.trim_start().starts_with('<') {
            return Err(anyhow!("csv export returned html"));
        }
        Ok(parse_csv(&body))
    }

    fn name(&self) -> &'static str {
        "csv-export"
    }
}
