// src/content/sources/sheets_api.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::content::types::{SheetSource, SheetValues};

pub const SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com/v4";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Authenticated Sheets v4 `values` endpoint.
pub struct SheetsApiSource {
    http: reqwest::Client,
    base_url: String,
    sheet_id: String,
    sheet_name: String,
    api_key: String,
}

impl SheetsApiSource {
    pub fn new(http: reqwest::Client, sheet_id: &str, sheet_name: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: SHEETS_API_BASE_URL.to_string(),
            sheet_id: sheet_id.to_string(),
            sheet_name: sheet_name.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).context("sheets api base url")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("sheets api base url cannot carry a path"))?
            .pop_if_empty()
            .extend(["spreadsheets", self.sheet_id.as_str(), "values", self.sheet_name.as_str()]);
        Ok(url)
    }
}

/// Stringify one cell the way the sheet displays it.
pub(crate) fn cell_to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetSource for SheetsApiSource {
    async fn fetch_values(&self) -> Result<SheetValues> {
        let resp = self
            .http
            .get(self.url()?)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .context("sheets api get()")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("API request failed: {status}"));
        }

        let body: ValueRange = resp.json().await.context("sheets api .json()")?;
        Ok(body
            .values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }

    fn name(&self) -> &'static str {
        "sheets-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_escapes_sheet_name() {
        let src = SheetsApiSource::new(reqwest::Client::new(), "abc", "Mein Blatt", "k");
        assert_eq!(
            src.url().unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/Mein%20Blatt"
        );
    }

    #[test]
    fn cells_render_like_the_sheet() {
        assert_eq!(cell_to_string(&json!(null)), "");
        assert_eq!(cell_to_string(&json!("B2")), "B2");
        assert_eq!(cell_to_string(&json!(2024.0)), "2024");
        assert_eq!(cell_to_string(&json!(1.5)), "1.5");
        assert_eq!(cell_to_string(&json!(true)), "true");
    }
}
