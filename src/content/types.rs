// src/content/types.rs
use anyhow::Result;

/// Row-major spreadsheet dump; the first row is normally the header.
pub type SheetValues = Vec<Vec<String>>;

/// One strategy for reading the article sheet.
#[async_trait::async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_values(&self) -> Result<SheetValues>;
    fn name(&self) -> &'static str;
}
