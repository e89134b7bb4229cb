// src/content/sources/fixture.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::content::types::{SheetSource, SheetValues};

/// In-memory source: fixed rows, or a fixed failure.
pub struct StaticSource {
    name: &'static str,
    values: Option<SheetValues>,
}

impl StaticSource {
    pub fn new(name: &'static str, values: SheetValues) -> Self {
        Self {
            name,
            values: Some(values),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self { name, values: None }
    }
}

#[async_trait]
impl SheetSource for StaticSource {
    async fn fetch_values(&self) -> Result<SheetValues> {
        self.values
            .clone()
            .ok_or_else(|| anyhow!("{} source unavailable", self.name))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
