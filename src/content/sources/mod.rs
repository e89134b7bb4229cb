// src/content/sources/mod.rs
pub mod csv_export;
pub mod fixture;
pub mod gviz;
pub mod sheets_api;

pub use csv_export::CsvExportSource;
pub use fixture::StaticSource;
pub use gviz::GvizSource;
pub use sheets_api::SheetsApiSource;

/// Spreadsheet document base used by the public (key-less) endpoints.
pub const DOCS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";
