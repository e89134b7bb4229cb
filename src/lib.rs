// src/lib.rs
// Library surface shared by the binary and the integration tests.

pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod feedback;
pub mod metrics;
pub mod telemetry;

pub use crate::api::{router, AppState};

use shuttle_axum::axum::Router;

use crate::config::{SiteConfig, TutorConfig};
use crate::feedback::GrammarRules;

/// Load configuration from the working directory and environment and build
/// the full router.
pub fn app() -> anyhow::Result<Router> {
    let site = SiteConfig::load_default()?;
    let tutor = TutorConfig::load_default()?;
    let rules = GrammarRules::load_default();

    tracing::info!(
        sheet_id = %site.sheet_id,
        sheet_name = %site.sheet_name,
        sheets_api = site.api_key.is_some(),
        grammar_rules = rules.len(),
        "configuration loaded"
    );

    let state = AppState::from_config(&site, &tutor, rules)?;
    Ok(router(state))
}
