use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process and describe our series.
    /// Later calls (tests build many routers) reuse the first handle.
    pub fn init() -> Self {
        let handle = HANDLE
            .get_or_init(|| {
                let handle = match PrometheusBuilder::new().install_recorder() {
                    Ok(h) => h,
                    Err(e) => {
                        // Someone else owns the global recorder; keep a detached one so
                        // /metrics still answers.
                        tracing::warn!(error = ?e, "prometheus recorder not installed");
                        PrometheusBuilder::new().build_recorder().handle()
                    }
                };
                describe_series();
                handle
            })
            .clone();
        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe_series() {
    describe_counter!(
        "content_fetch_total",
        "Sheet fetch attempts by source and outcome."
    );
    describe_counter!(
        "content_fallback_total",
        "Requests served from the built-in sample dataset."
    );
    describe_histogram!("content_fetch_ms", "Sheet source fetch time in milliseconds.");
    describe_counter!(
        "podcast_fetch_errors_total",
        "Podcast upstream fetch/parse errors."
    );
    describe_counter!("tutor_replies_total", "Conversation replies by mode.");
    describe_counter!(
        "feedback_corrections_total",
        "Corrections returned to learners."
    );
}
