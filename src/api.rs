// src/api.rs
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use shuttle_axum::axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::{SiteConfig, TutorConfig};
use crate::content::article::Article;
use crate::content::library::ArticleLibrary;
use crate::content::podcast::{EpisodeSource, HttpEpisodeSource, PodcastQuery, PodcastService};
use crate::content::types::{SheetSource, SheetValues};
use crate::content::{build_http_client, SheetChain};
use crate::error::ApiError;
use crate::feedback::tutor::{build_provider_from_config, Tutor};
use crate::feedback::{
    local_reply, ConversationContext, GrammarRules, HistoryTurn, TutorReply,
};
use crate::metrics::Metrics;
use crate::telemetry::anon_hash;

pub const SAMPLE_DATA_NOTICE: &str = "Using sample data - configure API key for real data";
pub const PODCAST_CACHE_CONTROL: &str = "max-age=3600";

/// Everything a request handler needs. Read-only after start-up.
#[derive(Clone)]
pub struct AppState {
    pub sheets: SheetChain,
    pub podcasts: PodcastService,
    pub tutor: Tutor,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(sheets: SheetChain, podcasts: PodcastService, tutor: Tutor) -> Self {
        Self {
            sheets,
            podcasts,
            tutor,
            metrics: Metrics::init(),
        }
    }

    /// Production wiring: real upstreams from config, one shared HTTP client.
    pub fn from_config(
        site: &SiteConfig,
        tutor_cfg: &TutorConfig,
        rules: GrammarRules,
    ) -> anyhow::Result<Self> {
        let http = build_http_client()?;
        let sheets = SheetChain::from_config(site, http.clone());
        let podcasts = PodcastService::new(Arc::new(HttpEpisodeSource::new(
            http,
            site.podcast_api_url.clone(),
        )));
        let tutor = Tutor::new(build_provider_from_config(tutor_cfg), Arc::new(rules));

        tracing::info!(
            sheet_sources = ?sheets.source_names(),
            tutor = tutor.provider_name(),
            "app state ready"
        );
        Ok(Self::new(sheets, podcasts, tutor))
    }

    /// Injected upstreams and the local tutor; used by tests.
    pub fn with_sources(
        sheet_sources: Vec<Arc<dyn SheetSource>>,
        episodes: Arc<dyn EpisodeSource>,
    ) -> Self {
        Self::new(
            SheetChain::new(sheet_sources),
            PodcastService::new(episodes),
            Tutor::local(Arc::new(GrammarRules::builtin().clone())),
        )
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let metrics = state.metrics.router();

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/get-articles", get(get_articles).post(get_articles))
        .route("/get-podcasts", get(get_podcasts).post(get_podcasts))
        .route("/ai-conversation", post(ai_conversation))
        .route("/articles", get(list_articles))
        .route("/articles/today", get(today_article))
        .route("/articles/themes", get(article_themes))
        .with_state(state)
        .merge(metrics)
        .layer(cors)
}

// ------------------------------------------------------------
// Sheet proxy
// ------------------------------------------------------------

#[derive(serde::Serialize)]
struct SheetBody {
    values: SheetValues,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

async fn get_articles(State(state): State<AppState>) -> Json<SheetBody> {
    let fetched = state.sheets.fetch().await;
    Json(SheetBody {
        values: fetched.values,
        error: fetched.fallback.then_some(SAMPLE_DATA_NOTICE),
    })
}

// ------------------------------------------------------------
// Parsed articles
// ------------------------------------------------------------

#[derive(serde::Deserialize, Default)]
struct ArticleFilter {
    theme: Option<String>,
    level: Option<String>,
}

#[derive(serde::Serialize)]
struct ArticleList {
    articles: Vec<Article>,
    fallback: bool,
}

async fn load_library(state: &AppState) -> (ArticleLibrary, bool) {
    let fetched = state.sheets.fetch().await;
    (ArticleLibrary::from_values(&fetched.values), fetched.fallback)
}

async fn list_articles(
    State(state): State<AppState>,
    Query(filter): Query<ArticleFilter>,
) -> Json<ArticleList> {
    let (library, fallback) = load_library(&state).await;

    let non_blank = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    let theme = non_blank(&filter.theme);
    let level = non_blank(&filter.level);

    let mut picked: Vec<&Article> = match &theme {
        Some(t) => library.by_theme(t),
        None => library.all().iter().collect(),
    };
    if let Some(l) = &level {
        let by_level = library.by_level(l);
        picked.retain(|a| by_level.iter().any(|b| std::ptr::eq(*a, *b)));
    }

    Json(ArticleList {
        articles: picked.into_iter().cloned().collect(),
        fallback,
    })
}

#[derive(serde::Deserialize, Default)]
struct TodayQuery {
    date: Option<String>,
}

async fn today_article(
    State(state): State<AppState>,
    Query(q): Query<TodayQuery>,
) -> Result<Json<Article>, ApiError> {
    let date = match q.date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest("Invalid date, expected YYYY-MM-DD".into()))?,
        None => chrono::Utc::now().date_naive(),
    };

    let (library, _) = load_library(&state).await;
    library
        .today_or_first(date)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No published articles".into()))
}

#[derive(serde::Serialize)]
struct ThemeList {
    themes: Vec<String>,
}

async fn article_themes(State(state): State<AppState>) -> Json<ThemeList> {
    let (library, _) = load_library(&state).await;
    Json(ThemeList {
        themes: library.themes().into_iter().map(String::from).collect(),
    })
}

// ------------------------------------------------------------
// Podcasts
// ------------------------------------------------------------

#[derive(serde::Deserialize, Default)]
struct PodcastParams {
    category: Option<String>,
    language: Option<String>,
    date: Option<String>,
    limit: Option<String>,
}

async fn get_podcasts(
    State(state): State<AppState>,
    Query(p): Query<PodcastParams>,
) -> Response {
    let q = PodcastQuery::from_params(
        p.category.as_deref(),
        p.language.as_deref(),
        p.date.as_deref(),
        p.limit.as_deref(),
    );
    let feed = state.podcasts.feed(&q).await;
    let cache = if feed.fallback {
        HeaderValue::from_static("no-cache")
    } else {
        HeaderValue::from_static(PODCAST_CACHE_CONTROL)
    };
    ([(header::CACHE_CONTROL, cache)], Json(feed)).into_response()
}

// ------------------------------------------------------------
// Conversation
// ------------------------------------------------------------

/// Fields are read one by one so a bad `context` or `history` does not
/// reject the whole message.
fn parse_conversation(body: &[u8]) -> Result<(String, Option<ConversationContext>, Vec<HistoryTurn>), ApiError> {
    let v: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(body)
            .map_err(|_| ApiError::BadRequest("Invalid JSON body".into()))?
    };

    let message = v
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Message is required".into()))?
        .to_string();

    let context = v
        .get("context")
        .filter(|c| !c.is_null())
        .and_then(|c| serde_json::from_value::<ConversationContext>(c.clone()).ok());
    let history = v
        .get("history")
        .and_then(|h| serde_json::from_value::<Vec<HistoryTurn>>(h.clone()).ok())
        .unwrap_or_default();

    Ok((message, context, history))
}

async fn ai_conversation(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TutorReply>, ApiError> {
    let (message, context, history) = parse_conversation(&body)?;
    let id = anon_hash(&message);

    // Run on its own task so a panic inside the tutor still gets an answer.
    let tutor = state.tutor.clone();
    let task = {
        let (message, context) = (message.clone(), context.clone());
        tokio::spawn(async move { tutor.respond(&message, context.as_ref(), &history).await })
    };

    match task.await {
        Ok((reply, mode)) => {
            tracing::info!(
                id = %id,
                mode = mode.as_str(),
                corrections = reply.corrections.len(),
                "conversation reply"
            );
            Ok(Json(reply))
        }
        Err(e) => {
            tracing::error!(error = ?e, id = %id, "conversation handler failed, using local reply");
            Ok(Json(local_reply(
                state.tutor.rules(),
                &message,
                context.as_ref(),
            )))
        }
    }
}
