//! Remote tutor: provider abstraction over a generative-language API with the
//! local heuristic as the always-available fallback.
//!
//! Flow per message:
//! 1) no provider configured -> local reply
//! 2) provider error (network, non-2xx, empty candidates) -> local reply
//! 3) provider text that is not the expected JSON -> raw text + local analysis
//! 4) JSON reply -> sanitized (lists capped at 3, metrics clamped to [0,100])

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::scoring::to_score;
use super::suggestions::DEFAULT_LEVEL;
use super::{
    analyze_message, local_reply, ConversationContext, Correction, GrammarRules, HistoryTurn,
    Metrics, Suggestion, SuggestionKind, TutorReply, MAX_CORRECTIONS, MAX_SUGGESTIONS,
};
use crate::config::tutor::TutorConfig;
use crate::telemetry::anon_hash;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const UNPARSED_FALLBACK_TEXT: &str = "Sehr gut! Lass uns weiter üben.";

/// How many previous turns are replayed into the prompt.
const HISTORY_TURNS: usize = 5;

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider: one prompt in, raw model text out.
pub trait Provider: Send + Sync + 'static {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

pub type DynProvider = Arc<dyn Provider>;

/// Google Gemini `generateContent`.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("deutsch-daily/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .context("building gemini http client")?;
        Ok(Self {
            http,
            api_key,
            model,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Provider for GeminiProvider {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            #[derive(Serialize)]
            struct Part<'a> {
                text: &'a str,
            }
            #[derive(Serialize)]
            struct Content<'a> {
                parts: Vec<Part<'a>>,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                contents: Vec<Content<'a>>,
            }
            #[derive(Deserialize)]
            struct Resp {
                #[serde(default)]
                candidates: Vec<Candidate>,
            }
            #[derive(Deserialize)]
            struct Candidate {
                content: Option<CandidateContent>,
            }
            #[derive(Deserialize)]
            struct CandidateContent {
                #[serde(default)]
                parts: Vec<CandidatePart>,
            }
            #[derive(Deserialize)]
            struct CandidatePart {
                #[serde(default)]
                text: String,
            }

            let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
            let req = Req {
                contents: vec![Content {
                    parts: vec![Part { text: prompt }],
                }],
            };

            let resp = self
                .http
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&req)
                .send()
                .await
                .context("gemini request")?;

            let status = resp.status();
            if !status.is_success() {
                return Err(anyhow!("gemini returned HTTP {status}"));
            }

            let body: Resp = resp.json().await.context("decoding gemini response")?;
            let text: String = body
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .map(|c| c.parts.into_iter().map(|p| p.text).collect())
                .unwrap_or_default();

            if text.trim().is_empty() {
                return Err(anyhow!("gemini returned no text"));
            }
            Ok(text)
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Fixed-output provider for tests/local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: String,
}

impl Provider for MockProvider {
    fn generate<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Ok(out) })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Factory: build a provider according to config and environment.
///
/// * `AI_TEST_MODE=mock` -> deterministic mock (valid JSON reply).
/// * disabled or no key -> `None` (local heuristic only).
/// * otherwise Gemini.
pub fn build_provider_from_config(cfg: &TutorConfig) -> Option<DynProvider> {
    if std::env::var("AI_TEST_MODE").is_ok_and(|v| v == "mock") {
        let fixed = serde_json::json!({
            "text": "Sehr gut! (mock)",
            "corrections": [],
            "metrics": {"accuracy": 90, "fluency": 80, "grammar_accuracy": 90, "vocabulary_usage": 70},
            "suggestions": [{"type": "Vocabulary", "action": "Lerne fünf neue Wörter."}]
        })
        .to_string();
        return Some(Arc::new(MockProvider { fixed }));
    }

    if !cfg.is_active() {
        return None;
    }

    match GeminiProvider::new(cfg.api_key.clone(), cfg.model.clone()) {
        Ok(p) => Some(Arc::new(p)),
        Err(e) => {
            tracing::warn!(error = ?e, "gemini provider unavailable, using local feedback");
            None
        }
    }
}

// ------------------------------------------------------------
// Tutor: provider + local fallback
// ------------------------------------------------------------

/// Which path produced a reply. Used for logs and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    Local,
    Remote,
    RemoteUnparsed,
    RemoteFailed,
}

impl ReplyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReplyMode::Local => "local",
            ReplyMode::Remote => "remote",
            ReplyMode::RemoteUnparsed => "remote_unparsed",
            ReplyMode::RemoteFailed => "remote_failed",
        }
    }
}

#[derive(Clone)]
pub struct Tutor {
    provider: Option<DynProvider>,
    rules: Arc<GrammarRules>,
}

impl Tutor {
    pub fn new(provider: Option<DynProvider>, rules: Arc<GrammarRules>) -> Self {
        Self { provider, rules }
    }

    /// Local heuristic only.
    pub fn local(rules: Arc<GrammarRules>) -> Self {
        Self::new(None, rules)
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.as_ref().map(|p| p.name()).unwrap_or("local")
    }

    pub fn rules(&self) -> &GrammarRules {
        &self.rules
    }

    pub async fn respond(
        &self,
        message: &str,
        context: Option<&ConversationContext>,
        history: &[HistoryTurn],
    ) -> (TutorReply, ReplyMode) {
        let (reply, mode) = match &self.provider {
            None => (local_reply(&self.rules, message, context), ReplyMode::Local),
            Some(provider) => {
                let prompt = build_prompt(message, context, history);
                match provider.generate(&prompt).await {
                    Ok(raw) => match parse_model_reply(&raw) {
                        Some(remote) => (remote, ReplyMode::Remote),
                        None => (
                            unparsed_reply(&self.rules, &raw, message, context),
                            ReplyMode::RemoteUnparsed,
                        ),
                    },
                    Err(e) => {
                        tracing::warn!(
                            error = ?e,
                            provider = provider.name(),
                            id = %anon_hash(message),
                            "tutor provider failed, using local feedback"
                        );
                        (local_reply(&self.rules, message, context), ReplyMode::RemoteFailed)
                    }
                }
            }
        };

        counter!("tutor_replies_total", "mode" => mode.as_str()).increment(1);
        counter!("feedback_corrections_total").increment(reply.corrections.len() as u64);
        (reply, mode)
    }
}

fn unparsed_reply(
    rules: &GrammarRules,
    raw: &str,
    message: &str,
    context: Option<&ConversationContext>,
) -> TutorReply {
    let (corrections, metrics, suggestions) = analyze_message(rules, message, context);
    let trimmed = raw.trim();
    let text = if trimmed.is_empty() {
        UNPARSED_FALLBACK_TEXT.to_string()
    } else {
        trimmed.to_string()
    };
    TutorReply {
        text,
        corrections,
        metrics,
        suggestions,
    }
}

// ------------------------------------------------------------
// Prompt + reply parsing
// ------------------------------------------------------------

pub fn build_prompt(
    message: &str,
    context: Option<&ConversationContext>,
    history: &[HistoryTurn],
) -> String {
    let level = context
        .and_then(ConversationContext::level)
        .unwrap_or(DEFAULT_LEVEL);

    let mut prompt = format!(
        "Du bist ein freundlicher und geduldiger Deutschlehrer. Deine Aufgabe:\n\n\
         1. IMMER auf Deutsch antworten\n\
         2. Grammatikfehler freundlich korrigieren mit Erklärungen\n\
         3. Das Sprachniveau anpassen (aktuell: {level})\n\
         4. Ermutigung und positive Verstärkung geben\n\
         5. Auf den Kontext des Artikels oder Podcasts eingehen, wenn vorhanden\n\n"
    );

    if let Some(theme) = context.and_then(ConversationContext::theme) {
        prompt.push_str(&format!("Der Schüler lernt gerade über: \"{theme}\"\n\n"));
    }

    prompt.push_str(
        "Antworte im JSON-Format:\n\
         {\n\
         \x20 \"text\": \"Deine hilfreiche Antwort auf Deutsch\",\n\
         \x20 \"corrections\": [{\"original\": \"falscher Text\", \"corrected\": \"korrigierter Text\", \"explanation\": \"Erklärung warum und Regel\"}],\n\
         \x20 \"metrics\": {\"accuracy\": 0-100, \"fluency\": 0-100, \"grammar_accuracy\": 0-100, \"vocabulary_usage\": 0-100},\n\
         \x20 \"suggestions\": [{\"type\": \"Grammar/Vocabulary/Expression\", \"action\": \"Konkrete Übungsvorschläge\"}]\n\
         }\n\n",
    );

    if !history.is_empty() {
        prompt.push_str("Bisheriges Gespräch:\n");
        let start = history.len().saturating_sub(HISTORY_TURNS);
        for turn in &history[start..] {
            let who = if turn.sender == "user" { "Schüler" } else { "Lehrer" };
            prompt.push_str(&format!("{who}: {}\n", turn.text));
        }
    }

    prompt.push_str(&format!(
        "\nSchüler: {message}\n\nBitte antworte als hilfreicher Deutschlehrer im JSON-Format:"
    ));
    prompt
}

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\n?|\n?```").expect("code fence regex"));

#[derive(Deserialize)]
struct RemoteReply {
    #[serde(default, deserialize_with = "null_as_default")]
    text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    corrections: Vec<RemoteCorrection>,
    #[serde(default, deserialize_with = "lenient_metrics")]
    metrics: RemoteMetrics,
    #[serde(default, deserialize_with = "null_as_default")]
    suggestions: Vec<RemoteSuggestion>,
}

#[derive(Deserialize)]
struct RemoteCorrection {
    #[serde(default, deserialize_with = "null_as_default")]
    original: String,
    #[serde(default, deserialize_with = "null_as_default")]
    corrected: String,
    #[serde(default, deserialize_with = "null_as_default")]
    explanation: String,
}

#[derive(Deserialize, Default)]
struct RemoteMetrics {
    #[serde(default, deserialize_with = "lenient_score")]
    accuracy: f64,
    #[serde(default, deserialize_with = "lenient_score")]
    fluency: f64,
    #[serde(default, deserialize_with = "lenient_score")]
    grammar_accuracy: f64,
    #[serde(default, deserialize_with = "lenient_score")]
    vocabulary_usage: f64,
}

#[derive(Deserialize)]
struct RemoteSuggestion {
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    action: String,
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Numbers or numeric strings; anything else scores 0.
fn lenient_score<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn lenient_metrics<'de, D: Deserializer<'de>>(d: D) -> Result<RemoteMetrics, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(v @ Value::Object(_)) => serde_json::from_value(v).unwrap_or_default(),
        _ => RemoteMetrics::default(),
    })
}

/// Parse the model's JSON answer (optionally wrapped in a ```json fence).
/// Returns `None` when the text is not a JSON object of the expected shape.
pub fn parse_model_reply(raw: &str) -> Option<TutorReply> {
    let cleaned = CODE_FENCE.replace_all(raw, "");
    let remote: RemoteReply = serde_json::from_str(cleaned.trim()).ok()?;

    let text = remote
        .text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNPARSED_FALLBACK_TEXT.to_string());

    let corrections = remote
        .corrections
        .into_iter()
        .filter(|c| !c.original.trim().is_empty() || !c.corrected.trim().is_empty())
        .take(MAX_CORRECTIONS)
        .map(|c| Correction {
            original: c.original,
            corrected: c.corrected,
            explanation: c.explanation,
        })
        .collect();

    let m = remote.metrics;
    let metrics = Metrics {
        accuracy: to_score(m.accuracy),
        fluency: to_score(m.fluency),
        grammar_accuracy: to_score(m.grammar_accuracy),
        vocabulary_usage: to_score(m.vocabulary_usage),
    };

    let suggestions = remote
        .suggestions
        .into_iter()
        .filter(|s| !s.action.trim().is_empty())
        .take(MAX_SUGGESTIONS)
        .map(|s| Suggestion::new(SuggestionKind::from_label(&s.kind), s.action))
        .collect();

    Some(TutorReply {
        text,
        corrections,
        metrics,
        suggestions,
    })
}
