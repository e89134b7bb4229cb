// src/content/podcast.rs
//! Podcast proxy: fetch episodes upstream, annotate them for learners.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::content::sample::sample_episodes;

pub const DEFAULT_CATEGORY: &str = "all";
pub const DEFAULT_LANGUAGE: &str = "de";
pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 50;

fn string_or_number<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Upstream episode. Known fields are typed; everything else passes through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Upstream category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bunch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub learning_metadata: Option<LearningMetadata>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Episode {
    pub fn new(id: &str, bunch: &str, lang: &str, title: &str, script: &str, duration: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            bunch: Some(bunch.to_string()),
            lang: Some(lang.to_string()),
            title: Some(title.to_string()),
            script: Some(script.to_string()),
            duration: Some(duration.to_string()),
            date: None,
            learning_metadata: None,
            extra: Map::new(),
        }
    }

    /// Attach freshly computed metadata. An upstream `learning_metadata`
    /// is discarded.
    pub fn enrich(mut self) -> Self {
        self.extra.remove("learning_metadata");
        self.learning_metadata = Some(LearningMetadata::for_episode(&self));
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LearningMetadata {
    pub difficulty_level: String,
    pub vocabulary_count: usize,
    pub estimated_study_time: String,
    pub grammar_patterns: Vec<String>,
}

impl LearningMetadata {
    pub fn for_episode(ep: &Episode) -> Self {
        let script = ep.script.as_deref();
        Self {
            difficulty_level: difficulty_for(ep.bunch.as_deref().unwrap_or_default()).to_string(),
            vocabulary_count: vocabulary_count(script),
            estimated_study_time: estimated_study_time(ep.duration.as_deref()),
            grammar_patterns: grammar_patterns(script)
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

pub fn difficulty_for(category: &str) -> &'static str {
    match category {
        "sunday-specials" => "A2-B1",
        "ai-tech" => "B2",
        "finance-business" => "B2-C1",
        "leadership-strategy" => "C1",
        "science-innovation" => "B2-C1",
        _ => "B2",
    }
}

static VOCAB_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-ZÄÖÜ][a-zäöüß]{4,}\b").expect("vocab regex"));

/// Distinct capitalised words of five or more letters.
pub fn vocabulary_count(script: Option<&str>) -> usize {
    let Some(script) = script else { return 0 };
    let mut seen: Vec<&str> = VOCAB_WORD.find_iter(script).map(|m| m.as_str()).collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

/// Twice the listening time, from the leading minutes of `mm:ss`.
pub fn estimated_study_time(duration: Option<&str>) -> String {
    let duration = match duration.map(str::trim) {
        Some(d) if !d.is_empty() => d,
        _ => return "10 min".to_string(),
    };
    let head = duration.split(':').next().unwrap_or_default().trim_start();
    let digits: String = head.chars().take_while(|c| c.is_ascii_digit()).collect();
    let minutes = match digits.parse::<u64>() {
        Ok(0) | Err(_) => 5,
        Ok(m) => m,
    };
    format!("{} min", minutes.saturating_mul(2))
}

static GRAMMAR_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("Perfekt", r"(?i)\b(habe|hatte|hat)\b"),
        ("Futur/Passiv", r"(?i)\b(wird|wurde|werden)\b"),
        ("Nebensätze", r"(?i)\b(wenn|als|obwohl)\b"),
        ("Modalverben", r"(?i)\b(kann|muss|soll|darf)\b"),
    ]
    .into_iter()
    .map(|(label, re)| (label, Regex::new(re).expect("grammar pattern regex")))
    .collect()
});

pub fn grammar_patterns(script: Option<&str>) -> Vec<&'static str> {
    let Some(script) = script else {
        return Vec::new();
    };
    GRAMMAR_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(script))
        .map(|(label, _)| *label)
        .collect()
}

/// Normalised request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodcastQuery {
    pub category: String,
    pub language: String,
    pub date: Option<String>,
    pub limit: usize,
}

impl Default for PodcastQuery {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            date: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PodcastQuery {
    /// Blank values fall back to defaults; an unparsable or zero limit is 10,
    /// larger ones are capped.
    pub fn from_params(
        category: Option<&str>,
        language: Option<&str>,
        date: Option<&str>,
        limit: Option<&str>,
    ) -> Self {
        let non_blank = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        let limit = limit
            .and_then(|l| l.trim().parse::<usize>().ok())
            .filter(|&l| l > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        Self {
            category: non_blank(category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            language: non_blank(language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            date: non_blank(date),
            limit,
        }
    }
}

#[async_trait]
pub trait EpisodeSource: Send + Sync {
    async fn fetch_episodes(&self, query: &PodcastQuery) -> Result<Vec<Episode>>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct UpstreamBody {
    #[serde(default)]
    episode: Option<Episode>,
    #[serde(default)]
    episodes: Option<Vec<Episode>>,
}

/// The podcast generator function, `GET {base}?bunch=&lang=&limit=[&date=]`.
pub struct HttpEpisodeSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpEpisodeSource {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl EpisodeSource for HttpEpisodeSource {
    async fn fetch_episodes(&self, q: &PodcastQuery) -> Result<Vec<Episode>> {
        let limit = q.limit.to_string();
        let mut params = vec![
            ("bunch", q.category.as_str()),
            ("lang", q.language.as_str()),
            ("limit", limit.as_str()),
        ];
        if let Some(d) = &q.date {
            params.push(("date", d.as_str()));
        }

        let resp = self
            .http
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .context("podcast get()")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("Failed to fetch podcasts: {status}"));
        }

        let body: UpstreamBody = resp.json().await.context("podcast .json()")?;
        let mut out = body.episodes.unwrap_or_default();
        if let Some(ep) = body.episode {
            out.insert(0, ep);
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "podcast-api"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PodcastFeed {
    pub success: bool,
    pub episodes: Vec<Episode>,
    pub category: String,
    pub language: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Upstream + enrichment + sample fallback.
#[derive(Clone)]
pub struct PodcastService {
    source: Arc<dyn EpisodeSource>,
}

impl PodcastService {
    pub fn new(source: Arc<dyn EpisodeSource>) -> Self {
        Self { source }
    }

    /// Never fails: upstream errors are logged, counted and answered with
    /// the sample episodes.
    pub async fn feed(&self, q: &PodcastQuery) -> PodcastFeed {
        let (raw, fallback, error) = match self.source.fetch_episodes(q).await {
            Ok(eps) => (eps, false, None),
            Err(e) => {
                counter!("podcast_fetch_errors_total").increment(1);
                tracing::warn!(error = ?e, source = self.source.name(), category = %q.category, "podcast upstream failed");
                (sample_episodes(), true, Some(e.to_string()))
            }
        };

        let episodes: Vec<Episode> = raw
            .into_iter()
            .filter(|ep| match (&q.date, &ep.date) {
                (Some(want), Some(have)) => have.starts_with(want.as_str()),
                _ => true,
            })
            .take(q.limit)
            .map(Episode::enrich)
            .collect();

        tracing::info!(count = episodes.len(), fallback, category = %q.category, "podcast feed");
        PodcastFeed {
            success: true,
            episodes,
            category: q.category.clone(),
            language: q.language.clone(),
            fallback,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn categories_map_to_levels() {
        assert_eq!(difficulty_for("sunday-specials"), "A2-B1");
        assert_eq!(difficulty_for("leadership-strategy"), "C1");
        assert_eq!(difficulty_for("science-innovation"), "B2-C1");
        assert_eq!(difficulty_for("unknown"), "B2");
    }

    #[test]
    fn vocabulary_counts_distinct_long_nouns() {
        let s = "Die Wirtschaft wächst. Die Wirtschaft schrumpft. Ärzte und Kunst.";
        // Wirtschaft, Ärzte, Kunst
        assert_eq!(vocabulary_count(Some(s)), 3);
        assert_eq!(vocabulary_count(None), 0);
    }

    #[test]
    fn study_time_doubles_minutes() {
        assert_eq!(estimated_study_time(Some("4:30")), "8 min");
        assert_eq!(estimated_study_time(Some("12:05")), "24 min");
        assert_eq!(estimated_study_time(Some("abc")), "10 min");
        assert_eq!(estimated_study_time(Some("0:45")), "10 min");
        assert_eq!(estimated_study_time(None), "10 min");
        assert_eq!(estimated_study_time(Some("")), "10 min");
        // Upstream-controlled; huge minute counts saturate instead of overflowing.
        assert_eq!(
            estimated_study_time(Some("18446744073709551615:00")),
            format!("{} min", u64::MAX)
        );
    }

    #[test]
    fn grammar_patterns_are_word_bounded() {
        let p = grammar_patterns(Some("Ich HABE das gemacht, obwohl es regnet. Sie kann kommen."));
        assert_eq!(p, vec!["Perfekt", "Nebensätze", "Modalverben"]);
        assert!(grammar_patterns(Some("Hatten Alsfeld Kanne")).is_empty());
    }

    #[test]
    fn unknown_fields_pass_through_and_metadata_is_replaced() {
        let ep: Episode = serde_json::from_value(json!({
            "id": 7,
            "bunch": "ai-tech",
            "script": "Das wird spannend.",
            "duration": "3:00",
            "audio_url": "https://x/y.mp3",
            "learning_metadata": {"difficulty_level": "stale"}
        }))
        .unwrap();
        let ep = ep.enrich();
        let out = serde_json::to_value(&ep).unwrap();
        assert_eq!(out["id"], "7");
        assert_eq!(out["audio_url"], "https://x/y.mp3");
        assert_eq!(out["learning_metadata"]["difficulty_level"], "B2");
        assert_eq!(out["learning_metadata"]["estimated_study_time"], "6 min");
        assert_eq!(out["learning_metadata"]["grammar_patterns"], json!(["Futur/Passiv"]));
    }

    #[test]
    fn query_defaults_and_limit_cap() {
        let q = PodcastQuery::from_params(None, Some(" "), Some(""), Some("x"));
        assert_eq!(q, PodcastQuery::default());
        let q = PodcastQuery::from_params(Some("ai-tech"), None, Some("2024-05"), Some("500"));
        assert_eq!(q.limit, MAX_LIMIT);
        assert_eq!(q.date.as_deref(), Some("2024-05"));
    }

    struct Fixed(Option<Vec<Episode>>);

    #[async_trait]
    impl EpisodeSource for Fixed {
        async fn fetch_episodes(&self, _q: &PodcastQuery) -> Result<Vec<Episode>> {
            self.0.clone().ok_or_else(|| anyhow!("upstream down"))
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn feed_filters_by_date_and_limits() {
        let mut a = Episode::new("a", "ai-tech", "de", "A", "Text", "1:00");
        a.date = Some("2024-05-01".into());
        let mut b = a.clone();
        b.id = Some("b".into());
        b.date = Some("2024-06-01".into());
        let mut c = a.clone();
        c.id = Some("c".into());

        let svc = PodcastService::new(Arc::new(Fixed(Some(vec![a, b, c]))));
        let q = PodcastQuery {
            date: Some("2024-05".into()),
            limit: 1,
            ..PodcastQuery::default()
        };
        let feed = svc.feed(&q).await;
        assert!(!feed.fallback);
        assert_eq!(feed.episodes.len(), 1);
        assert_eq!(feed.episodes[0].id.as_deref(), Some("a"));
        assert!(feed.episodes[0].learning_metadata.is_some());
    }

    #[tokio::test]
    async fn upstream_failure_serves_sample_episodes() {
        let svc = PodcastService::new(Arc::new(Fixed(None)));
        let feed = svc.feed(&PodcastQuery::default()).await;
        assert!(feed.success);
        assert!(feed.fallback);
        assert_eq!(feed.error.as_deref(), Some("upstream down"));
        assert!(!feed.episodes.is_empty());
    }
}
