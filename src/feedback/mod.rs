// src/feedback/mod.rs
//! Conversational grammar feedback: rule matching, heuristic metrics, canned
//! suggestions, and the optional remote tutor.
//!
//! Everything here is stateless per message; the only shared pieces are the
//! compiled rule table and the tutor client, both read-only after start-up.

pub mod rules;
pub mod scoring;
pub mod suggestions;
pub mod tutor;

use serde::{Deserialize, Serialize};

pub use rules::{extract_corrections, GrammarRules, MAX_CORRECTIONS};
pub use scoring::estimate_metrics;
pub use suggestions::{generate_suggestions, MAX_SUGGESTIONS};

/// One flagged phrase with its fixed correction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Correction {
    pub original: String,
    pub corrected: String,
    pub explanation: String,
}

/// Four independent scores, each in [0,100].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Metrics {
    pub accuracy: u8,
    pub fluency: u8,
    pub grammar_accuracy: u8,
    pub vocabulary_usage: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SuggestionKind {
    Grammar,
    Vocabulary,
    Expression,
}

impl SuggestionKind {
    /// Lenient mapping for labels coming back from the remote tutor
    /// ("Grammar/Vocabulary/Expression", "vocab", ...).
    pub fn from_label(label: &str) -> Self {
        let l = label.to_ascii_lowercase();
        if l.starts_with("vocab") {
            SuggestionKind::Vocabulary
        } else if l.starts_with("expr") {
            SuggestionKind::Expression
        } else {
            SuggestionKind::Grammar
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub action: String,
}

impl Suggestion {
    pub fn new(kind: SuggestionKind, action: impl Into<String>) -> Self {
        Self {
            kind,
            action: action.into(),
        }
    }
}

/// Article the learner is currently reading. The front-end sends the raw sheet
/// row, so the upper-case column names are accepted alongside lower-case ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleContext {
    #[serde(default, rename = "LEVEL", alias = "level")]
    pub level: Option<String>,
    #[serde(default, rename = "THEME", alias = "theme")]
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    #[serde(default)]
    pub article: Option<ArticleContext>,
}

impl ConversationContext {
    pub fn level(&self) -> Option<&str> {
        self.article
            .as_ref()
            .and_then(|a| a.level.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn theme(&self) -> Option<&str> {
        self.article
            .as_ref()
            .and_then(|a| a.theme.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Previous turn in the chat, `sender` is "user" for the learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryTurn {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub text: String,
}

/// Body returned by `/ai-conversation`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TutorReply {
    pub text: String,
    pub corrections: Vec<Correction>,
    pub metrics: Metrics,
    pub suggestions: Vec<Suggestion>,
}

/// Corrections, metrics and suggestions for one message, computed locally.
pub fn analyze_message(
    rules: &GrammarRules,
    message: &str,
    context: Option<&ConversationContext>,
) -> (Vec<Correction>, Metrics, Vec<Suggestion>) {
    let corrections = rules.extract_corrections(message);
    let metrics = estimate_metrics(message, &corrections);
    let suggestions = generate_suggestions(message, &corrections, context);
    (corrections, metrics, suggestions)
}

/// Full reply without any remote model.
pub fn local_reply(
    rules: &GrammarRules,
    message: &str,
    context: Option<&ConversationContext>,
) -> TutorReply {
    let (corrections, metrics, suggestions) = analyze_message(rules, message, context);
    let text = compose_text(context.and_then(ConversationContext::theme), &corrections, &metrics);
    TutorReply {
        text,
        corrections,
        metrics,
        suggestions,
    }
}

fn compose_text(theme: Option<&str>, corrections: &[Correction], metrics: &Metrics) -> String {
    let mut text = String::new();

    if let Some(theme) = theme {
        text.push_str(&format!("Sehr gut, dass du den Artikel über \"{theme}\" liest! "));
    }

    if corrections.is_empty() {
        text.push_str("Dein Deutsch wird immer besser! ");
    } else {
        text.push_str("Ich habe ein paar kleine Korrekturen für dich. ");
    }

    text.push_str(match metrics.accuracy {
        80.. => "Ausgezeichnet! Du machst große Fortschritte. ",
        60..=79 => "Gut gemacht! Weiter so! ",
        _ => "Keine Sorge, Übung macht den Meister! ",
    });

    text.push_str("Was möchtest du als Nächstes üben?");
    text
}
