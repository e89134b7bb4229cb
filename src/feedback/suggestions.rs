//! Canned practice suggestions. Pure table lookup, no adaptation.

use super::{ConversationContext, Correction, Suggestion, SuggestionKind};

pub const MAX_SUGGESTIONS: usize = 3;

/// Explanation keyword -> practice topic. Matching is case-insensitive.
const TOPIC_KEYWORDS: &[(&str, &str)] = &[
    ("perfekt", "Perfekt"),
    ("dativ", "Dativ"),
    ("akkusativ", "Akkusativ"),
    ("modal", "Modalverben"),
    ("trennbar", "Trennbare Verben"),
];

const SHORT_MESSAGE_WORDS: usize = 10;

pub const DEFAULT_LEVEL: &str = "B2";

pub fn generate_suggestions(
    message: &str,
    corrections: &[Correction],
    context: Option<&ConversationContext>,
) -> Vec<Suggestion> {
    let mut out = Vec::new();

    for topic in detect_topics(corrections) {
        out.push(Suggestion::new(
            SuggestionKind::Grammar,
            format!("Übe {topic} mit den Übungen im Grammar Drill Bereich"),
        ));
    }

    if message.split_whitespace().count() < SHORT_MESSAGE_WORDS {
        out.push(Suggestion::new(
            SuggestionKind::Expression,
            "Versuche längere Sätze mit Nebensätzen zu bilden (weil, dass, wenn)",
        ));
    }

    if let Some(ctx) = context {
        if let Some(s) = level_suggestion(ctx.level().unwrap_or(DEFAULT_LEVEL)) {
            out.push(s);
        }
        if let Some(theme) = ctx.theme() {
            out.push(Suggestion::new(
                SuggestionKind::Vocabulary,
                format!("Lerne die Fachvokabeln zum Thema \"{theme}\""),
            ));
        }
    }

    out.truncate(MAX_SUGGESTIONS);
    out
}

/// Topics named by the explanations, first-seen order, no repeats.
pub fn detect_topics(corrections: &[Correction]) -> Vec<&'static str> {
    let mut topics: Vec<&'static str> = Vec::new();
    for c in corrections {
        let explanation = c.explanation.to_lowercase();
        for &(keyword, topic) in TOPIC_KEYWORDS {
            if explanation.contains(keyword) && !topics.contains(&topic) {
                topics.push(topic);
            }
        }
    }
    topics
}

fn level_suggestion(level: &str) -> Option<Suggestion> {
    match level.trim() {
        "A2-B1" => Some(Suggestion::new(
            SuggestionKind::Vocabulary,
            "Erweitere deinen Wortschatz mit Alltagsthemen aus den A2-B1 Artikeln",
        )),
        "B2" => Some(Suggestion::new(
            SuggestionKind::Grammar,
            "Übe Konjunktiv II und Passiv für B2-Niveau",
        )),
        "C1+" => Some(Suggestion::new(
            SuggestionKind::Expression,
            "Verwende mehr idiomatische Ausdrücke und komplexe Satzstrukturen",
        )),
        _ => None,
    }
}
