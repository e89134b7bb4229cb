//! Grammar rule table for learner messages.
//!
//! Each rule is a case-insensitive regex over the lower-cased message plus a
//! fixed correction. The corrected text is NOT derived from the match: a hit
//! always yields the rule's canned `original`/`corrected`/`explanation`.
//!
//! Rules are checked in table order and never deduplicated; after the table a
//! token scan flags common nouns written in lower case. The output is capped at
//! `MAX_CORRECTIONS`, first hit first kept.
//!
//! The built-in table can be replaced by a JSON file (see `GrammarRules::load_default`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::{fs, path::Path};

use super::Correction;

pub const MAX_CORRECTIONS: usize = 3;

pub const DEFAULT_RULES_PATH: &str = "config/grammar_rules.json";
pub const ENV_RULES_PATH: &str = "GRAMMAR_RULES_PATH";

const CAPITALIZATION_EXPLANATION: &str = "Substantive werden im Deutschen großgeschrieben.";

/// Nouns learners often write in lower case.
const COMMON_NOUNS: &[&str] = &[
    "haus", "mann", "frau", "kind", "arbeit", "schule", "auto", "buch", "stadt", "land",
];

/// On-disk rule shape (`config/grammar_rules.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    pub original: String,
    pub corrected: String,
    pub explanation: String,
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    rules: Vec<RuleSpec>,
}

#[derive(Debug, Clone)]
pub struct GrammarRule {
    pattern: Regex,
    correction: Correction,
}

impl GrammarRule {
    pub fn compile(spec: &RuleSpec) -> anyhow::Result<Self> {
        // Every rule is case-insensitive regardless of how the pattern was written.
        let pattern = Regex::new(&format!("(?i){}", spec.pattern))?;
        Ok(Self {
            pattern,
            correction: Correction {
                original: spec.original.clone(),
                corrected: spec.corrected.clone(),
                explanation: spec.explanation.clone(),
            },
        })
    }

    pub fn is_match(&self, lowered: &str) -> bool {
        self.pattern.is_match(lowered)
    }
}

/// Ordered rule table. Order is match priority.
#[derive(Debug, Clone)]
pub struct GrammarRules {
    rules: Vec<GrammarRule>,
}

static BUILTIN: Lazy<GrammarRules> = Lazy::new(|| {
    let rules = builtin_specs()
        .iter()
        .map(|s| GrammarRule::compile(s).expect("built-in grammar rule must compile"))
        .collect();
    GrammarRules { rules }
});

impl GrammarRules {
    /// Shared built-in table.
    pub fn builtin() -> &'static GrammarRules {
        &BUILTIN
    }

    pub fn from_specs(specs: &[RuleSpec]) -> anyhow::Result<Self> {
        let rules = specs
            .iter()
            .map(GrammarRule::compile)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path.as_ref())?;
        let file: RuleFile = serde_json::from_str(&data)?;
        Self::from_specs(&file.rules)
    }

    /// `$GRAMMAR_RULES_PATH`, then `config/grammar_rules.json`, then the built-in table.
    /// A broken file is logged and ignored.
    pub fn load_default() -> Self {
        let path = std::env::var(ENV_RULES_PATH).unwrap_or_else(|_| DEFAULT_RULES_PATH.to_string());
        if !Path::new(&path).exists() {
            return Self::builtin().clone();
        }
        match Self::load_from_file(&path) {
            Ok(rules) => {
                tracing::info!(path = %path, count = rules.len(), "grammar rules loaded");
                rules
            }
            Err(e) => {
                tracing::warn!(error = ?e, path = %path, "invalid grammar rules file, using built-in table");
                Self::builtin().clone()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Corrections for one learner message, at most `MAX_CORRECTIONS`.
    pub fn extract_corrections(&self, message: &str) -> Vec<Correction> {
        let lowered = message.to_lowercase();

        let mut out: Vec<Correction> = self
            .rules
            .iter()
            .filter(|r| r.is_match(&lowered))
            .map(|r| r.correction.clone())
            .collect();

        out.extend(capitalization_corrections(message));
        out.truncate(MAX_CORRECTIONS);
        out
    }
}

/// Shorthand for the built-in table.
pub fn extract_corrections(message: &str) -> Vec<Correction> {
    GrammarRules::builtin().extract_corrections(message)
}

fn capitalization_corrections(message: &str) -> Vec<Correction> {
    let words: Vec<&str> = message.split_whitespace().collect();
    let mut out = Vec::new();

    for (i, word) in words.iter().enumerate() {
        // Sentence starts are skipped; capitalisation there proves nothing.
        if i > 0 && words[i - 1].ends_with('.') {
            continue;
        }
        let lowered = word.to_lowercase();
        if !COMMON_NOUNS.contains(&lowered.as_str()) {
            continue;
        }
        if word.chars().next().is_some_and(char::is_lowercase) {
            out.push(Correction {
                original: word.to_string(),
                corrected: capitalize(word),
                explanation: CAPITALIZATION_EXPLANATION.to_string(),
            });
        }
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn builtin_specs() -> Vec<RuleSpec> {
    let table: [(&str, &str, &str, &str); 9] = [
        // Perfekt auxiliaries
        (
            r"\bich\s+habe\s+gegangen\b",
            "ich habe gegangen",
            "ich bin gegangen",
            "Bewegungsverben (gehen, kommen, fahren) bilden das Perfekt mit \"sein\", nicht mit \"haben\".",
        ),
        (
            r"\bich\s+bin\s+gemacht\b",
            "ich bin gemacht",
            "ich habe gemacht",
            "Das Verb \"machen\" bildet das Perfekt mit \"haben\", nicht mit \"sein\".",
        ),
        // Articles
        (
            r"\bder\s+frau\b",
            "der Frau",
            "die Frau (Nominativ) / der Frau (Dativ/Genitiv)",
            "\"Frau\" ist feminin. Im Nominativ: die Frau. Im Dativ/Genitiv: der Frau.",
        ),
        (
            r"\bein\s+mann\b",
            "ein Mann",
            "ein Mann",
            "Korrekt! \"Mann\" ist maskulin: ein Mann.",
        ),
        // Cases
        (
            r"\bich\s+helfe\s+du\b",
            "ich helfe du",
            "ich helfe dir",
            "Nach \"helfen\" steht der Dativ: ich helfe dir (nicht du).",
        ),
        (
            r"\bmit\s+mein\s+freund\b",
            "mit mein Freund",
            "mit meinem Freund",
            "Nach \"mit\" steht der Dativ: meinem (nicht mein).",
        ),
        // Word order
        (
            r"\bgestern\s+ich\s+war\b",
            "gestern ich war",
            "gestern war ich",
            "Bei Zeitangaben am Satzanfang: Verb an zweiter Position, dann Subjekt.",
        ),
        // Modal verbs
        (
            r"\bich\s+kann\s+zu\s+gehen\b",
            "ich kann zu gehen",
            "ich kann gehen",
            "Nach Modalverben steht der Infinitiv ohne \"zu\".",
        ),
        // Separable verbs
        (
            r"\bich\s+anrufe\b",
            "ich anrufe",
            "ich rufe an",
            "Trennbare Verben: Der Präfix kommt ans Satzende.",
        ),
    ];

    table
        .iter()
        .map(|(pattern, original, corrected, explanation)| RuleSpec {
            pattern: pattern.to_string(),
            original: original.to_string(),
            corrected: corrected.to_string(),
            explanation: explanation.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfekt_with_sein_is_flagged() {
        let out = extract_corrections("ich habe gegangen");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].original, "ich habe gegangen");
        assert_eq!(out[0].corrected, "ich bin gegangen");
    }

    #[test]
    fn patterns_ignore_case_and_extra_spaces() {
        let out = extract_corrections("Gestern   ICH war im Kino");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].corrected, "gestern war ich");
    }

    #[test]
    fn lowercase_noun_gets_capitalized() {
        let out = extract_corrections("Ich gehe in die schule");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].original, "schule");
        assert_eq!(out[0].corrected, "Schule");
    }

    #[test]
    fn noun_after_full_stop_is_skipped() {
        let out = extract_corrections("Ich bin müde. haus ist groß");
        assert!(out.is_empty(), "got {out:?}");
    }

    #[test]
    fn capped_at_three_in_table_order() {
        let msg = "ich habe gegangen und ich bin gemacht, ich helfe du mit mein freund";
        let out = extract_corrections(msg);
        assert_eq!(out.len(), MAX_CORRECTIONS);
        assert_eq!(out[0].original, "ich habe gegangen");
        assert_eq!(out[1].original, "ich bin gemacht");
        assert_eq!(out[2].original, "ich helfe du");
    }

    #[test]
    fn custom_specs_compile_case_insensitive() {
        let rules = GrammarRules::from_specs(&[RuleSpec {
            pattern: r"\bweil\s+ich\s+bin\b".into(),
            original: "weil ich bin".into(),
            corrected: "weil ich ... bin".into(),
            explanation: "Nebensatz: Verb am Ende.".into(),
        }])
        .unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.extract_corrections("WEIL ich bin müde").len(), 1);
    }

    #[test]
    fn broken_pattern_is_an_error() {
        let res = GrammarRules::from_specs(&[RuleSpec {
            pattern: "(unclosed".into(),
            original: String::new(),
            corrected: String::new(),
            explanation: String::new(),
        }]);
        assert!(res.is_err());
    }
}
