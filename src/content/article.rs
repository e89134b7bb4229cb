// src/content/article.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::content::clean_cell;
use crate::content::types::SheetValues;

/// Sheet layout, in canonical order.
pub const COLUMNS: [&str; 13] = [
    "DATE",
    "LEVEL",
    "THEME",
    "STATUS",
    "GERMAN_ARTICLE",
    "ENGLISH_TRANSLATION",
    "VOCABULARY_USED",
    "DEEP_DIVE_GRAMMAR",
    "PHRASE_AND_IDIOM",
    "QUOTE_AND_JOKE",
    "CONVERSATION_TIME",
    "GRAMMAR_TOPIC_TAGS",
    "DRILL_SENTENCES",
];

pub const PUBLISHED: &str = "Published";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VocabEntry {
    pub term: String,
    pub translation: Option<String>,
}

/// One fill-in-the-blank sentence: blanks are `___`, answers in order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Drill {
    pub prompt: String,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Article {
    pub date: String,
    pub level: String,
    pub theme: String,
    pub status: String,
    pub german: String,
    pub english: String,
    pub vocabulary: Vec<VocabEntry>,
    pub grammar_notes: String,
    pub idioms: String,
    pub quote: String,
    pub conversation: String,
    pub grammar_tags: Vec<String>,
    pub drills: Vec<Drill>,
}

/// Column index per canonical field.
#[derive(Debug, Clone)]
struct ColumnMap([Option<usize>; 13]);

impl ColumnMap {
    fn canonical() -> Self {
        let mut idx = [None; 13];
        for (i, slot) in idx.iter_mut().enumerate() {
            *slot = Some(i);
        }
        Self(idx)
    }

    /// Header match is case-insensitive and trimmed. `None` when the row
    /// does not name the DATE column, i.e. it is not a header.
    fn from_header(row: &[String]) -> Option<Self> {
        let mut idx = [None; 13];
        for (pos, cell) in row.iter().enumerate() {
            let name = cell.trim().to_ascii_uppercase();
            if let Some(k) = COLUMNS.iter().position(|c| *c == name) {
                idx[k].get_or_insert(pos);
            }
        }
        idx[0].map(|_| Self(idx))
    }

    fn get(&self, row: &[String], col: usize) -> String {
        self.0[col]
            .and_then(|i| row.get(i))
            .map(|s| clean_cell(s))
            .unwrap_or_default()
    }
}

/// Published, complete articles in sheet order.
///
/// The first row is used as the header when it names a DATE column;
/// otherwise every row is data in canonical column order.
pub fn parse_articles(values: &SheetValues) -> Vec<Article> {
    let (map, rows) = match values.first().and_then(|h| ColumnMap::from_header(h)) {
        Some(map) => (map, &values[1..]),
        None => (ColumnMap::canonical(), &values[..]),
    };

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for row in rows {
        let status = map.get(row, 3);
        if status != PUBLISHED {
            continue;
        }
        let article = Article {
            date: map.get(row, 0),
            level: map.get(row, 1),
            theme: map.get(row, 2),
            status,
            german: map.get(row, 4),
            english: map.get(row, 5),
            vocabulary: parse_vocabulary(&map.get(row, 6)),
            grammar_notes: map.get(row, 7),
            idioms: map.get(row, 8),
            quote: map.get(row, 9),
            conversation: map.get(row, 10),
            grammar_tags: split_list(&map.get(row, 11)),
            drills: parse_drills(&map.get(row, 12)),
        };
        if article.date.is_empty()
            || article.theme.is_empty()
            || article.german.is_empty()
            || article.english.is_empty()
        {
            skipped += 1;
            continue;
        }
        out.push(article);
    }
    if skipped > 0 {
        tracing::warn!(skipped, "published rows missing required fields");
    }
    out
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// `"der Alltag - daily life, schaffen - to create"`
pub fn parse_vocabulary(s: &str) -> Vec<VocabEntry> {
    split_list(s)
        .into_iter()
        .map(|item| match item.split_once(" - ") {
            Some((term, tr)) if !tr.trim().is_empty() => VocabEntry {
                term: term.trim().to_string(),
                translation: Some(tr.trim().to_string()),
            },
            Some((term, _)) => VocabEntry {
                term: term.trim().to_string(),
                translation: None,
            },
            None => VocabEntry {
                term: item,
                translation: None,
            },
        })
        .collect()
}

static BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]*)\}").expect("blank regex"));

/// Split after `.`, `!` or `?` (outside braces) and turn `{answer}` blanks
/// into `___`. Sentences without a blank are not drills and are dropped.
pub fn parse_drills(s: &str) -> Vec<Drill> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;
    for c in s.chars() {
        current.push(c);
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '.' | '!' | '?' if depth == 0 => sentences.push(std::mem::take(&mut current)),
            _ => {}
        }
    }
    sentences.push(current);

    sentences
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|sentence| {
            let answers: Vec<String> = BLANK
                .captures_iter(sentence)
                .map(|c| c[1].trim().to_string())
                .collect();
            if answers.is_empty() {
                return None;
            }
            Some(Drill {
                prompt: BLANK.replace_all(sentence, "___").into_owned(),
                answers,
            })
        })
        .collect()
}
