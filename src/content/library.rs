// src/content/library.rs
use chrono::NaiveDate;

use crate::content::article::{parse_articles, Article};
use crate::content::types::SheetValues;

/// Read-only view over the published articles of one sheet fetch.
#[derive(Debug, Clone, Default)]
pub struct ArticleLibrary {
    articles: Vec<Article>,
}

impl ArticleLibrary {
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    pub fn from_values(values: &SheetValues) -> Self {
        Self::new(parse_articles(values))
    }

    pub fn all(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// The article dated `date` (matched on the `YYYY-MM-DD` prefix), else the
    /// first one in sheet order.
    pub fn today_or_first(&self, date: NaiveDate) -> Option<&Article> {
        let key = date.format("%Y-%m-%d").to_string();
        self.articles
            .iter()
            .find(|a| a.date.starts_with(&key))
            .or_else(|| self.articles.first())
    }

    /// Case-insensitive exact theme match.
    pub fn by_theme(&self, theme: &str) -> Vec<&Article> {
        let theme = theme.trim().to_lowercase();
        self.articles
            .iter()
            .filter(|a| a.theme.to_lowercase() == theme)
            .collect()
    }

    /// Levels are matched by token, so "B1" also finds "A2-B1".
    pub fn by_level(&self, level: &str) -> Vec<&Article> {
        let level = level.trim().to_uppercase();
        self.articles
            .iter()
            .filter(|a| {
                let l = a.level.to_uppercase();
                l == level || l.split(['-', '/', ' ']).any(|t| t == level)
            })
            .collect()
    }

    /// Distinct themes, first-seen order.
    pub fn themes(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for a in &self.articles {
            if !out.contains(&a.theme.as_str()) {
                out.push(&a.theme);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::sample::sample_sheet_values;

    fn lib() -> ArticleLibrary {
        ArticleLibrary::from_values(&sample_sheet_values())
    }

    #[test]
    fn today_wins_over_first() {
        let l = lib();
        let d = NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();
        assert_eq!(l.today_or_first(d).unwrap().theme, "Climate Change");
    }

    #[test]
    fn unknown_date_gives_first() {
        let l = lib();
        let d = NaiveDate::from_ymd_opt(2030, 5, 5).unwrap();
        assert_eq!(l.today_or_first(d).unwrap().date, "2024-01-20");
        assert!(ArticleLibrary::default().today_or_first(d).is_none());
    }

    #[test]
    fn filters_by_theme_and_level() {
        let l = lib();
        assert_eq!(l.by_theme("shopping").len(), 1);
        assert_eq!(l.by_level("B2").len(), 2);
        assert_eq!(l.by_level("b1").len(), 2);
        assert!(l.by_level("C2").is_empty());
    }

    #[test]
    fn themes_are_distinct_in_order() {
        let mut arts = lib().all().to_vec();
        arts.push(arts[0].clone());
        let l = ArticleLibrary::new(arts);
        let t = l.themes();
        assert_eq!(t.len(), 5);
        assert_eq!(t[0], "Job Interview");
    }
}
