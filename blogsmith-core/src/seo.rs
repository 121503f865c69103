//! Advisory SEO review of a generated article. Never fails and never blocks.

use serde::Serialize;

use crate::model::Article;
use crate::placeholder::{count_words, heading_count};

pub const MAX_TITLE_CHARS: usize = 60;
pub const EXCERPT_CHARS: std::ops::RangeInclusive<usize> = 140..=155;
pub const MIN_HEADINGS: usize = 3;
pub const MIN_WORDS: usize = 850;
pub const RECOMMENDED_WORDS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoReport {
    pub word_count: usize,
    pub title_length: usize,
    pub excerpt_length: usize,
    pub heading_count: usize,
    pub advisories: Vec<String>,
}

impl SeoReport {
    pub fn passed(&self) -> bool {
        self.advisories.is_empty()
    }
}

pub fn review(article: &Article) -> SeoReport {
    let word_count = count_words(&article.content);
    let title_length = article.title.chars().count();
    let excerpt_length = article.excerpt.chars().count();
    let heading_count = heading_count(&article.content);

    let mut advisories = Vec::new();
    if title_length > MAX_TITLE_CHARS {
        advisories.push(format!(
            "Title too long ({title_length} chars, should be <= {MAX_TITLE_CHARS})"
        ));
    }
    if !EXCERPT_CHARS.contains(&excerpt_length) {
        advisories.push(format!(
            "Meta description should be {}-{} chars (currently {excerpt_length})",
            EXCERPT_CHARS.start(),
            EXCERPT_CHARS.end()
        ));
    }
    if heading_count < MIN_HEADINGS {
        advisories.push(format!(
            "Only {heading_count} H2 headings found (recommend at least {MIN_HEADINGS})"
        ));
    }
    if word_count < MIN_WORDS {
        advisories.push(format!(
            "Article is only {word_count} words (minimum required: {MIN_WORDS})"
        ));
    } else if word_count < RECOMMENDED_WORDS {
        advisories.push(format!(
            "Article is {word_count} words (recommend {RECOMMENDED_WORDS}+)"
        ));
    }

    SeoReport {
        word_count,
        title_length,
        excerpt_length,
        heading_count,
        advisories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_review_passes_a_compliant_article() {
        let article = Article {
            title: "A fine title".into(),
            excerpt: "e".repeat(150),
            content: format!(
                "<h2>A</h2><h2>B</h2><h2>C</h2><p>{}</p>",
                words(1100)
            ),
            ..Default::default()
        };
        let report = review(&article);
        assert_eq!(report.heading_count, 3);
        assert_eq!(report.word_count, 1103);
        assert!(report.passed(), "{:?}", report.advisories);
    }

    #[test]
    fn test_review_flags_every_threshold() {
        let article = Article {
            title: "t".repeat(61),
            excerpt: "short".into(),
            content: format!("<h2>A</h2><p>{}</p>", words(900)),
            ..Default::default()
        };
        let report = review(&article);
        assert_eq!(report.advisories.len(), 4);
        assert!(report.advisories[3].contains("recommend 1000+"));
    }

    #[test]
    fn test_review_flags_under_minimum_words() {
        let article = Article {
            content: words(10),
            ..Default::default()
        };
        let report = review(&article);
        assert!(report
            .advisories
            .iter()
            .any(|a| a.contains("minimum required: 850")));
    }
}
