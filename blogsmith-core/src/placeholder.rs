//! The `[IMAGE: <query>]` token: the only contract between generated article
//! content, image selection and publishing.
//!
//! Tokens are matched by exact substring everywhere. The regexes here are
//! only used to find tokens and H2 headings, never to rewrite a token into a
//! different literal.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::SelectedImage;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[IMAGE:\s*([^\]]+)\]").expect("valid regex"));

static H2_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h2[^>]*>.*?</h2>").expect("valid regex"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A token found in content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// The token exactly as written, brackets included.
    pub literal: &'a str,
    /// The free text after `IMAGE:`, trimmed.
    pub query: &'a str,
    pub start: usize,
    pub end: usize,
}

pub fn token_for(query: &str) -> String {
    format!("[IMAGE: {}]", query.trim())
}

/// A token for `query` whose literal is not yet in `content`. Repeats of
/// a query are numbered: `[IMAGE: q]`, `[IMAGE: q (2)]`, `[IMAGE: q (3)]`.
pub fn unique_token_for(content: &str, query: &str) -> String {
    let plain = token_for(query);
    if !content.contains(&plain) {
        return plain;
    }
    (2usize..)
        .map(|n| format!("[IMAGE: {} ({n})]", query.trim()))
        .find(|candidate| !content.contains(candidate.as_str()))
        .unwrap_or(plain)
}

pub fn tokens(content: &str) -> Vec<Token<'_>> {
    TOKEN_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let query = caps.get(1)?;
            Some(Token {
                literal: whole.as_str(),
                query: query.as_str().trim(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Byte offset just past the first H2 that is not already followed by a
/// token.
pub fn next_free_heading(content: &str) -> Option<usize> {
    H2_RE
        .find_iter(content)
        .find(|m| !content[m.end()..].trim_start().starts_with("[IMAGE:"))
        .map(|m| m.end())
}

pub fn heading_count(content: &str) -> usize {
    H2_RE.find_iter(content).count()
}

/// Inserts `token` right after the next free H2. Returns false (leaving
/// `content` untouched) when every heading already carries a token.
pub fn insert_after_next_heading(content: &mut String, token: &str) -> bool {
    match next_free_heading(content) {
        Some(at) => {
            content.insert_str(at, &format!("\n{token}\n"));
            true
        }
        None => false,
    }
}

/// Inserts `token` before a "Conclusion" H2 (any case), else before the
/// closing `</article>`, else at the end of the content.
pub fn insert_before_conclusion_or_end(content: &mut String, token: &str) {
    let conclusion = H2_RE
        .find_iter(content)
        .find(|m| strip_html(m.as_str()).to_lowercase().contains("conclusion"))
        .map(|m| m.start());

    if let Some(at) = conclusion.or_else(|| content.rfind("</article>")) {
        content.insert_str(at, &format!("{token}\n"));
    } else {
        content.push_str(&format!("\n{token}\n"));
    }
}

/// Removes every token. Stripping already stripped content is a no-op.
pub fn strip_placeholders(content: &str) -> String {
    TOKEN_RE.replace_all(content, "").into_owned()
}

pub fn contains_placeholder(content: &str) -> bool {
    TOKEN_RE.is_match(content)
}

/// Block markup for one image with an attribution caption.
pub fn figure_markup(url: &str, alt_text: &str, caption: &str) -> String {
    format!(
        "<figure class=\"wp-block-image\"><img src=\"{}\" alt=\"{}\"/><figcaption>{}</figcaption></figure>",
        escape_attr(url),
        escape_attr(alt_text),
        caption
    )
}

/// Local preview of the article body: inline images are rendered from the
/// provider URLs, leftover tokens are removed.
pub fn render_preview(content: &str, images: &[SelectedImage]) -> String {
    let mut rendered = content.to_string();
    for image in images.iter().filter(|img| !img.position.is_featured()) {
        let Some(token) = image.placeholder.as_deref() else {
            continue;
        };
        let caption = format!(
            "{} (<a href=\"{}\">View on {}</a>)",
            image.credit,
            escape_attr(&image.credit_link),
            image.source.display_name()
        );
        rendered = rendered.replacen(token, &figure_markup(&image.url, &image.alt_text, &caption), 1);
    }
    strip_placeholders(&rendered)
}

/// Text content of an HTML fragment with whitespace collapsed.
pub fn strip_html(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    WS_RE.replace_all(&text, " ").trim().to_string()
}

pub fn count_words(html: &str) -> usize {
    strip_html(html).split_whitespace().count()
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PhotoSource, Position};

    #[test]
    fn test_tokens_capture_literal_and_query() {
        let content = "<p>a</p>[IMAGE:  team meeting ]<p>b</p>[IMAGE: desk]";
        let found = tokens(content);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].literal, "[IMAGE:  team meeting ]");
        assert_eq!(found[0].query, "team meeting");
        assert_eq!(&content[found[1].start..found[1].end], "[IMAGE: desk]");
    }

    #[test]
    fn test_unique_token_numbers_repeated_queries() {
        let content = "<p>a</p>[IMAGE: desk]<p>b</p>[IMAGE: desk (2)]";
        assert_eq!(unique_token_for(content, "lamp"), "[IMAGE: lamp]");
        assert_eq!(unique_token_for(content, " desk "), "[IMAGE: desk (3)]");
        assert_eq!(tokens("[IMAGE: desk (3)]")[0].query, "desk (3)");
    }

    #[test]
    fn test_insert_after_heading_consumes_headings_in_order() {
        let mut content = "<h2>One</h2><p>x</p><h2 class=\"s\">Two</h2><p>y</p>".to_string();
        assert!(insert_after_next_heading(&mut content, "[IMAGE: a]"));
        assert!(insert_after_next_heading(&mut content, "[IMAGE: b]"));
        assert!(!insert_after_next_heading(&mut content, "[IMAGE: c]"));
        let a = content.find("[IMAGE: a]").unwrap();
        let b = content.find("[IMAGE: b]").unwrap();
        assert!(content.find("One</h2>").unwrap() < a);
        assert!(a < content.find("Two</h2>").unwrap());
        assert!(content.find("Two</h2>").unwrap() < b);
        assert!(!content.contains("[IMAGE: c]"));
    }

    #[test]
    fn test_heading_with_existing_token_is_skipped() {
        let mut content = "<h2>One</h2>\n[IMAGE: there]\n<h2>Two</h2>".to_string();
        insert_after_next_heading(&mut content, "[IMAGE: new]");
        assert!(content.ends_with("<h2>Two</h2>\n[IMAGE: new]\n"));
    }

    #[test]
    fn test_insert_before_conclusion_any_case() {
        let mut content = "<p>x</p><h2>In CONCLUSION</h2><p>end</p>".to_string();
        insert_before_conclusion_or_end(&mut content, "[IMAGE: q]");
        assert!(content.contains("[IMAGE: q]\n<h2>In CONCLUSION</h2>"));
    }

    #[test]
    fn test_insert_before_closing_article_or_append() {
        let mut wrapped = "<article><p>x</p></article>".to_string();
        insert_before_conclusion_or_end(&mut wrapped, "[IMAGE: q]");
        assert!(wrapped.ends_with("[IMAGE: q]\n</article>"));

        let mut bare = "<p>x</p>".to_string();
        insert_before_conclusion_or_end(&mut bare, "[IMAGE: q]");
        assert!(bare.ends_with("\n[IMAGE: q]\n"));
    }

    #[test]
    fn test_strip_placeholders_is_idempotent() {
        let content = "<h2>A</h2>\n[IMAGE: one]\n<p>t [IMAGE:two]</p>";
        let once = strip_placeholders(content);
        assert!(!contains_placeholder(&once));
        assert_eq!(strip_placeholders(&once), once);
    }

    #[test]
    fn test_word_count_ignores_markup() {
        assert_eq!(count_words("<h2>Two words</h2><p>and three more</p>"), 5);
        assert_eq!(strip_html("<p>a</p>\n\n<p>b</p>"), "a b");
    }

    #[test]
    fn test_render_preview_substitutes_inline_images() {
        let image = SelectedImage {
            position: Position::Inline(1),
            url: "https://img.example/1.jpg".into(),
            alt_text: "a \"desk\"".into(),
            credit: "Photo by Ann on Unsplash".into(),
            credit_link: "https://unsplash.com/@ann".into(),
            photographer_name: "Ann".into(),
            image_id: "1".into(),
            placeholder: Some("[IMAGE: desk]".into()),
            source: PhotoSource::Unsplash,
        };
        let html = render_preview("<p>x</p>[IMAGE: desk][IMAGE: orphan]", &[image]);
        assert!(html.contains("src=\"https://img.example/1.jpg\""));
        assert!(html.contains("alt=\"a &quot;desk&quot;\""));
        assert!(html.contains("View on Unsplash"));
        assert!(!contains_placeholder(&html));
    }
}
