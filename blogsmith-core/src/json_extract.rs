//! Pulls a JSON value out of a free-text model response.
//!
//! Stages, in order: strip a Markdown code fence, parse the remainder, and if
//! that fails try each balanced `{...}` / `[...]` block in the text until one
//! parses. Callers decide what to do when every stage fails.

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("response was empty")]
    Empty,

    #[error("invalid JSON: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Removes a surrounding ```` ```json ```` / ```` ``` ```` fence, if any.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches("json"),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Returns the first balanced JSON object or array in `text`, skipping
/// brackets that appear inside string literals.
pub fn balanced_block(text: &str) -> Option<&str> {
    block_starts(text).find_map(|start| balanced_block_at(text, start))
}

fn block_starts(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.match_indices(['{', '[']).map(|(i, _)| i)
}

/// The balanced block opening at byte `start`, which must be `{` or `[`.
fn balanced_block_at(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let (open, close) = match bytes.get(start)? {
        b'{' => (b'{', b'}'),
        b'[' => (b'[', b']'),
        _ => return None,
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            _ if b == open => depth += 1,
            _ if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses a model response into `T` using the fence → direct → block stages.
///
/// Blocks are tried in order of their opening bracket, so bracketed prose
/// ahead of the payload ("the article [final draft]:") does not hide it.
pub fn parse_json<T: DeserializeOwned>(response: &str) -> Result<T, ExtractError> {
    let stripped = strip_code_fence(response);
    if stripped.is_empty() {
        return Err(ExtractError::Empty);
    }

    let direct_err = match serde_json::from_str::<T>(stripped) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let mut first_block_err = None;
    for start in block_starts(stripped) {
        let Some(block) = balanced_block_at(stripped, start) else {
            continue;
        };
        if block.len() == stripped.len() {
            continue;
        }
        match serde_json::from_str::<T>(block) {
            Ok(value) => return Ok(value),
            Err(e) => {
                first_block_err.get_or_insert(e);
            }
        }
    }
    Err(ExtractError::Invalid(first_block_err.unwrap_or(direct_err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pick {
        #[serde(rename = "imageNumber")]
        image_number: usize,
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```json {\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn test_parse_json_from_fenced_response() {
        let pick: Pick = parse_json("```json\n{\"imageNumber\": 3}\n```").unwrap();
        assert_eq!(pick, Pick { image_number: 3 });
    }

    #[test]
    fn test_parse_json_from_prose_with_braces_in_strings() {
        let text = "Sure! Here it is:\n{\"imageNumber\": 2, \"reason\": \"a } in text\"}\nHope that helps.";
        let pick: Pick = parse_json(text).unwrap();
        assert_eq!(pick.image_number, 2);
    }

    #[test]
    fn test_parse_json_array_block() {
        let questions: Vec<String> = parse_json("Questions:\n[\"One?\", \"Two?\"]").unwrap();
        assert_eq!(questions, vec!["One?", "Two?"]);
    }

    #[test]
    fn test_parse_json_skips_bracketed_prose_before_payload() {
        let text = "Here is my pick [after review]:\n{\"imageNumber\": 4}";
        let pick: Pick = parse_json(text).unwrap();
        assert_eq!(pick.image_number, 4);
        assert_eq!(balanced_block(text), Some("[after review]"));
    }

    #[test]
    fn test_parse_json_reports_failures() {
        assert!(matches!(parse_json::<Pick>("   "), Err(ExtractError::Empty)));
        assert!(matches!(
            parse_json::<Pick>("no json here"),
            Err(ExtractError::Invalid(_))
        ));
        assert!(matches!(
            parse_json::<Pick>("{\"imageNumber\": \"three\"}"),
            Err(ExtractError::Invalid(_))
        ));
    }
}
