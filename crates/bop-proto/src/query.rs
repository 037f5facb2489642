//! Search query grammar.
//!
//! ```text
//! from:<value> by:<value> free text
//! value := "anything up to the closing quote" | run-up-to-first-space
//! ```
//!
//! `from:` is located and cut out of the input first; `by:` is then searched
//! in what remains. A `by:` that only exists inside a quoted `from:` value is
//! therefore never seen. Whatever survives both cuts is the free-text query,
//! spacing included.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

const FROM_KEYWORD: &str = "from:";
const BY_KEYWORD: &str = "by:";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("bad from clause")]
    BadFrom,
    #[error("bad by clause")]
    BadBy,
}

/// Structured search, sent as the body of `POST /advancedsearch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    #[serde(serialize_with = "empty_if_none", default)]
    pub from: Option<String>,
    #[serde(serialize_with = "empty_if_none", default)]
    pub by: Option<String>,
    #[serde(default)]
    pub query: String,
    /// 1-based. Never set by [`parse`]; see [`QueryFilter::with_page`].
    #[serde(default)]
    pub page: u32,
}

impl QueryFilter {
    /// Copy of this filter pointed at `page`.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

fn empty_if_none<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

/// Parse raw search text into a [`QueryFilter`].
pub fn parse(raw: &str) -> Result<QueryFilter, QueryError> {
    let mut working: Vec<char> = raw.chars().collect();

    let from = take_clause(&mut working, FROM_KEYWORD).map_err(|_| QueryError::BadFrom)?;
    let by = take_clause(&mut working, BY_KEYWORD).map_err(|_| QueryError::BadBy)?;

    Ok(QueryFilter {
        from,
        by,
        query: working.into_iter().collect(),
        page: 0,
    })
}

struct Unterminated;

/// Find the first `keyword`, read its value and cut the whole clause out of
/// `text`. The cut runs from the keyword through the terminating character
/// (closing quote or space), or to the end of input for a trailing
/// unquoted value.
fn take_clause(text: &mut Vec<char>, keyword: &str) -> Result<Option<String>, Unterminated> {
    let keyword: Vec<char> = keyword.chars().collect();
    let Some(start) = find_chars(text, &keyword) else {
        return Ok(None);
    };

    let mut in_quotes = false;
    let mut value = String::new();
    let mut end = None;

    for i in (start + keyword.len())..text.len() {
        let c = text[i];
        if c == '"' && !in_quotes {
            in_quotes = true;
            continue;
        }
        if c == '"' {
            end = Some(i);
            break;
        }
        if c == ' ' && !in_quotes {
            end = Some(i);
            break;
        }
        if !in_quotes && i + 1 == text.len() {
            end = Some(i);
        }
        value.push(c);
    }

    let end = end.ok_or(Unterminated)?;
    text.drain(start..=end);
    Ok(Some(value))
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
