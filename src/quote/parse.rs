//! Quote response parsing and bounded copies.

use crate::config::ResponseFormat;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Quote and author extracted from a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuote<'a> {
    pub text: Cow<'a, str>,
    pub author: Cow<'a, str>,
}

/// Body parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Body is not valid UTF-8.
    NotUtf8,
    /// Body exceeded the configured limit.
    BodyTooLarge { limit: usize },
    /// Body is empty or whitespace.
    Empty,
    /// Body does not match the expected format.
    Malformed(String),
    /// A required field is absent, not a string, or (for the quote) blank.
    MissingField(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotUtf8 => write!(f, "body is not valid UTF-8"),
            Self::BodyTooLarge { limit } => write!(f, "body exceeds {} bytes", limit),
            Self::Empty => write!(f, "empty body"),
            Self::Malformed(msg) => write!(f, "malformed body: {}", msg),
            Self::MissingField(name) => write!(f, "missing field '{}'", name),
        }
    }
}

impl std::error::Error for ParseError {}

/// Extract quote and author from `body`.
pub fn parse_quote<'a>(
    body: &'a [u8],
    format: &ResponseFormat,
) -> Result<ParsedQuote<'a>, ParseError> {
    let text = std::str::from_utf8(body).map_err(|_| ParseError::NotUtf8)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    match format {
        ResponseFormat::Json {
            quote_key,
            author_key,
        } => parse_json(text, quote_key, author_key),
        ResponseFormat::Delimited {
            field_sep,
            kv_sep,
            quote_key,
            author_key,
        } => parse_delimited(text, *field_sep, *kv_sep, quote_key, author_key),
    }
}

fn parse_json<'a>(
    text: &str,
    quote_key: &str,
    author_key: &str,
) -> Result<ParsedQuote<'a>, ParseError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ParseError::Malformed(e.to_string()))?;

    // Some quote APIs wrap the object in a one-element array
    let object = match &value {
        Value::Array(items) => items
            .first()
            .ok_or_else(|| ParseError::Malformed("empty array".into()))?,
        other => other,
    };
    if !object.is_object() {
        return Err(ParseError::Malformed("expected a JSON object".into()));
    }

    let field = |key: &str| -> Result<String, ParseError> {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| ParseError::MissingField(key.to_string()))
    };

    let quote = field(quote_key)?;
    if quote.trim().is_empty() {
        return Err(ParseError::MissingField(quote_key.to_string()));
    }
    let author = field(author_key)?;

    Ok(ParsedQuote {
        text: Cow::Owned(quote.trim().to_string()),
        author: Cow::Owned(author.trim().to_string()),
    })
}

fn parse_delimited<'a>(
    text: &'a str,
    field_sep: char,
    kv_sep: char,
    quote_key: &str,
    author_key: &str,
) -> Result<ParsedQuote<'a>, ParseError> {
    let mut quote = None;
    let mut author = None;

    for field in text.split(field_sep) {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        let (key, value) = field
            .split_once(kv_sep)
            .ok_or_else(|| ParseError::Malformed(format!("field without '{}'", kv_sep)))?;
        let key = key.trim();
        // First occurrence wins
        if key == quote_key && quote.is_none() {
            quote = Some(value.trim());
        } else if key == author_key && author.is_none() {
            author = Some(value.trim());
        }
    }

    let quote = quote
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ParseError::MissingField(quote_key.to_string()))?;
    let author = author.ok_or_else(|| ParseError::MissingField(author_key.to_string()))?;

    Ok(ParsedQuote {
        text: Cow::Borrowed(quote),
        author: Cow::Borrowed(author),
    })
}

/// Replace `dst` with as much of `src` as fits, cutting on a char boundary.
///
/// Returns `true` if `src` was truncated.
pub fn copy_bounded<const N: usize>(dst: &mut heapless::String<N>, src: &str) -> bool {
    dst.clear();
    let mut end = src.len().min(N);
    while !src.is_char_boundary(end) {
        end -= 1;
    }
    // Cannot fail: end <= N and dst is empty
    let _ = dst.push_str(&src[..end]);
    end < src.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== JSON Tests ====================

    #[test]
    fn test_json_object() {
        let body = br#"{"_id":"x","content":"Stay hungry.","author":"Steve Jobs","length":12}"#;
        let parsed = parse_quote(body, &ResponseFormat::json()).unwrap();
        assert_eq!(parsed.text, "Stay hungry.");
        assert_eq!(parsed.author, "Steve Jobs");
    }

    #[test]
    fn test_json_array_uses_first_element() {
        let body = br#"[{"content":"First","author":"A"},{"content":"Second","author":"B"}]"#;
        let parsed = parse_quote(body, &ResponseFormat::json()).unwrap();
        assert_eq!(parsed.text, "First");
        assert_eq!(parsed.author, "A");
    }

    #[test]
    fn test_json_escapes_decoded() {
        let body = r#"{"content":"Say \"hi\" caf\u00e9","author":"Me"}"#;
        let parsed = parse_quote(body.as_bytes(), &ResponseFormat::json()).unwrap();
        assert_eq!(parsed.text, "Say \"hi\" caf\u{e9}");
    }

    #[test]
    fn test_json_missing_author() {
        let body = br#"{"content":"Orphan quote"}"#;
        assert_eq!(
            parse_quote(body, &ResponseFormat::json()),
            Err(ParseError::MissingField("author".into()))
        );
    }

    #[test]
    fn test_json_non_string_field() {
        let body = br#"{"content":42,"author":"Me"}"#;
        assert!(matches!(
            parse_quote(body, &ResponseFormat::json()),
            Err(ParseError::MissingField(_))
        ));
    }

    #[test]
    fn test_json_malformed() {
        assert!(matches!(
            parse_quote(br#"{"content":"#, &ResponseFormat::json()),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            parse_quote(b"[]", &ResponseFormat::json()),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            parse_quote(b"\"just a string\"", &ResponseFormat::json()),
            Err(ParseError::Malformed(_))
        ));
    }

    // ==================== Delimited Tests ====================

    #[test]
    fn test_delimited_basic() {
        let parsed = parse_quote(b"quote=X;author=Y", &ResponseFormat::delimited()).unwrap();
        assert_eq!(parsed.text, "X");
        assert_eq!(parsed.author, "Y");
    }

    #[test]
    fn test_delimited_order_and_whitespace() {
        let body: &[u8] =
            b"author = Seneca ; quote = Luck is what happens when preparation meets opportunity.\n";
        let parsed = parse_quote(body, &ResponseFormat::delimited()).unwrap();
        assert_eq!(parsed.author, "Seneca");
        assert_eq!(
            parsed.text,
            "Luck is what happens when preparation meets opportunity."
        );
    }

    #[test]
    fn test_delimited_value_may_contain_kv_sep() {
        let parsed = parse_quote(b"quote=a=b;author=Y", &ResponseFormat::delimited()).unwrap();
        assert_eq!(parsed.text, "a=b");
    }

    #[test]
    fn test_delimited_unknown_fields_ignored() {
        let parsed =
            parse_quote(b"id=7;quote=X;tags=wisdom;author=Y", &ResponseFormat::delimited())
                .unwrap();
        assert_eq!(parsed.text, "X");
    }

    #[test]
    fn test_delimited_missing_quote() {
        assert_eq!(
            parse_quote(b"author=Y", &ResponseFormat::delimited()),
            Err(ParseError::MissingField("quote".into()))
        );
        assert_eq!(
            parse_quote(b"quote=   ;author=Y", &ResponseFormat::delimited()),
            Err(ParseError::MissingField("quote".into()))
        );
    }

    #[test]
    fn test_delimited_field_without_separator() {
        assert!(matches!(
            parse_quote(b"quote=X;garbage", &ResponseFormat::delimited()),
            Err(ParseError::Malformed(_))
        ));
    }

    // ==================== Common Tests ====================

    #[test]
    fn test_empty_and_whitespace_body() {
        assert_eq!(parse_quote(b"", &ResponseFormat::json()), Err(ParseError::Empty));
        assert_eq!(
            parse_quote(b" \r\n", &ResponseFormat::delimited()),
            Err(ParseError::Empty)
        );
    }

    #[test]
    fn test_invalid_utf8() {
        assert_eq!(
            parse_quote(&[b'q', 0xff, 0xfe], &ResponseFormat::delimited()),
            Err(ParseError::NotUtf8)
        );
    }

    // ==================== Bounded Copy Tests ====================

    #[test]
    fn test_copy_bounded_fits() {
        let mut dst: heapless::String<8> = heapless::String::new();
        assert!(!copy_bounded(&mut dst, "hello"));
        assert_eq!(dst.as_str(), "hello");
    }

    #[test]
    fn test_copy_bounded_exact_capacity() {
        let mut dst: heapless::String<5> = heapless::String::new();
        assert!(!copy_bounded(&mut dst, "hello"));
        assert_eq!(dst.as_str(), "hello");
    }

    #[test]
    fn test_copy_bounded_truncates() {
        let mut dst: heapless::String<4> = heapless::String::new();
        assert!(copy_bounded(&mut dst, "hello"));
        assert_eq!(dst.as_str(), "hell");
    }

    #[test]
    fn test_copy_bounded_respects_char_boundary() {
        // 'é' is two bytes; capacity 2 cannot hold "aé"
        let mut dst: heapless::String<2> = heapless::String::new();
        assert!(copy_bounded(&mut dst, "a\u{e9}"));
        assert_eq!(dst.as_str(), "a");
    }

    #[test]
    fn test_copy_bounded_replaces_previous_content() {
        let mut dst: heapless::String<8> = heapless::String::new();
        copy_bounded(&mut dst, "previous");
        copy_bounded(&mut dst, "new");
        assert_eq!(dst.as_str(), "new");
    }
}
