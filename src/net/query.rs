//! Query string decoding for intercepted internal links.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

/// Flat key/value view of a query string. Valueless keys carry the literal
/// `"true"`, matching the flag convention of the content site's links.
pub type QueryDict = HashMap<String, String>;

/// Decode a raw query string, with or without its leading `?`.
///
/// Form-encoding conventions apply: values are percent-decoded and `+`
/// becomes a space. A later occurrence of a key overwrites an earlier one.
/// A value that fails to decode aborts the parse: the error is logged and
/// whatever was decoded before the bad segment is returned.
pub fn parse_query_string(query_string: &str) -> QueryDict {
    let mut dictionary = HashMap::new();
    let raw = query_string.strip_prefix('?').unwrap_or(query_string);

    for part in raw.split('&') {
        let (key, value) = match part.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (part, None),
        };
        if key.is_empty() {
            continue;
        }
        match value {
            Some(encoded) => match percent_decode_str(encoded).decode_utf8() {
                Ok(decoded) => {
                    dictionary.insert(key.to_string(), decoded.replace('+', " "));
                }
                Err(err) => {
                    log::warn!("undecodable query segment {:?}: {}", part, err);
                    return dictionary;
                }
            },
            None => {
                dictionary.insert(key.to_string(), "true".to_string());
            }
        }
    }
    dictionary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_key_value_pairs() {
        let dict = parse_query_string("a=1&b=2");
        assert_eq!(dict.get("a").map(String::as_str), Some("1"));
        assert_eq!(dict.get("b").map(String::as_str), Some("2"));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn leading_question_mark_is_stripped() {
        let dict = parse_query_string("?a=1");
        assert_eq!(dict.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn valueless_key_becomes_true_flag() {
        let dict = parse_query_string("flag");
        assert_eq!(dict.get("flag").map(String::as_str), Some("true"));
    }

    #[test]
    fn percent_and_plus_decode_to_spaces() {
        let dict = parse_query_string("x=a+b%20c");
        assert_eq!(dict.get("x").map(String::as_str), Some("a b c"));
    }

    #[test]
    fn empty_inputs_yield_empty_dict() {
        assert!(parse_query_string("").is_empty());
        assert!(parse_query_string("?").is_empty());
    }

    #[test]
    fn empty_keys_are_skipped() {
        let dict = parse_query_string("&=orphan&a=1");
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let dict = parse_query_string("k=1&k=2");
        assert_eq!(dict.get("k").map(String::as_str), Some("2"));
    }

    #[test]
    fn bad_escape_returns_partial_dict() {
        // %FF is not valid UTF-8, so the parse stops there.
        let dict = parse_query_string("ok=1&bad=%FF&later=2");
        assert_eq!(dict.get("ok").map(String::as_str), Some("1"));
        assert!(dict.get("bad").is_none());
        assert!(dict.get("later").is_none());
    }
}
