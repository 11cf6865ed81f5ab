// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Form field parsing and validation
//!
//! These run on raw text typed into a form (or passed on the command line)
//! right before a payload is built for the REST API. None of them panic and
//! none of them touch the network.

use reqwest::Url;
use serde_json::Value;
use std::collections::BTreeMap;

/// Validation failures surfaced next to the offending field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The text is not a JSON object of string values
    #[error("must be a JSON object whose values are all strings")]
    InvalidStringMap,

    /// A required field was left empty
    #[error("{0} is required")]
    Required(&'static str),
}

/// Reduce a resource reference to its path.
///
/// Absolute `http://` / `https://` URLs lose their scheme, host, port, query
/// and fragment. Anything else is returned trimmed but otherwise verbatim. A
/// malformed absolute URL is returned trimmed rather than rejected.
#[must_use]
pub fn normalize_resource_reference(reference: &str) -> String {
    let trimmed = reference.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return trimmed.to_string();
    }

    match Url::parse(trimmed) {
        Ok(url) => url.path().to_string(),
        Err(err) => {
            tracing::trace!(reference = trimmed, error = %err, "keeping unparsable URL as-is");
            trimmed.to_string()
        }
    }
}

/// Parse a JSON object of string values, e.g. labels or headers.
///
/// Empty or whitespace-only text means "nothing entered" and yields
/// `Ok(None)`; `{}` yields an empty map. Any other shape, or any non-string
/// value, rejects the whole input.
pub fn parse_string_map(text: &str) -> Result<Option<BTreeMap<String, String>>, FieldError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value =
        serde_json::from_str(trimmed).map_err(|_| FieldError::InvalidStringMap)?;
    let Value::Object(object) = value else {
        return Err(FieldError::InvalidStringMap);
    };

    object
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            _ => Err(FieldError::InvalidStringMap),
        })
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map(Some)
}

/// Labels payload; no input means no labels
pub fn parse_labels(text: &str) -> Result<BTreeMap<String, String>, FieldError> {
    Ok(parse_string_map(text)?.unwrap_or_default())
}

/// Convert a header map to the wire shape: one single-entry object per header
#[must_use]
pub fn headers_from_map(map: &BTreeMap<String, String>) -> Vec<BTreeMap<String, String>> {
    map.iter()
        .map(|(name, value)| BTreeMap::from([(name.clone(), value.clone())]))
        .collect()
}

/// Trimmed value of a required text field
pub fn require_text<'a>(field: &'static str, value: &'a str) -> Result<&'a str, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FieldError::Required(field))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_relative_path_unchanged() {
        assert_eq!(normalize_resource_reference("/a/b/1/"), "/a/b/1/");
    }

    #[test]
    fn test_absolute_url_reduced_to_path() {
        assert_eq!(
            normalize_resource_reference("http://host:8080/a/b/1/?x=1"),
            "/a/b/1/"
        );
        assert_eq!(
            normalize_resource_reference("  https://pulp.example.com/pulp/api/v3/tasks/9/#top "),
            "/pulp/api/v3/tasks/9/"
        );
    }

    #[test]
    fn test_empty_reference() {
        assert_eq!(normalize_resource_reference(""), "");
        assert_eq!(normalize_resource_reference("   \t"), "");
    }

    #[test]
    fn test_malformed_url_fails_open() {
        assert_eq!(normalize_resource_reference("https://"), "https://");
        assert_eq!(normalize_resource_reference(" http://[::1 "), "http://[::1");
    }

    #[test]
    fn test_relative_path_not_normalized() {
        assert_eq!(normalize_resource_reference("/a/../b//c/"), "/a/../b//c/");
        assert_eq!(normalize_resource_reference("ftp://host/x"), "ftp://host/x");
    }

    #[test]
    fn test_string_map_empty_input() {
        assert_eq!(parse_string_map(""), Ok(None));
        assert_eq!(parse_string_map("  \n "), Ok(None));
    }

    #[test]
    fn test_string_map_empty_object() {
        assert_eq!(parse_string_map("{}"), Ok(Some(BTreeMap::new())));
    }

    #[test]
    fn test_string_map_valid() {
        let map = parse_string_map(r#"{"env":"dev"}"#).unwrap().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["env"], "dev");
    }

    #[test]
    fn test_string_map_rejections() {
        for input in ["{", "[]", r#"{"k":1}"#, "null", "\"text\"", "42", r#"{"a":"b","c":null}"#] {
            assert_eq!(
                parse_string_map(input),
                Err(FieldError::InvalidStringMap),
                "input {input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_string_map_error_message() {
        assert_eq!(
            FieldError::InvalidStringMap.to_string(),
            "must be a JSON object whose values are all strings"
        );
    }

    #[test]
    fn test_parse_labels() {
        assert!(parse_labels("").unwrap().is_empty());
        assert_eq!(parse_labels(r#"{"tier":"gold"}"#).unwrap()["tier"], "gold");
        assert!(parse_labels("[1]").is_err());
    }

    #[test]
    fn test_headers_from_map() {
        let map = BTreeMap::from([
            ("Authorization".to_string(), "Bearer x".to_string()),
            ("X-Env".to_string(), "dev".to_string()),
        ]);
        let headers = headers_from_map(&map);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0]["Authorization"], "Bearer x");
        assert_eq!(headers[1].len(), 1);
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("name", "  repo "), Ok("repo"));
        assert_eq!(require_text("name", "  "), Err(FieldError::Required("name")));
        assert_eq!(FieldError::Required("name").to_string(), "name is required");
    }

    proptest! {
        #[test]
        fn prop_relative_paths_are_verbatim(path in "/[a-zA-Z0-9._/-]{0,40}") {
            prop_assert_eq!(normalize_resource_reference(&path), path);
        }

        #[test]
        fn prop_string_values_always_accepted(
            map in proptest::collection::btree_map("[a-z]{1,8}", "[ -~]{0,12}", 0..6)
        ) {
            let text = serde_json::to_string(&map).unwrap();
            prop_assert_eq!(parse_string_map(&text), Ok(Some(map)));
        }
    }
}
