//! Pulling a JSON object out of free-form model output.
//!
//! Models wrap their answer in prose, markdown fences, or both. We scan for the
//! first `{` whose matching `}` closes a span that decodes as a JSON object,
//! tracking string literals so braces inside values do not confuse the
//! depth count.

use serde_json::{Map, Value};

/// First balanced `{...}` span in `text` that decodes as a JSON object.
///
/// Each candidate `{` is rescanned on its own, so the worst case is quadratic
/// in the number of unclosed braces. Replies are capped at 512 tokens by both
/// providers, which keeps that bounded. An inner object inside an unclosed
/// outer span can still be complete, so the rescan is needed.
pub fn first_json_object(text: &str) -> Option<Map<String, Value>> {
    let mut from = 0;
    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        if let Some(end) = balanced_end(&text[start..]) {
            if let Ok(Value::Object(map)) = serde_json::from_str(&text[start..start + end]) {
                return Some(map);
            }
        }
        from = start + 1;
    }
    None
}

/// Byte length of the brace-balanced span starting at `s[0] == '{'`, or
/// `None` if the text ends before it closes.
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate() {
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
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object() {
        let obj = first_json_object(r#"{"flight_number":"AA101"}"#).unwrap();
        assert_eq!(obj["flight_number"], "AA101");
    }

    #[test]
    fn test_object_inside_prose_and_fences() {
        let reply = "Sure! Here is the data:\n```json\n{\"passenger_name\": \"John Doe\", \"flight_number\": null}\n```\nLet me know.";
        let obj = first_json_object(reply).unwrap();
        assert_eq!(obj["passenger_name"], "John Doe");
        assert!(obj["flight_number"].is_null());
    }

    #[test]
    fn test_nested_object_is_kept_whole() {
        let obj = first_json_object(r#"x {"a": {"b": 1}, "c": 2} y"#).unwrap();
        assert_eq!(obj["a"]["b"], 1);
        assert_eq!(obj["c"], 2);
    }

    #[test]
    fn test_braces_inside_strings() {
        let obj = first_json_object(r#"{"passenger_name": "J} {Doe", "note": "say \"}\""}"#).unwrap();
        assert_eq!(obj["passenger_name"], "J} {Doe");
        assert_eq!(obj["note"], "say \"}\"");
    }

    #[test]
    fn test_first_of_several_objects() {
        let obj = first_json_object(r#"{"n": 1} and then {"n": 2}"#).unwrap();
        assert_eq!(obj["n"], 1);
    }

    #[test]
    fn test_skips_non_json_brace_span() {
        let obj = first_json_object(r#"use {placeholder} then {"n": 3}"#).unwrap();
        assert_eq!(obj["n"], 3);
    }

    #[test]
    fn test_no_object() {
        assert!(first_json_object("booking").is_none());
        assert!(first_json_object("").is_none());
        assert!(first_json_object(r#"["a", "b"]"#).is_none());
    }

    #[test]
    fn test_truncated_object() {
        assert!(first_json_object(r#"{"flight_number": "AA101", "passenger_name": "Jo"#).is_none());
    }

    #[test]
    fn test_stray_closing_brace_before_object() {
        let obj = first_json_object(r#"} oops {"n": 4}"#).unwrap();
        assert_eq!(obj["n"], 4);
    }

    #[test]
    fn test_object_after_many_unclosed_braces() {
        let reply = format!("{} {{\"n\": 5}}", "{ ".repeat(2000));
        let obj = first_json_object(&reply).unwrap();
        assert_eq!(obj["n"], 5);
    }

    #[test]
    fn test_complete_object_inside_unclosed_span() {
        let obj = first_json_object(r#"{"reply": {"n": 6}, "cut"#).unwrap();
        assert_eq!(obj["n"], 6);
    }

    #[test]
    fn test_multibyte_text_around_object() {
        let obj = first_json_object("✈️ voilà {\"destination\": \"Zürich\"} ✅").unwrap();
        assert_eq!(obj["destination"], "Zürich");
    }
}
