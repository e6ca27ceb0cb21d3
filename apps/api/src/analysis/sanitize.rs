//! Defensive post-processing for LLM JSON: the model's output is never
//! trusted to respect ranges or lengths.

use std::collections::HashSet;

use serde_json::Value;

pub const MAX_LIST_ITEMS: usize = 10;
pub const MAX_ITEM_CHARS: usize = 200;
pub const MAX_SUMMARY_CHARS: usize = 600;

/// Coerces a number or numeric string (optionally suffixed with `%`) into
/// 0–100. Anything unusable becomes 0.
pub fn clamp_score(value: &Value) -> u8 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0).round() as u8,
        _ => 0,
    }
}

/// Truncates to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// Keeps string-ish items, trims, drops empties and case-insensitive
/// duplicates, then caps item count and item length.
pub fn clean_list(items: &[Value], max_items: usize, max_chars: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .map(|s| truncate_chars(&s, max_chars))
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .take(max_items)
        .collect()
}

/// `clean_list` with the default caps, for a field that may be missing or not an array.
pub fn list_field(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => clean_list(items, MAX_LIST_ITEMS, MAX_ITEM_CHARS),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clamp_score_numbers() {
        assert_eq!(clamp_score(&json!(72)), 72);
        assert_eq!(clamp_score(&json!(72.6)), 73);
        assert_eq!(clamp_score(&json!(140)), 100);
        assert_eq!(clamp_score(&json!(-5)), 0);
    }

    #[test]
    fn test_clamp_score_strings() {
        assert_eq!(clamp_score(&json!("85")), 85);
        assert_eq!(clamp_score(&json!(" 64 % ")), 64);
        assert_eq!(clamp_score(&json!("high")), 0);
    }

    #[test]
    fn test_clamp_score_missing_or_wrong_type() {
        assert_eq!(clamp_score(&Value::Null), 0);
        assert_eq!(clamp_score(&json!([90])), 0);
        assert_eq!(clamp_score(&json!(true)), 0);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 50), "short");
        assert_eq!(truncate_chars("  padded  ", 50), "padded");
    }

    #[test]
    fn test_clean_list_dedups_and_caps() {
        let items: Vec<Value> = (0..15)
            .map(|i| json!(format!("item {i}")))
            .chain([json!("ITEM 0"), json!(""), json!(null), json!(42)])
            .collect();
        let cleaned = clean_list(&items, 10, 200);
        assert_eq!(cleaned.len(), 10);
        assert_eq!(cleaned[0], "item 0");
        assert!(!cleaned.iter().any(|s| s == "ITEM 0"));
    }

    #[test]
    fn test_clean_list_truncates_items() {
        let long = "x".repeat(500);
        let cleaned = clean_list(&[json!(long)], 10, MAX_ITEM_CHARS);
        assert_eq!(cleaned[0].chars().count(), MAX_ITEM_CHARS);
    }

    #[test]
    fn test_list_field_non_array_is_empty() {
        assert!(list_field(&json!("rust")).is_empty());
        assert!(list_field(&Value::Null).is_empty());
    }
}
