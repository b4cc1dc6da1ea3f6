// Text sanitization: two independent cleaning passes over model output.
//
// `clean_for_prompt` makes text safe to feed back into a generation prompt;
// `clean_for_display` normalizes math glyphs and bounds length for rendering.
// Both are pure, idempotent, and safe on empty input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Everything outside this set is replaced with a space by the display pass.
static DISPLAY_DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^a-zA-Z0-9.,:;!?()'"*/^~+=% _-]+"#).unwrap());

static SLUG_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9_-]+").unwrap());

/// Maximum display length before the `...` marker is appended.
pub const DISPLAY_MAX_CHARS: usize = 250;

/// Coerce any JSON value to a plain string: arrays are space-joined after
/// recursive coercion, objects serialize to compact JSON, null becomes empty.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(coerce_text)
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(_) => value.to_string(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
    }
}

/// Normalize special math and formatting symbols for model safety.
///
/// Maps a fixed set of visual glyphs to ASCII-safe equivalents, drops any
/// remaining non-ASCII character, and collapses whitespace.
pub fn clean_for_prompt(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{00B7}' => out.push('*'),             // middle dot
            '\u{00D7}' | '\u{2715}' => out.push('x'), // multiplication signs
            '\u{201C}' | '\u{201D}' => out.push('"'), // smart double quotes
            '\u{2018}' | '\u{2019}' => out.push('\''), // smart single quotes
            '\u{2013}' | '\u{2014}' => out.push('-'), // en/em dash
            '\u{2022}' => out.push('-'),             // bullet
            _ => out.push(c),
        }
    }

    let ascii: String = out.chars().filter(|c| c.is_ascii()).collect();
    WHITESPACE.replace_all(ascii.trim(), " ").to_string()
}

/// Clean and normalize explanation text for visual rendering.
///
/// Decodes HTML entities, maps mathematical glyphs to plain ASCII, strips
/// anything outside the display whitelist, collapses whitespace, and
/// truncates to `DISPLAY_MAX_CHARS` with a trailing `...`.
pub fn clean_for_display(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let decoded = html_escape::decode_html_entities(text);

    let mut out = String::with_capacity(decoded.len());
    for c in decoded.chars() {
        match c {
            '\u{00B2}' => out.push_str("^2"),
            '\u{00B3}' => out.push_str("^3"),
            '\u{00B7}' | '\u{00D7}' => out.push('*'),
            '\u{00F7}' => out.push('/'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{221A}' => out.push_str("sqrt"),
            '\u{03C0}' => out.push_str("pi"),
            '\u{03B8}' => out.push_str("theta"),
            '\u{00B0}' => out.push_str(" degrees"),
            '\u{00B1}' => out.push_str("+/-"),
            '\u{2248}' => out.push('~'),
            _ => out.push(c),
        }
    }

    let stripped = DISPLAY_DISALLOWED.replace_all(&out, " ");
    let collapsed = WHITESPACE.replace_all(stripped.trim(), " ").to_string();

    if collapsed.chars().count() > DISPLAY_MAX_CHARS {
        let truncated: String = collapsed.chars().take(DISPLAY_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        collapsed
    }
}

/// Reduce a free-text value to a filesystem-safe slug.
pub fn sanitize_slug(value: &str, fallback: &str) -> String {
    let replaced = SLUG_DISALLOWED.replace_all(value, "-");
    let trimmed = replaced.trim_matches('-');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_text_variants() {
        assert_eq!(coerce_text(&json!("plain")), "plain");
        assert_eq!(coerce_text(&json!(["a", "b", ["c"]])), "a b c");
        assert_eq!(coerce_text(&json!({"k":"v"})), r#"{"k":"v"}"#);
        assert_eq!(coerce_text(&json!(null)), "");
        assert_eq!(coerce_text(&json!(3.5)), "3.5");
    }

    #[test]
    fn test_clean_for_prompt_maps_glyphs() {
        assert_eq!(clean_for_prompt("a\u{00B7}b"), "a*b");
        assert_eq!(clean_for_prompt("2 \u{00D7} 3"), "2 x 3");
        assert_eq!(
            clean_for_prompt("\u{201C}quoted\u{201D} \u{2013} dashed \u{2022} item"),
            "\"quoted\" - dashed - item"
        );
    }

    #[test]
    fn test_clean_for_prompt_drops_non_ascii_and_collapses() {
        assert_eq!(clean_for_prompt("caf\u{00E9}   au  lait"), "caf au lait");
        assert_eq!(clean_for_prompt(""), "");
        assert_eq!(clean_for_prompt("   "), "");
    }

    #[test]
    fn test_clean_for_prompt_preserves_letter_x() {
        // Words containing x/X must survive untouched.
        assert_eq!(clean_for_prompt("box"), "box");
        assert_eq!(clean_for_prompt("X-ray boX"), "X-ray boX");
    }

    #[test]
    fn test_clean_for_prompt_idempotent() {
        let samples = [
            "V = \u{03C0}r\u{00B2}h \u{2013} cylinder",
            "\u{201C}bottle\u{201D} \u{00B7} 2\u{00D7}",
            "plain ascii already",
        ];
        for s in samples {
            let once = clean_for_prompt(s);
            assert_eq!(clean_for_prompt(&once), once);
        }
    }

    #[test]
    fn test_clean_for_display_scenario() {
        assert_eq!(
            clean_for_display("Area = \u{03C0}\u{00B7}r\u{00B2} (\u{00B1}5%)"),
            "Area = pi*r^2 (+/-5%)"
        );
    }

    #[test]
    fn test_clean_for_display_decodes_entities_and_maps() {
        assert_eq!(clean_for_display("a &amp; b"), "a b");
        assert_eq!(clean_for_display("90\u{00B0} \u{2248} right"), "90 degrees ~ right");
        assert_eq!(clean_for_display("\u{221A}x \u{00F7} 2"), "sqrtx / 2");
    }

    #[test]
    fn test_clean_for_display_truncates_and_bounds() {
        let long = "a".repeat(600);
        let cleaned = clean_for_display(&long);
        assert_eq!(cleaned.chars().count(), DISPLAY_MAX_CHARS + 3);
        assert!(cleaned.ends_with("..."));

        // Never longer than 253 and never outside the whitelist.
        for c in cleaned.chars() {
            assert!(c.is_ascii_alphanumeric() || ".,:;!?()'\"*/^~+=% _-".contains(c));
        }
    }

    #[test]
    fn test_clean_for_display_idempotent() {
        let samples = [
            "Area = \u{03C0}\u{00B7}r\u{00B2} (\u{00B1}5%)",
            "&lt;tag&gt; 3\u{00B3} \u{03B8}",
            &"x = 1; ".repeat(80),
        ];
        for s in samples {
            let once = clean_for_display(s);
            assert_eq!(clean_for_display(&once), once);
        }
    }

    #[test]
    fn test_clean_for_display_empty() {
        assert_eq!(clean_for_display(""), "");
    }

    #[test]
    fn test_sanitize_slug() {
        assert_eq!(sanitize_slug("Water Bottle!", "object"), "Water-Bottle");
        assert_eq!(sanitize_slug("///", "object"), "object");
        assert_eq!(sanitize_slug("", "object"), "object");
        assert_eq!(sanitize_slug("cup_01", "object"), "cup_01");
    }
}
