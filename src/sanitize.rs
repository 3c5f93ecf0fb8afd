//! ASCII sanitization for generated question text. Model output arrives
//! with smart quotes, math glyphs and the occasional stray Devanagari
//! word; downstream consumers want plain ASCII.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex"))
}

/// ASCII spelling for common non-ASCII punctuation and symbols.
fn ascii_replacement(c: char) -> Option<&'static str> {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => Some("'"),
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => Some("\""),
        '\u{2013}' | '\u{2014}' | '\u{2015}' | '\u{2212}' => Some("-"),
        '\u{2026}' => Some("..."),
        '\u{00D7}' => Some("x"),
        '\u{00F7}' => Some("/"),
        '\u{2264}' => Some("<="),
        '\u{2265}' => Some(">="),
        '\u{2260}' => Some("!="),
        '\u{2248}' => Some("~"),
        '\u{00B1}' => Some("+/-"),
        '\u{2192}' => Some("->"),
        '\u{2190}' => Some("<-"),
        '\u{00B0}' => Some(" degrees"),
        '\u{00B5}' | '\u{03BC}' => Some("u"),
        '\u{2022}' | '\u{00B7}' => Some("-"),
        '\u{00B2}' => Some("^2"),
        '\u{00B3}' => Some("^3"),
        '\u{00BD}' => Some("1/2"),
        '\u{00BC}' => Some("1/4"),
        '\u{00BE}' => Some("3/4"),
        _ => None,
    }
}

/// Reduce a string to plain ASCII: known symbols get a spelled-out
/// replacement, anything else non-ASCII becomes a space, and whitespace
/// runs collapse to single spaces. Applying it twice changes nothing.
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else if let Some(replacement) = ascii_replacement(c) {
            out.push_str(replacement);
        } else {
            out.push(' ');
        }
    }

    whitespace_re().replace_all(&out, " ").trim().to_string()
}

/// Sanitize every string inside a JSON tree in place. Object keys are
/// left alone; they are wire contract, not model output.
pub fn sanitize_value(value: &mut Value) {
    match value {
        Value::String(s) => *s = sanitize_text(s),
        Value::Array(items) => {
            for item in items {
                sanitize_value(item);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                sanitize_value(item);
            }
        }
        _ => {}
    }
}
