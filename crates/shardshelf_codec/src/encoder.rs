//! Canonical key encoder.

use crate::key::Key;
use crate::TAG_SEPARATOR;
use std::fmt::Write;

/// Kind tags, one character each, appended after [`TAG_SEPARATOR`].
pub(crate) const TAG_TEXT: char = 's';
pub(crate) const TAG_INT: char = 'i';
pub(crate) const TAG_BOOL: char = 'b';
pub(crate) const TAG_FLOAT: char = 'f';
pub(crate) const TAG_TUPLE: char = 't';
pub(crate) const TAG_SET: char = 'e';
pub(crate) const TAG_MAP: char = 'm';

/// Encodes a key to its canonical string form.
///
/// The result is deterministic and is the exact text used (after byte
/// encoding) as the physical store's key. The layout is
/// `payload + separator + tag`: a text key's payload is its raw text, so
/// string `"1"` encodes as `1<US>s` and integer `1` as `1<US>i` - distinct
/// keys that sort adjacent.
#[must_use]
pub fn encode_key(key: &Key) -> String {
    let mut out = String::new();
    write_payload(&mut out, key);
    out.push(TAG_SEPARATOR);
    out.push(tag_of(key));
    out
}

pub(crate) fn tag_of(key: &Key) -> char {
    match key {
        Key::Text(_) => TAG_TEXT,
        Key::Int(_) => TAG_INT,
        Key::Bool(_) => TAG_BOOL,
        Key::Float(_) => TAG_FLOAT,
        Key::Tuple(_) => TAG_TUPLE,
        Key::Set(_) => TAG_SET,
        Key::Map(_) => TAG_MAP,
    }
}

/// Writes the top-level payload. Text is raw here (the tag already
/// disambiguates it); everything else renders the same as when nested.
fn write_payload(out: &mut String, key: &Key) {
    match key {
        Key::Text(s) => out.push_str(s),
        other => write_nested(out, other),
    }
}

/// Writes the self-describing nested form used inside composites.
/// Strings are quoted and escaped so that separators and brackets in
/// their text cannot confuse the parser.
pub(crate) fn write_nested(out: &mut String, key: &Key) {
    match key {
        Key::Text(s) => write_quoted(out, s),
        Key::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Key::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Key::Float(f) => write_float(out, *f),
        Key::Tuple(elements) => {
            out.push('(');
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_nested(out, element);
            }
            if elements.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        Key::Set(members) => {
            if members.is_empty() {
                // "{}" is the empty map; the empty set gets its own
                // spelling, as in Python's repr.
                out.push_str("set()");
            } else {
                out.push('{');
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_nested(out, member);
                }
                out.push('}');
            }
        }
        Key::Map(pairs) => {
            out.push('{');
            for (i, (k, v)) in pairs.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_nested(out, k);
                out.push_str(": ");
                write_nested(out, v);
            }
            out.push('}');
        }
    }
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            other => out.push(other),
        }
    }
    out.push('\'');
}

/// Formats a float so it can never be mistaken for an integer: finite
/// values without a fractional point get one appended.
fn write_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("NaN");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "inf" } else { "-inf" });
    } else {
        let text = format!("{f}");
        out.push_str(&text);
        if !text.contains('.') && !text.contains('e') && !text.contains('E') {
            out.push_str(".0");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(key: &Key) -> String {
        let encoded = encode_key(key);
        encoded[..encoded.len() - 2].to_string()
    }

    #[test]
    fn scalar_payloads() {
        assert_eq!(payload(&Key::from("abc")), "abc");
        assert_eq!(payload(&Key::from(42)), "42");
        assert_eq!(payload(&Key::from(-7)), "-7");
        assert_eq!(payload(&Key::from(true)), "true");
        assert_eq!(payload(&Key::from(3.4)), "3.4");
    }

    #[test]
    fn float_payload_never_looks_like_an_int() {
        assert_eq!(payload(&Key::from(1.0)), "1.0");
        assert_eq!(payload(&Key::from(-2.0)), "-2.0");
        assert_eq!(payload(&Key::from(f64::NAN)), "NaN");
        assert_eq!(payload(&Key::from(f64::INFINITY)), "inf");
        assert_eq!(payload(&Key::from(f64::NEG_INFINITY)), "-inf");
    }

    #[test]
    fn tuple_payloads() {
        let t = Key::tuple(vec![Key::from(3), Key::from("a")]);
        assert_eq!(payload(&t), "(3, 'a')");

        let single = Key::tuple(vec![Key::from(1)]);
        assert_eq!(payload(&single), "(1,)");

        let empty = Key::tuple(vec![]);
        assert_eq!(payload(&empty), "()");
    }

    #[test]
    fn set_and_map_payloads() {
        let s = Key::set(vec![Key::from(2), Key::from(1)]);
        assert_eq!(payload(&s), "{1, 2}");
        assert_eq!(payload(&Key::set(vec![])), "set()");

        let m = Key::map(vec![(Key::from(1), Key::from("a")), (Key::from("b"), Key::from(2))]);
        assert_eq!(payload(&m), "{1: 'a', 'b': 2}");
        assert_eq!(payload(&Key::map(vec![])), "{}");
    }

    #[test]
    fn nested_strings_are_escaped() {
        let t = Key::tuple(vec![Key::from("it's"), Key::from("a\\b")]);
        assert_eq!(payload(&t), r"('it\'s', 'a\\b')");
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = Key::set(vec![Key::from("x"), Key::from(1), Key::from(true)]);
        let b = Key::set(vec![Key::from(true), Key::from("x"), Key::from(1)]);
        assert_eq!(encode_key(&a), encode_key(&b));
    }

    #[test]
    fn tag_is_last_character() {
        let encoded = encode_key(&Key::from("x"));
        let chars: Vec<char> = encoded.chars().collect();
        assert_eq!(chars[chars.len() - 2], crate::TAG_SEPARATOR);
        assert_eq!(chars[chars.len() - 1], TAG_TEXT);
    }
}
