//! Dynamic key value type.

use crate::encoder::encode_key;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A shelf key.
///
/// Keys are drawn from a fixed closed set of literal-representable kinds.
/// Two keys are equal iff their canonical string encodings are equal, and
/// all ordering/hashing goes through that encoding, so heterogeneous kinds
/// interleave by their textual form (integer `2` sorts next to string
/// `"2"`).
///
/// Float keys compare by encoded text, which makes `NaN` equal to itself;
/// that is deliberate, a key must be able to find itself again.
///
/// Set- and map-valued keys are canonicalized on construction (see
/// [`Key::set`] and [`Key::map`]); building them through the enum variants
/// directly skips that normalization and is discouraged.
#[derive(Debug, Clone)]
pub enum Key {
    /// Text string.
    Text(String),
    /// Signed integer.
    Int(i64),
    /// Boolean.
    Bool(bool),
    /// Floating point number.
    Float(f64),
    /// Tuple of keys, order-preserving.
    Tuple(Vec<Key>),
    /// Set of keys, held sorted by canonical encoding.
    Set(Vec<Key>),
    /// Map of key pairs, held sorted by the canonical encoding of the
    /// first element.
    Map(Vec<(Key, Key)>),
}

impl Key {
    /// Creates a tuple key.
    #[must_use]
    pub fn tuple(elements: Vec<Key>) -> Self {
        Key::Tuple(elements)
    }

    /// Creates a set key.
    ///
    /// Elements are sorted by their canonical encoding and duplicates
    /// (by encoding) are dropped, so two sets with the same members
    /// always encode identically regardless of construction order. This
    /// is the resolution of the original design's "risky" set-key
    /// caveat: the risk was encode-order nondeterminism, and canonical
    /// sorting removes it.
    #[must_use]
    pub fn set(mut elements: Vec<Key>) -> Self {
        elements.sort_by(Key::cmp_canonical);
        elements.dedup_by(|a, b| a.cmp_canonical(b) == Ordering::Equal);
        Key::Set(elements)
    }

    /// Creates a map key.
    ///
    /// Pairs are sorted by the canonical encoding of their first element;
    /// on duplicate first elements the later pair wins, matching
    /// insertion-order overwrite semantics.
    #[must_use]
    pub fn map(pairs: Vec<(Key, Key)>) -> Self {
        let mut deduped: Vec<(Key, Key)> = Vec::with_capacity(pairs.len());
        for (k, v) in pairs {
            if let Some(slot) = deduped
                .iter_mut()
                .find(|(existing, _)| existing.cmp_canonical(&k) == Ordering::Equal)
            {
                slot.1 = v;
            } else {
                deduped.push((k, v));
            }
        }
        deduped.sort_by(|a, b| a.0.cmp_canonical(&b.0));
        Key::Map(deduped)
    }

    /// Compares two keys by their canonical encoded form.
    ///
    /// This is the sort order used by `keys_sorted()`: plain
    /// lexicographic comparison of encoded strings, which groups kinds
    /// that share a textual form.
    #[must_use]
    pub fn cmp_canonical(&self, other: &Self) -> Ordering {
        encode_key(self).cmp(&encode_key(other))
    }

    /// Returns this key as a string slice, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Key::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns this key as an integer, if it is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns this key as a boolean, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Key::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns this key as a float, if it is one.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Key::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_canonical(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        encode_key(self).hash(state);
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_canonical(other)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(i64::from(n))
    }
}

impl From<u32> for Key {
    fn from(n: u32) -> Self {
        Key::Int(i64::from(n))
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl From<f64> for Key {
    fn from(f: f64) -> Self {
        Key::Float(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_members_are_sorted_and_deduped() {
        let a = Key::set(vec![Key::from(3), Key::from(1), Key::from(2), Key::from(1)]);
        let b = Key::set(vec![Key::from(2), Key::from(1), Key::from(3)]);
        assert_eq!(a, b);

        if let Key::Set(members) = &a {
            assert_eq!(members.len(), 3);
        } else {
            panic!("expected Set");
        }
    }

    #[test]
    fn map_pairs_are_sorted_and_last_wins() {
        let m = Key::map(vec![
            (Key::from("b"), Key::from(1)),
            (Key::from("a"), Key::from(2)),
            (Key::from("b"), Key::from(3)),
        ]);

        if let Key::Map(pairs) = &m {
            assert_eq!(pairs.len(), 2);
            assert_eq!(pairs[0], (Key::from("a"), Key::from(2)));
            assert_eq!(pairs[1], (Key::from("b"), Key::from(3)));
        } else {
            panic!("expected Map");
        }
    }

    #[test]
    fn kinds_with_same_text_are_unequal() {
        assert_ne!(Key::from(1), Key::from("1"));
        assert_ne!(Key::from(true), Key::from("true"));
    }

    #[test]
    fn nan_equals_itself() {
        assert_eq!(Key::from(f64::NAN), Key::from(f64::NAN));
    }

    #[test]
    fn canonical_order_interleaves_kinds() {
        let mut keys = vec![Key::from(10), Key::from("2"), Key::from(2), Key::from("10")];
        keys.sort();
        // "10..." forms sort before "2..." forms; within a payload the
        // int tag ('i') precedes the string tag ('s').
        assert_eq!(
            keys,
            vec![Key::from(10), Key::from("10"), Key::from(2), Key::from("2")]
        );
    }
}
