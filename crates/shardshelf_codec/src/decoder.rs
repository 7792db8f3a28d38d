//! Canonical key decoder.

use crate::encoder::{TAG_BOOL, TAG_FLOAT, TAG_INT, TAG_MAP, TAG_SET, TAG_TEXT, TAG_TUPLE};
use crate::encoding::KeyEncoding;
use crate::error::{CodecError, CodecResult};
use crate::key::Key;
use crate::TAG_SEPARATOR;

/// Decodes a raw physical key into a [`Key`].
///
/// The bytes are decoded to text with the configured encoding, then
/// parsed as a tagged canonical form. Text that does not parse - no tag,
/// unknown tag, malformed payload - is returned unchanged as a plain
/// string key. That fallback is how keys written by other tools stay
/// readable, and it means this function never fails.
#[must_use]
pub fn decode_key(raw: &[u8], encoding: KeyEncoding) -> Key {
    let text = encoding.decode(raw);
    match decode_text(&text) {
        Ok(key) => key,
        Err(_) => Key::Text(text),
    }
}

/// Decodes canonical key text, surfacing parse failures.
///
/// Most callers want [`decode_key`], which falls back to a plain string
/// key instead of erroring.
///
/// # Errors
///
/// Returns [`CodecError::MissingTag`], [`CodecError::UnknownTag`], or
/// [`CodecError::MalformedKeyText`] when the text is not a well-formed
/// tagged encoding.
pub fn decode_text(text: &str) -> CodecResult<Key> {
    let mut chars = text.char_indices();
    let Some((_, tag)) = chars.next_back() else {
        return Err(CodecError::MissingTag);
    };
    let Some((sep_pos, sep)) = chars.next_back() else {
        return Err(CodecError::MissingTag);
    };
    if sep != TAG_SEPARATOR {
        return Err(CodecError::MissingTag);
    }
    let payload = &text[..sep_pos];

    match tag {
        TAG_TEXT => Ok(Key::Text(payload.to_string())),
        TAG_INT => payload
            .parse::<i64>()
            .map(Key::Int)
            .map_err(|e| CodecError::malformed(format!("bad integer payload: {e}"))),
        TAG_BOOL => match payload {
            "true" => Ok(Key::Bool(true)),
            "false" => Ok(Key::Bool(false)),
            other => Err(CodecError::malformed(format!("bad boolean payload: {other:?}"))),
        },
        TAG_FLOAT => payload
            .parse::<f64>()
            .map(Key::Float)
            .map_err(|e| CodecError::malformed(format!("bad float payload: {e}"))),
        TAG_TUPLE | TAG_SET | TAG_MAP => {
            let value = Parser::new(payload).parse_complete()?;
            match (tag, &value) {
                (TAG_TUPLE, Key::Tuple(_)) | (TAG_SET, Key::Set(_)) | (TAG_MAP, Key::Map(_)) => {
                    Ok(value)
                }
                _ => Err(CodecError::malformed(format!(
                    "payload kind does not match tag {tag:?}"
                ))),
            }
        }
        other => Err(CodecError::UnknownTag { tag: other }),
    }
}

/// Recursive-descent parser for the nested literal grammar used inside
/// composite payloads: quoted strings, numbers, booleans, tuples, sets,
/// and maps.
struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            source,
        }
    }

    /// Parses one value and requires the whole input to be consumed.
    fn parse_complete(mut self) -> CodecResult<Key> {
        let value = self.parse_value()?;
        self.skip_ws();
        if self.pos < self.chars.len() {
            return Err(CodecError::malformed(format!(
                "trailing characters after literal in {:?}",
                self.source
            )));
        }
        Ok(value)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> CodecResult<char> {
        let ch = self.peek().ok_or_else(|| {
            CodecError::malformed(format!("unexpected end of literal in {:?}", self.source))
        })?;
        self.pos += 1;
        Ok(ch)
    }

    fn expect(&mut self, expected: char) -> CodecResult<()> {
        let got = self.bump()?;
        if got != expected {
            return Err(CodecError::malformed(format!(
                "expected {expected:?}, found {got:?} at position {}",
                self.pos - 1
            )));
        }
        Ok(())
    }

    fn expect_word(&mut self, word: &str) -> CodecResult<()> {
        for expected in word.chars() {
            self.expect(expected)?;
        }
        Ok(())
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self) -> CodecResult<Key> {
        self.skip_ws();
        match self.peek() {
            Some('\'') => self.parse_string(),
            Some('(') => self.parse_tuple(),
            Some('{') => self.parse_braced(),
            Some('s') => {
                self.expect_word("set()")?;
                Ok(Key::set(vec![]))
            }
            Some('t') => {
                self.expect_word("true")?;
                Ok(Key::Bool(true))
            }
            Some('f') => {
                self.expect_word("false")?;
                Ok(Key::Bool(false))
            }
            Some('N') => {
                self.expect_word("NaN")?;
                Ok(Key::Float(f64::NAN))
            }
            Some('i') => {
                self.expect_word("inf")?;
                Ok(Key::Float(f64::INFINITY))
            }
            Some('-') if self.chars.get(self.pos + 1) == Some(&'i') => {
                self.expect_word("-inf")?;
                Ok(Key::Float(f64::NEG_INFINITY))
            }
            Some(ch) if ch == '-' || ch == '+' || ch == '.' || ch.is_ascii_digit() => {
                self.parse_number()
            }
            Some(other) => Err(CodecError::malformed(format!(
                "unexpected character {other:?} at position {}",
                self.pos
            ))),
            None => Err(CodecError::malformed(format!(
                "unexpected end of literal in {:?}",
                self.source
            ))),
        }
    }

    fn parse_string(&mut self) -> CodecResult<Key> {
        self.expect('\'')?;
        let mut out = String::new();
        loop {
            match self.bump()? {
                '\'' => return Ok(Key::Text(out)),
                '\\' => match self.bump()? {
                    '\\' => out.push('\\'),
                    '\'' => out.push('\''),
                    other => {
                        return Err(CodecError::malformed(format!(
                            "unknown escape {other:?} in string literal"
                        )));
                    }
                },
                other => out.push(other),
            }
        }
    }

    fn parse_number(&mut self) -> CodecResult<Key> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some('0'..='9') | Some('-') | Some('+') | Some('.') | Some('e') | Some('E')
        ) {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if text.contains('.') || text.contains('e') || text.contains('E') {
            text.parse::<f64>()
                .map(Key::Float)
                .map_err(|e| CodecError::malformed(format!("bad float literal {text:?}: {e}")))
        } else {
            text.parse::<i64>()
                .map(Key::Int)
                .map_err(|e| CodecError::malformed(format!("bad integer literal {text:?}: {e}")))
        }
    }

    fn parse_tuple(&mut self) -> CodecResult<Key> {
        self.expect('(')?;
        let mut elements = Vec::new();
        self.skip_ws();
        if self.peek() == Some(')') {
            self.pos += 1;
            return Ok(Key::Tuple(elements));
        }
        loop {
            elements.push(self.parse_value()?);
            self.skip_ws();
            match self.bump()? {
                ',' => {
                    self.skip_ws();
                    // Trailing comma, as in the one-element form "(1,)".
                    if self.peek() == Some(')') {
                        self.pos += 1;
                        return Ok(Key::Tuple(elements));
                    }
                }
                ')' => return Ok(Key::Tuple(elements)),
                other => {
                    return Err(CodecError::malformed(format!(
                        "expected ',' or ')' in tuple, found {other:?}"
                    )));
                }
            }
        }
    }

    /// Parses `{...}`: a map when the first element is followed by a
    /// colon, a set otherwise. Bare `{}` is the empty map; the empty set
    /// is spelled `set()`.
    fn parse_braced(&mut self) -> CodecResult<Key> {
        self.expect('{')?;
        self.skip_ws();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(Key::map(vec![]));
        }

        let first = self.parse_value()?;
        self.skip_ws();
        if self.peek() == Some(':') {
            self.pos += 1;
            let first_value = self.parse_value()?;
            let mut pairs = vec![(first, first_value)];
            loop {
                self.skip_ws();
                match self.bump()? {
                    '}' => return Ok(Key::map(pairs)),
                    ',' => {
                        let k = self.parse_value()?;
                        self.skip_ws();
                        self.expect(':')?;
                        let v = self.parse_value()?;
                        pairs.push((k, v));
                    }
                    other => {
                        return Err(CodecError::malformed(format!(
                            "expected ',' or '}}' in map, found {other:?}"
                        )));
                    }
                }
            }
        }

        let mut members = vec![first];
        loop {
            self.skip_ws();
            match self.bump()? {
                '}' => return Ok(Key::set(members)),
                ',' => members.push(self.parse_value()?),
                other => {
                    return Err(CodecError::malformed(format!(
                        "expected ',' or '}}' in set, found {other:?}"
                    )));
                }
            }
        }
    }
}
