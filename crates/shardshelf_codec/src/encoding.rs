//! Byte-level text encodings for physical keys.

use crate::error::{CodecError, CodecResult};

/// The text encoding applied between canonical key strings and the raw
/// byte keys of the physical store.
///
/// [`KeyEncoding::Utf8`] is the default. [`KeyEncoding::Latin1`] maps
/// every byte to the code point of the same value, so any byte sequence
/// decodes cleanly - the 8-bit-clean option for stores whose existing
/// keys are not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEncoding {
    /// UTF-8. Invalid sequences decode lossily (replacement character).
    #[default]
    Utf8,
    /// ISO-8859-1: one byte per code point, 8-bit clean.
    Latin1,
}

impl KeyEncoding {
    /// Encodes canonical key text to physical key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Unencodable`] for Latin-1 when the text
    /// contains a code point above U+00FF.
    pub fn encode(self, text: &str) -> CodecResult<Vec<u8>> {
        match self {
            KeyEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            KeyEncoding::Latin1 => {
                let mut out = Vec::with_capacity(text.len());
                for ch in text.chars() {
                    let code = u32::from(ch);
                    if code > 0xFF {
                        return Err(CodecError::Unencodable {
                            ch,
                            encoding: "latin-1",
                        });
                    }
                    out.push(code as u8);
                }
                Ok(out)
            }
        }
    }

    /// Decodes physical key bytes to text. Never fails: UTF-8 decodes
    /// lossily and Latin-1 accepts every byte.
    #[must_use]
    pub fn decode(self, raw: &[u8]) -> String {
        match self {
            KeyEncoding::Utf8 => String::from_utf8_lossy(raw).into_owned(),
            KeyEncoding::Latin1 => raw.iter().map(|&b| char::from(b)).collect(),
        }
    }

    /// The canonical name of this encoding.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            KeyEncoding::Utf8 => "utf-8",
            KeyEncoding::Latin1 => "latin-1",
        }
    }
}
