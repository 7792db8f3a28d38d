//! # ShardShelf Codec
//!
//! Canonical key encoding/decoding for ShardShelf.
//!
//! Shelves store arbitrary literal-representable keys (strings, integers,
//! booleans, floats, tuples, sets, maps) in a backend that only understands
//! byte keys. This crate turns a [`Key`] into a deterministic canonical
//! string and back, preserving the original kind on read-back.
//!
//! ## Encoding Scheme
//!
//! A key encodes as its display payload, a `0x1F` unit separator, and a
//! one-character kind tag:
//!
//! ```text
//! 1<US>i        integer 1
//! 1<US>s        string "1"
//! true<US>b     boolean true
//! (1, 'a')<US>t tuple (1, "a")
//! ```
//!
//! Because the payload leads, sorting encoded keys lexicographically
//! interleaves kinds by their textual form: integer `1` and string `"1"`
//! sort adjacent while remaining distinct physical keys. The tag removes
//! the classic "is `1` an int or a string?" decode ambiguity entirely.
//!
//! Raw keys written by other tools carry no tag; decoding falls back to
//! treating the whole text as a plain string rather than failing.
//!
//! ## Example
//!
//! ```
//! use shardshelf_codec::{decode_key, encode_key, Key, KeyEncoding};
//!
//! let key = Key::tuple(vec![Key::from(3), Key::from("a")]);
//! let encoded = encode_key(&key);
//! let bytes = KeyEncoding::Utf8.encode(&encoded).unwrap();
//! assert_eq!(decode_key(&bytes, KeyEncoding::Utf8), key);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod encoding;
mod error;
mod key;

pub use decoder::{decode_key, decode_text};
pub use encoder::encode_key;
pub use encoding::KeyEncoding;
pub use error::{CodecError, CodecResult};
pub use key::Key;

/// Separator between a key's payload and its kind tag (ASCII unit
/// separator). Payload text may itself contain this byte; the separator
/// that matters is always the penultimate character of the encoded form.
pub const TAG_SEPARATOR: char = '\u{1f}';
