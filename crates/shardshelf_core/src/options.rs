//! Shelf open options.

use shardshelf_codec::KeyEncoding;

/// How to treat a missing backing file on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Create the backing file if it does not exist.
    #[default]
    CreateIfMissing,
    /// Fail if the backing file does not exist.
    MustExist,
}

/// Options for opening a shelf.
///
/// # Example
///
/// ```
/// use shardshelf_core::{OpenMode, ShelfOptions};
///
/// let options = ShelfOptions::new()
///     .replace(true)
///     .mode(OpenMode::CreateIfMissing);
/// assert!(options.replace);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShelfOptions {
    /// Wipe all existing entries immediately after attaching.
    pub replace: bool,

    /// Open mode for the backing file.
    pub mode: OpenMode,

    /// Text encoding between canonical key strings and physical byte keys.
    pub key_encoding: KeyEncoding,
}

impl ShelfOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to wipe existing content on open.
    #[must_use]
    pub const fn replace(mut self, value: bool) -> Self {
        self.replace = value;
        self
    }

    /// Sets the open mode.
    #[must_use]
    pub const fn mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the physical key encoding.
    #[must_use]
    pub const fn key_encoding(mut self, encoding: KeyEncoding) -> Self {
        self.key_encoding = encoding;
        self
    }
}
