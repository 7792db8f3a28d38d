//! # ShardShelf Core
//!
//! Persistent key/value shelves with typed keys and transparent sharding.
//!
//! This crate provides:
//! - [`Shelf`] - one physical shelf; arbitrary literal-representable keys
//!   (strings, integers, booleans, floats, tuples, sets, maps) over a
//!   byte-keyed backend, with the original key kind preserved on
//!   read-back
//! - [`MultiShelf`] - one logical shelf sharded across N independent
//!   physical shelves, with routing-table lookup and round-robin
//!   placement and eviction
//! - [`ShelfOptions`] - open configuration (replace, open mode, key
//!   encoding)
//!
//! ## Concurrency
//!
//! Single-process and synchronous: every operation runs to completion on
//! the calling thread. Callers sharing a shelf across threads must
//! serialize access themselves, and opening the same backing files from
//! several processes is not coordinated by this layer.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod multi;
mod options;
mod shelf;

pub use error::{ShelfError, ShelfResult};
pub use multi::MultiShelf;
pub use options::{OpenMode, ShelfOptions};
pub use shelf::Shelf;

pub use shardshelf_codec::{Key, KeyEncoding};
