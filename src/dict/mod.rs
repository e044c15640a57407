//! Dictionary layer: trie matcher, segmentation lexicon, vocabulary tables.

mod freq;
mod trie;
mod vocab;

pub use freq::FreqDictionary;
pub use trie::{Span, Trie};
pub use vocab::{load_kv_dict, Vocab, OOV_KEY};

use std::io;

/// Unified error type for dictionary loading and binary I/O.
///
/// Covers the text formats (frequency lexicon, key/value tables) and the
/// compiled `HLFD` lexicon cache.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected HLFD)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),

    #[error("unit vocabulary is missing the reserved OOV entry")]
    MissingOov,
}
