use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DictError, Trie};

const MAGIC: &[u8; 4] = b"HLFD";
const VERSION: u8 = 1;
const HEADER_SIZE: usize = 5; // 4 bytes magic + 1 byte version

/// Segmentation lexicon: a trie of words with occurrence counts plus the
/// log of the total occurrence mass.
///
/// Built once at load; read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreqDictionary {
    trie: Trie,
    total: u64,
    log_total: f64,
}

impl FreqDictionary {
    pub fn from_entries(entries: impl IntoIterator<Item = (String, u64)>) -> Self {
        let mut trie = Trie::new();
        let mut total = 0u64;
        for (word, count) in entries {
            trie.insert(&word, count);
            total += count;
        }
        Self {
            trie,
            total,
            log_total: (total.max(1) as f64).ln(),
        }
    }

    /// Load a frequency list: UTF-8 lines of `<word> <count>`. Lines with
    /// the wrong field count or a non-numeric count are skipped; a missing
    /// or unreadable file is fatal.
    pub fn from_file(path: &Path) -> Result<Self, DictError> {
        let reader = BufReader::new(fs::File::open(path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(word), Some(count), None) => match count.parse::<u64>() {
                    Ok(count) => entries.push((word.to_string(), count)),
                    Err(_) => debug!(%line, "skipped lexicon line: bad count"),
                },
                (None, ..) => {} // blank line
                _ => debug!(%line, "skipped lexicon line: wrong field count"),
            }
        }
        Ok(Self::from_entries(entries))
    }

    pub(crate) fn trie(&self) -> &Trie {
        &self.trie
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn log_total(&self) -> f64 {
        self.log_total
    }

    /// Occurrence count of `word`, if present as a complete word.
    pub fn word_count(&self, word: &str) -> Option<u64> {
        self.trie.word_freq(word)
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.trie.contains_word(word)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        let encoded = bincode::serialize(self).map_err(DictError::Serialize)?;
        let mut buf = Vec::with_capacity(HEADER_SIZE + encoded.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&encoded);
        Ok(buf)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        if data.len() < HEADER_SIZE {
            return Err(DictError::InvalidHeader);
        }
        if &data[..4] != MAGIC {
            return Err(DictError::InvalidMagic);
        }
        if data[4] != VERSION {
            return Err(DictError::UnsupportedVersion(data[4]));
        }
        bincode::deserialize(&data[HEADER_SIZE..]).map_err(DictError::Deserialize)
    }

    /// Load a compiled lexicon written by [`save`](Self::save).
    pub fn open(path: &Path) -> Result<Self, DictError> {
        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }

    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}
