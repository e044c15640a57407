//! User-dictionary overrides applied to decoded tag sequences.
//!
//! Entries are phrases; whitespace splits an entry into pieces and each
//! piece may carry a `/label` suffix. At apply time the longest
//! non-overlapping phrase matches are rewritten in place into one
//! contiguous word span, overwriting labels where pieces provide them.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::dict::{DictError, Trie};
use crate::tagger::{Boundary, Tag};

#[derive(Debug, Clone)]
struct PhraseItem {
    /// Label per piece; empty keeps the model's label.
    piece_labels: Vec<String>,
    /// Cumulative character offsets of piece ends within the phrase.
    piece_ends: Vec<usize>,
}

/// Runtime-extensible phrase dictionary. Mutation (`add_phrase`) requires
/// exclusive access; applying matches is read-only.
#[derive(Debug, Default)]
pub struct Customization {
    trie: Trie,
    items: HashMap<String, PhraseItem>,
}

impl Customization {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one entry per line from a UTF-8 file. A missing file is fatal;
    /// blank lines are skipped.
    pub fn from_file(path: &Path) -> Result<Self, DictError> {
        let content = fs::read_to_string(path)?;
        let mut custom = Self::new();
        for line in content.lines() {
            custom.add_phrase(line, None);
        }
        debug!(entries = custom.len(), "loaded customization dictionary");
        Ok(custom)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert one entry. `sep` overrides the default whitespace piece
    /// separator; pieces may carry a `/label` suffix. Blank entries are
    /// ignored.
    pub fn add_phrase(&mut self, entry: &str, sep: Option<char>) {
        let pieces: Vec<&str> = match sep {
            Some(c) => entry.split(c).collect(),
            None => entry.split_whitespace().collect(),
        };

        let mut phrase = String::new();
        let mut piece_labels = Vec::new();
        let mut piece_ends = Vec::new();
        let mut char_len = 0;
        for piece in pieces {
            if piece.is_empty() {
                continue;
            }
            let (word, label) = match piece.rsplit_once('/') {
                Some((word, label)) if !word.is_empty() => (word, label),
                _ => (piece, ""),
            };
            phrase.push_str(word);
            char_len += word.chars().count();
            piece_labels.push(label.to_string());
            piece_ends.push(char_len);
        }
        if char_len == 0 {
            return;
        }

        self.trie.add_word(&phrase);
        self.items.insert(
            phrase,
            PhraseItem {
                piece_labels,
                piece_ends,
            },
        );
    }

    /// Rewrite `tags` in place wherever a stored phrase matches `chars`.
    ///
    /// Each matched phrase becomes one contiguous word: `-B … -I … -E`
    /// (`-S` for a single character), with a `-B` forced on the character
    /// following the phrase so the match never glues onto later text. The
    /// array length never changes.
    pub fn apply(&self, chars: &[char], tags: &mut [Tag]) {
        debug_assert_eq!(chars.len(), tags.len());
        for span in self.trie.longest_match_chars(chars) {
            let phrase: String = chars[span.start..span.end].iter().collect();
            let Some(item) = self.items.get(&phrase) else {
                continue;
            };

            let mut pos = span.start;
            for (label, &piece_end) in item.piece_labels.iter().zip(&item.piece_ends) {
                while pos < span.start + piece_end {
                    if !label.is_empty() {
                        tags[pos].label.clone_from(label);
                    }
                    tags[pos].boundary = Boundary::Inside;
                    pos += 1;
                }
            }

            if span.end - span.start == 1 {
                tags[span.start].boundary = Boundary::Single;
            } else {
                tags[span.start].boundary = Boundary::Begin;
                tags[span.end - 1].boundary = Boundary::End;
            }
            if span.end < tags.len() && !tags[span.end].boundary.starts_word() {
                tags[span.end].boundary = Boundary::Begin;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::reconstruct;
    use std::io::Write;

    fn seg_tags(chars: &[char]) -> Vec<Tag> {
        // every character its own word, as a segmentation model might emit
        chars
            .iter()
            .map(|_| Tag::new("", Boundary::Single))
            .collect()
    }

    #[test]
    fn test_phrase_becomes_one_word() {
        let mut custom = Customization::new();
        custom.add_phrase("红红 火火", None);

        let chars: Vec<char> = "他这一生红红火火了一把".chars().collect();
        let mut tags = seg_tags(&chars);
        custom.apply(&chars, &mut tags);

        let (words, _) = reconstruct(&chars, &tags);
        assert!(words.contains(&"红红火火".to_string()), "got {words:?}");
        assert_eq!(
            words,
            vec!["他", "这", "一", "生", "红红火火", "了", "一", "把"]
        );
    }

    #[test]
    fn test_piece_labels_overwrite() {
        let mut custom = Customization::new();
        custom.add_phrase("春天/SEASON", None);

        let chars: Vec<char> = "春天来了".chars().collect();
        let mut tags = seg_tags(&chars);
        custom.apply(&chars, &mut tags);

        let (words, labels) = reconstruct(&chars, &tags);
        assert_eq!(words[0], "春天");
        assert_eq!(labels[0], "SEASON");
        // following character was detached, not relabeled
        assert_eq!(words[1], "来");
        assert_eq!(labels[1], "");
    }

    #[test]
    fn test_unlabeled_piece_keeps_model_label() {
        let mut custom = Customization::new();
        custom.add_phrase("花开", None);

        let chars: Vec<char> = "花开".chars().collect();
        let mut tags = vec![
            Tag::new("n", Boundary::Single),
            Tag::new("v", Boundary::Single),
        ];
        custom.apply(&chars, &mut tags);

        let (words, labels) = reconstruct(&chars, &tags);
        assert_eq!(words, vec!["花开"]);
        // label of the last character survives
        assert_eq!(labels, vec!["v"]);
    }

    #[test]
    fn test_single_char_phrase_is_single() {
        let mut custom = Customization::new();
        custom.add_phrase("帅/a", None);

        let chars: Vec<char> = "真帅气".chars().collect();
        let mut tags = vec![
            Tag::new("d", Boundary::Single),
            Tag::new("n", Boundary::Begin),
            Tag::new("n", Boundary::End),
        ];
        custom.apply(&chars, &mut tags);
        assert_eq!(tags[1].boundary, Boundary::Single);
        assert_eq!(tags[1].label, "a");
        // 气 was inside the broken-up word and is forced to start anew
        assert_eq!(tags[2].boundary, Boundary::Begin);
    }

    #[test]
    fn test_matches_do_not_overlap() {
        let mut custom = Customization::new();
        custom.add_phrase("科技公司", None);
        custom.add_phrase("高科技", None);

        let chars: Vec<char> = "高科技公司".chars().collect();
        let mut tags = seg_tags(&chars);
        custom.apply(&chars, &mut tags);

        let (words, _) = reconstruct(&chars, &tags);
        // 高科技 wins at position 0; the overlapping 科技公司 is skipped
        assert_eq!(words, vec!["高科技", "公", "司"]);
    }

    #[test]
    fn test_custom_tag_syntax_separator() {
        let mut custom = Customization::new();
        custom.add_phrase("红红|火火", Some('|'));
        assert_eq!(custom.len(), 1);

        let chars: Vec<char> = "红红火火".chars().collect();
        let mut tags = seg_tags(&chars);
        custom.apply(&chars, &mut tags);
        let (words, _) = reconstruct(&chars, &tags);
        assert_eq!(words, vec!["红红火火"]);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "春天/SEASON").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "红红 火火").unwrap();
        let custom = Customization::from_file(file.path()).unwrap();
        assert_eq!(custom.len(), 2);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = Customization::from_file(Path::new("/nonexistent/custom.txt"));
        assert!(matches!(result, Err(DictError::Io(_))));
    }

    #[test]
    fn test_apply_preserves_length() {
        let mut custom = Customization::new();
        custom.add_phrase("红红 火火", None);
        let chars: Vec<char> = "红红火火啊".chars().collect();
        let mut tags = seg_tags(&chars);
        let before = tags.len();
        custom.apply(&chars, &mut tags);
        assert_eq!(tags.len(), before);
    }
}
