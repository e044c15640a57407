//! Training-corpus parsing: word-level lines to character-aligned tag
//! sequences, and mixed-granularity example construction.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use crate::align::align_words;
use crate::dict::{DictError, Vocab};
use crate::tagger::{Boundary, Tag};

/// Boundary tags for a word sequence: one tag per character, `-S` for
/// single-character words and `-B … -I … -E` otherwise. Labels are empty.
pub fn boundary_tags<S: AsRef<str>>(words: &[S]) -> (Vec<char>, Vec<Tag>) {
    let mut chars = Vec::new();
    let mut tags = Vec::new();
    for word in words {
        let wchars: Vec<char> = word.as_ref().chars().collect();
        match wchars.len() {
            0 => continue,
            1 => tags.push(Tag::new("", Boundary::Single)),
            n => {
                tags.push(Tag::new("", Boundary::Begin));
                for _ in 1..n - 1 {
                    tags.push(Tag::new("", Boundary::Inside));
                }
                tags.push(Tag::new("", Boundary::End));
            }
        }
        chars.extend(wchars);
    }
    (chars, tags)
}

/// Parse a segmentation-format corpus line (`word word …`).
pub fn parse_seg_line(line: &str) -> (Vec<char>, Vec<Tag>) {
    let words: Vec<&str> = line.split_whitespace().collect();
    boundary_tags(&words)
}

/// Parse a tagging-format corpus line (`word/tag word/tag …`): each word's
/// first character gets `tag-B`, the rest `tag-I`. One malformed item
/// voids the whole line, matching the original corpus reader.
pub fn parse_tag_line(line: &str) -> (Vec<char>, Vec<Tag>) {
    let mut chars = Vec::new();
    let mut tags = Vec::new();
    for item in line.split_whitespace() {
        let parsed = item
            .rsplit_once('/')
            .filter(|(word, label)| !word.is_empty() && !label.is_empty());
        let Some((word, label)) = parsed else {
            warn!(%line, "corpus line skipped: malformed word/tag item");
            return (Vec::new(), Vec::new());
        };
        for (i, ch) in word.chars().enumerate() {
            let boundary = if i == 0 {
                Boundary::Begin
            } else {
                Boundary::Inside
            };
            tags.push(Tag::new(label, boundary));
            chars.push(ch);
        }
    }
    (chars, tags)
}

/// A training example at the model's unit granularity: unit ids zipped 1:1
/// with label ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub unit_ids: Vec<i64>,
    pub label_ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    /// `word word …` lines, boundary-only tags.
    Seg,
    /// `word/tag word/tag …` lines.
    Tag,
}

/// Build one training example from a corpus line: words are aligned
/// against the vocabulary (kept or exploded) and the character-level
/// labels of kept words are collapsed to their first character's label.
/// Returns `None` for blank or malformed lines, and for lines using a
/// label missing from both the label table and its `O` fallback.
pub fn parse_example(line: &str, format: CorpusFormat, vocab: &Vocab) -> Option<Example> {
    let (chars, char_tags) = match format {
        CorpusFormat::Seg => parse_seg_line(line),
        CorpusFormat::Tag => parse_tag_line(line),
    };
    if chars.is_empty() {
        return None;
    }

    let words: Vec<String> = match format {
        CorpusFormat::Seg => line.split_whitespace().map(str::to_string).collect(),
        CorpusFormat::Tag => line
            .split_whitespace()
            .filter_map(|item| item.rsplit_once('/'))
            .map(|(word, _)| word.to_string())
            .collect(),
    };
    let alignment = align_words(&words, vocab);
    let unit_tags = alignment.collapse(&char_tags);

    let mut label_ids = Vec::with_capacity(unit_tags.len());
    for tag in &unit_tags {
        let id = vocab
            .label_id(&tag.to_string())
            .or_else(|| vocab.label_id("O"));
        match id {
            Some(id) => label_ids.push(id),
            None => {
                warn!(%line, tag = %tag, "corpus line skipped: unknown label");
                return None;
            }
        }
    }
    Some(Example {
        unit_ids: alignment.unit_ids(),
        label_ids,
    })
}

/// Read training examples from a file, one line each. Blank and malformed
/// lines are skipped with a warning; a missing file is fatal.
pub fn read_examples(
    path: &Path,
    format: CorpusFormat,
    vocab: &Vocab,
) -> Result<Vec<Example>, DictError> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut examples = Vec::new();
    for line in reader.lines() {
        if let Some(example) = parse_example(&line?, format, vocab) {
            examples.push(example);
        }
    }
    Ok(examples)
}
