//! Tag representation and reconstruction of words, labels, and importance
//! weights from character-aligned tag sequences.
//!
//! Tags carry a label plus a boundary suffix (`-B` begin, `-I` inside,
//! `-E` end, `-S` single); the suffixes partition a sentence into
//! contiguous word spans.

use std::fmt;

/// Position of a character within a labeled word span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Begin,
    Inside,
    End,
    Single,
}

impl Boundary {
    pub fn as_char(self) -> char {
        match self {
            Boundary::Begin => 'B',
            Boundary::Inside => 'I',
            Boundary::End => 'E',
            Boundary::Single => 'S',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'B' => Some(Boundary::Begin),
            'I' => Some(Boundary::Inside),
            'E' => Some(Boundary::End),
            'S' => Some(Boundary::Single),
            _ => None,
        }
    }

    /// Whether this suffix opens a new output word.
    pub fn starts_word(self) -> bool {
        matches!(self, Boundary::Begin | Boundary::Single)
    }
}

/// A decoded tag, textual form `<label>-<suffix>`. The label may be empty
/// (pure segmentation models emit tags like `-B`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub label: String,
    pub boundary: Boundary,
}

impl Tag {
    pub fn new(label: impl Into<String>, boundary: Boundary) -> Self {
        Self {
            label: label.into(),
            boundary,
        }
    }

    /// Parse `<label>-<suffix>`, e.g. `ORG-B` or `-S`.
    pub fn parse(s: &str) -> Option<Self> {
        let (label, suffix) = s.rsplit_once('-')?;
        let mut chars = suffix.chars();
        let boundary = Boundary::from_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Tag::new(label, boundary))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.label, self.boundary.as_char())
    }
}

/// Walk a character-aligned tag sequence and emit parallel word and label
/// lists.
///
/// A new word opens at the first character and at every `-B`/`-S` suffix;
/// the emitted label is the label of the span's last character.
pub fn reconstruct(chars: &[char], tags: &[Tag]) -> (Vec<String>, Vec<String>) {
    debug_assert_eq!(chars.len(), tags.len());
    let mut words = Vec::new();
    let mut labels = Vec::new();
    let mut word = String::new();
    let mut label = String::new();
    for (ch, tag) in chars.iter().zip(tags) {
        if !word.is_empty() && tag.boundary.starts_word() {
            words.push(std::mem::take(&mut word));
            labels.push(std::mem::take(&mut label));
        }
        word.push(*ch);
        label.clone_from(&tag.label);
    }
    if !word.is_empty() {
        words.push(word);
        labels.push(label);
    }
    (words, labels)
}

/// Aggregate per-character weights to one weight per output word, taking
/// the maximum over each word's span. `tags` must be the same sequence the
/// words were reconstructed from.
pub fn aggregate_weights(tags: &[Tag], weights: &[i64]) -> Vec<i64> {
    debug_assert_eq!(tags.len(), weights.len());
    let mut out: Vec<i64> = Vec::new();
    for (tag, &weight) in tags.iter().zip(weights) {
        match out.last_mut() {
            Some(last) if !tag.boundary.starts_word() => *last = (*last).max(weight),
            _ => out.push(weight),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(specs: &[&str]) -> Vec<Tag> {
        specs
            .iter()
            .map(|s| Tag::parse(s).expect("valid tag"))
            .collect()
    }

    #[test]
    fn test_parse_display_roundtrip() {
        for s in ["ORG-B", "n-I", "v-E", "-S", "TIME-S"] {
            let tag = Tag::parse(s).unwrap();
            assert_eq!(tag.to_string(), s);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for s in ["", "ORG", "ORG-X", "ORG-BI", "-"] {
            assert!(Tag::parse(s).is_none(), "{s:?} should not parse");
        }
    }

    #[test]
    fn test_reconstruct_basic() {
        let chars: Vec<char> = "百度是高科技公司".chars().collect();
        let seq = tags(&[
            "ORG-B", "ORG-E", "v-S", "n-B", "n-I", "n-I", "n-I", "n-E",
        ]);
        let (words, labels) = reconstruct(&chars, &seq);
        assert_eq!(words, vec!["百度", "是", "高科技公司"]);
        assert_eq!(labels, vec!["ORG", "v", "n"]);
    }

    #[test]
    fn test_label_comes_from_last_char() {
        let chars: Vec<char> = "开发者".chars().collect();
        let seq = tags(&["v-B", "v-I", "n-E"]);
        let (words, labels) = reconstruct(&chars, &seq);
        assert_eq!(words, vec!["开发者"]);
        assert_eq!(labels, vec!["n"]);
    }

    #[test]
    fn test_first_position_opens_word_regardless_of_suffix() {
        let chars: Vec<char> = "公司".chars().collect();
        let seq = tags(&["n-I", "n-E"]);
        let (words, labels) = reconstruct(&chars, &seq);
        assert_eq!(words, vec!["公司"]);
        assert_eq!(labels, vec!["n"]);
    }

    #[test]
    fn test_empty() {
        let (words, labels) = reconstruct(&[], &[]);
        assert!(words.is_empty());
        assert!(labels.is_empty());
        assert!(aggregate_weights(&[], &[]).is_empty());
    }

    #[test]
    fn test_aggregate_weights_max_per_span() {
        let seq = tags(&["n-B", "n-I", "n-E", "v-S", "n-B", "n-E"]);
        let weights = vec![1, 3, 2, 0, 2, 2];
        assert_eq!(aggregate_weights(&seq, &weights), vec![3, 0, 2]);
    }

    #[test]
    fn test_aggregate_weights_guards_first_position() {
        let seq = tags(&["n-I", "n-E"]);
        assert_eq!(aggregate_weights(&seq, &[4, 1]), vec![4]);
    }
}
