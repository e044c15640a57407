//! Mixed-granularity alignment between a word-level segmentation and the
//! character-level unit sequence fed to the tagging model.
//!
//! A word stays one unit when it is a single character or when its
//! normalized form is in the model vocabulary; otherwise it is exploded
//! into one unit per character. The alignment records the index
//! transformations needed to later collapse or expand a parallel tag or
//! weight sequence consistently in either direction.

use crate::dict::Vocab;
use crate::tagger::{Boundary, Tag};

/// One model-input slot: a kept word or a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit {
    /// Vocabulary id fed to the model.
    pub id: i64,
    /// Absolute character offset of the unit's first character within the
    /// original sentence.
    pub start: usize,
    /// Number of original characters this unit covers.
    pub len: usize,
}

/// Expansion record: an out-of-vocabulary multi-character word that was
/// exploded into per-character units. Offsets are anchored to the original
/// text, not to shifted unit indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Explosion {
    /// Index of the word's first unit in the unit sequence.
    pub unit_start: usize,
    /// Absolute character offset of the word's first character.
    pub char_start: usize,
    /// Character count of the word.
    pub char_len: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Alignment {
    pub units: Vec<Unit>,
    pub explosions: Vec<Explosion>,
}

/// Align a word sequence against the model vocabulary, deciding per word
/// whether it becomes one unit or one unit per character.
pub fn align_words<S: AsRef<str>>(words: &[S], vocab: &Vocab) -> Alignment {
    let mut alignment = Alignment::default();
    let mut char_pos = 0;
    for word in words {
        let word = word.as_ref();
        let len = word.chars().count();
        if len == 1 || vocab.contains(word) {
            alignment.units.push(Unit {
                id: vocab.unit_id(word),
                start: char_pos,
                len,
            });
        } else {
            alignment.explosions.push(Explosion {
                unit_start: alignment.units.len(),
                char_start: char_pos,
                char_len: len,
            });
            for (i, ch) in word.chars().enumerate() {
                alignment.units.push(Unit {
                    id: vocab.unit_id(&ch.to_string()),
                    start: char_pos + i,
                    len: 1,
                });
            }
        }
        char_pos += len;
    }
    alignment
}

impl Alignment {
    pub fn unit_ids(&self) -> Vec<i64> {
        self.units.iter().map(|u| u.id).collect()
    }

    /// Total character count of the aligned sentence.
    pub fn char_len(&self) -> usize {
        self.units.iter().map(|u| u.len).sum()
    }

    /// Collapse records: absolute offsets of the characters absorbed into
    /// kept multi-character units (every character after a unit's first).
    pub fn absorbed_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::new();
        for unit in &self.units {
            offsets.extend(unit.start + 1..unit.start + unit.len);
        }
        offsets
    }

    /// Re-expand a per-unit tag sequence to one tag per original
    /// character: each absorbed slot gets a `<label>-I` continuation tag.
    pub fn expand_tags(&self, tags: &[Tag]) -> Vec<Tag> {
        debug_assert_eq!(tags.len(), self.units.len());
        let mut out = Vec::with_capacity(self.char_len());
        for (unit, tag) in self.units.iter().zip(tags) {
            out.push(tag.clone());
            for _ in 1..unit.len {
                out.push(Tag::new(tag.label.clone(), Boundary::Inside));
            }
        }
        out
    }

    /// Re-expand per-unit weights: a kept word's weight is copied to each
    /// of its absorbed character slots.
    pub fn expand_weights(&self, weights: &[i64]) -> Vec<i64> {
        debug_assert_eq!(weights.len(), self.units.len());
        let mut out = Vec::with_capacity(self.char_len());
        for (unit, &weight) in self.units.iter().zip(weights) {
            for _ in 0..unit.len {
                out.push(weight);
            }
        }
        out
    }

    /// Collapse a per-character sequence to one slot per unit, keeping the
    /// slot of each unit's first character. Inverse of the expansion
    /// direction: lengths round-trip exactly.
    pub fn collapse<T: Clone>(&self, slots: &[T]) -> Vec<T> {
        debug_assert_eq!(slots.len(), self.char_len());
        self.units.iter().map(|u| slots[u.start].clone()).collect()
    }
}
