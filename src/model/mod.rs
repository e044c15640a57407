//! Boundary to the external sequence-tagging model.
//!
//! The engine hands the model a flattened batch of unit-id sequences with
//! per-sentence offset bounds and expects one decoded tag id per unit (and
//! one weight per unit in ranking mode) back, in the same order.

/// A batch of unit-id sequences, flattened. `bounds` holds the per-sentence
/// offsets: `bounds[0] == 0`, `bounds[i]..bounds[i + 1]` is sentence `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitBatch {
    pub ids: Vec<i64>,
    pub bounds: Vec<usize>,
}

impl UnitBatch {
    pub fn from_sentences(sentences: &[Vec<i64>]) -> Self {
        let mut ids = Vec::new();
        let mut bounds = Vec::with_capacity(sentences.len() + 1);
        bounds.push(0);
        for sentence in sentences {
            ids.extend_from_slice(sentence);
            bounds.push(ids.len());
        }
        Self { ids, bounds }
    }

    pub fn sentences(&self) -> usize {
        self.bounds.len() - 1
    }

    pub fn sentence(&self, i: usize) -> &[i64] {
        &self.ids[self.bounds[i]..self.bounds[i + 1]]
    }
}

/// Decoded model output, aligned 1:1 with the input units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutput {
    pub tag_ids: Vec<i64>,
    /// Per-unit importance weight ids; present in ranking mode only.
    pub weights: Option<Vec<i64>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model output length {got} does not match input units {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("ranking requires per-unit weights but the model returned none")]
    MissingWeights,

    #[error("model inference failed: {0}")]
    Inference(String),
}

/// External sequence-tagging model. Implementations must return outputs in
/// input order; shape violations surface as [`ModelError`].
pub trait SequenceTagger: Send + Sync {
    fn run(&self, batch: &UnitBatch) -> Result<ModelOutput, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_bounds() {
        let batch = UnitBatch::from_sentences(&[vec![1, 2], vec![], vec![3, 4, 5]]);
        assert_eq!(batch.ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(batch.bounds, vec![0, 2, 2, 5]);
        assert_eq!(batch.sentences(), 3);
        assert_eq!(batch.sentence(0), &[1, 2]);
        assert!(batch.sentence(1).is_empty());
        assert_eq!(batch.sentence(2), &[3, 4, 5]);
    }

    #[test]
    fn test_empty_batch() {
        let batch = UnitBatch::from_sentences(&[]);
        assert_eq!(batch.sentences(), 0);
        assert!(batch.ids.is_empty());
    }
}
