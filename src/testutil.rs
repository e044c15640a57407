//! Shared fixtures for vocabulary- and engine-level tests.

use std::collections::HashMap;

use crate::dict::Vocab;
use crate::model::{ModelError, ModelOutput, SequenceTagger, UnitBatch};

/// Build an in-memory vocabulary from (word, id) and (id, label) pairs.
/// The word list must include `("OOV", _)`.
pub(crate) fn vocab(words: &[(&str, i64)], labels: &[(i64, &str)]) -> Vocab {
    let word2id: HashMap<String, i64> = words
        .iter()
        .map(|&(word, id)| (word.to_string(), id))
        .collect();
    let id2label: HashMap<i64, String> = labels
        .iter()
        .map(|&(id, label)| (id, label.to_string()))
        .collect();
    Vocab::from_tables(word2id, id2label, HashMap::new(), HashMap::new())
        .expect("test vocabulary must contain OOV")
}

/// Deterministic stand-in for the external model: returns a fixed output
/// regardless of the batch contents.
pub(crate) struct StubTagger {
    tag_ids: Vec<i64>,
    weights: Option<Vec<i64>>,
}

impl StubTagger {
    pub(crate) fn tags(tag_ids: Vec<i64>) -> Self {
        Self {
            tag_ids,
            weights: None,
        }
    }

    pub(crate) fn with_weights(tag_ids: Vec<i64>, weights: Vec<i64>) -> Self {
        Self {
            tag_ids,
            weights: Some(weights),
        }
    }
}

impl SequenceTagger for StubTagger {
    fn run(&self, _batch: &UnitBatch) -> Result<ModelOutput, ModelError> {
        Ok(ModelOutput {
            tag_ids: self.tag_ids.clone(),
            weights: self.weights.clone(),
        })
    }
}
