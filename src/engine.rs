//! Engine surface: segmentation, tagging, and importance ranking over the
//! dictionary layer and an external sequence-tagging model.
//!
//! The three pipeline variants form a closed set sharing one contract:
//! unit sequence in, tagged unit sequence out. `Seg` feeds the raw
//! characters to the model; `Tag` and `Rank` first run the DAG segmenter
//! and align its words against the model vocabulary at mixed granularity.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::align::{align_words, Alignment, Unit};
use crate::custom::Customization;
use crate::dict::{DictError, Vocab};
use crate::model::{ModelError, SequenceTagger, UnitBatch};
use crate::segmenter::Segmenter;
use crate::settings::{Mode, Settings, SettingsError};
use crate::tagger::{self, Tag};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Dict(#[from] DictError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("operation requires {required:?} mode, engine is in {actual:?} mode")]
    ModeMismatch { required: Mode, actual: Mode },

    #[error("model emitted unknown tag id {0}")]
    UnknownTagId(i64),

    #[error("label table entry {0:?} is not a <label>-<suffix> tag")]
    MalformedLabel(String),
}

/// Words plus suffix-stripped labels, parallel vectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tagged {
    pub words: Vec<String>,
    pub labels: Vec<String>,
}

/// Tagged output plus one importance weight per word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub words: Vec<String>,
    pub labels: Vec<String>,
    pub weights: Vec<i64>,
}

enum Variant {
    Seg,
    Tag { segmenter: Segmenter },
    Rank { segmenter: Segmenter },
}

pub struct Engine {
    vocab: Vocab,
    variant: Variant,
    custom: Option<Customization>,
    tagger: Box<dyn SequenceTagger>,
}

#[derive(Debug, Clone, Default)]
struct Analyzed {
    words: Vec<String>,
    labels: Vec<String>,
    weights: Vec<i64>,
}

impl Engine {
    /// Build an engine from in-memory parts. Tag and rank modes require a
    /// segmenter.
    pub fn new(
        vocab: Vocab,
        mode: Mode,
        segmenter: Option<Segmenter>,
        tagger: Box<dyn SequenceTagger>,
    ) -> Result<Self, EngineError> {
        let variant = match (mode, segmenter) {
            (Mode::Seg, _) => Variant::Seg,
            (Mode::Tag, Some(segmenter)) => Variant::Tag { segmenter },
            (Mode::Rank, Some(segmenter)) => Variant::Rank { segmenter },
            (Mode::Tag | Mode::Rank, None) => {
                return Err(SettingsError::InvalidValue {
                    field: "dict.seg_lexicon",
                    reason: "required in tag and rank modes",
                }
                .into())
            }
        };
        Ok(Self {
            vocab,
            variant,
            custom: None,
            tagger,
        })
    }

    /// Load dictionaries per `settings` and build the engine around the
    /// given model. Fails fast: no partial engine on any load error.
    pub fn from_settings(
        settings: &Settings,
        tagger: Box<dyn SequenceTagger>,
    ) -> Result<Self, EngineError> {
        let vocab = Vocab::load(
            &settings.dict.unit_vocab,
            &settings.dict.label_vocab,
            settings.dict.replace_table.as_deref(),
            settings.dict.weight_table.as_deref(),
        )?;
        let segmenter = match (settings.mode, settings.dict.seg_lexicon.as_deref()) {
            (Mode::Tag | Mode::Rank, Some(path)) => Some(Segmenter::from_file(path)?),
            _ => None,
        };
        let engine = Self::new(vocab, settings.mode, segmenter, tagger)?;
        debug!(mode = ?settings.mode, "engine ready");
        Ok(engine)
    }

    /// Read `<dir>/engine.toml` and load everything relative to `dir`.
    pub fn from_model_dir(
        dir: &Path,
        tagger: Box<dyn SequenceTagger>,
    ) -> Result<Self, EngineError> {
        let settings = Settings::from_model_dir(dir)?;
        Self::from_settings(&settings, tagger)
    }

    pub fn mode(&self) -> Mode {
        match self.variant {
            Variant::Seg => Mode::Seg,
            Variant::Tag { .. } => Mode::Tag,
            Variant::Rank { .. } => Mode::Rank,
        }
    }

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    /// Replace the customization dictionary with the given file.
    pub fn load_customization(&mut self, path: &Path) -> Result<(), EngineError> {
        self.custom = Some(Customization::from_file(path)?);
        Ok(())
    }

    /// Insert one user-dictionary entry: whitespace-separated pieces, each
    /// optionally `piece/label`.
    pub fn add_word(&mut self, entry: &str) {
        self.custom
            .get_or_insert_with(Customization::new)
            .add_phrase(entry, None);
    }

    /// Segment one sentence into words. Empty or whitespace-only input
    /// yields an empty list.
    pub fn segment(&self, text: &str) -> Result<Vec<String>, EngineError> {
        Ok(self.analyze_batch(&[text], false)?.swap_remove(0).words)
    }

    /// Segment a batch; output order matches input order.
    pub fn segment_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<Vec<Vec<String>>, EngineError> {
        Ok(self
            .analyze_batch(texts, false)?
            .into_iter()
            .map(|a| a.words)
            .collect())
    }

    /// Tag one sentence. Labels are empty strings under the `Seg` variant.
    pub fn tag(&self, text: &str) -> Result<Tagged, EngineError> {
        let analyzed = self.analyze_batch(&[text], false)?.swap_remove(0);
        Ok(Tagged {
            words: analyzed.words,
            labels: analyzed.labels,
        })
    }

    pub fn tag_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Tagged>, EngineError> {
        Ok(self
            .analyze_batch(texts, false)?
            .into_iter()
            .map(|a| Tagged {
                words: a.words,
                labels: a.labels,
            })
            .collect())
    }

    /// Tag one sentence and score each word's importance. Only available
    /// in rank mode.
    pub fn rank(&self, text: &str) -> Result<Ranked, EngineError> {
        Ok(self.rank_batch(&[text])?.swap_remove(0))
    }

    pub fn rank_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Ranked>, EngineError> {
        if !matches!(self.variant, Variant::Rank { .. }) {
            return Err(EngineError::ModeMismatch {
                required: Mode::Rank,
                actual: self.mode(),
            });
        }
        Ok(self
            .analyze_batch(texts, true)?
            .into_iter()
            .map(|a| Ranked {
                words: a.words,
                labels: a.labels,
                weights: a.weights,
            })
            .collect())
    }

    /// Shared pipeline: prepare units, run the model once over the batch,
    /// then re-expand, customize, and reconstruct per sentence. All
    /// scratch state is local to the call.
    fn analyze_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        want_weights: bool,
    ) -> Result<Vec<Analyzed>, EngineError> {
        let mut prepared: Vec<Option<(Vec<char>, Alignment)>> = Vec::with_capacity(texts.len());
        for text in texts {
            let text = text.as_ref();
            if text.trim().is_empty() {
                prepared.push(None);
                continue;
            }
            let chars: Vec<char> = text.chars().collect();
            let alignment = match &self.variant {
                Variant::Seg => char_units(&chars, &self.vocab),
                Variant::Tag { segmenter } | Variant::Rank { segmenter } => {
                    align_words(&segmenter.segment(text), &self.vocab)
                }
            };
            prepared.push(Some((chars, alignment)));
        }

        let sentences: Vec<Vec<i64>> = prepared
            .iter()
            .flatten()
            .map(|(_, alignment)| alignment.unit_ids())
            .collect();
        if sentences.is_empty() {
            return Ok(vec![Analyzed::default(); texts.len()]);
        }
        let batch = UnitBatch::from_sentences(&sentences);
        let output = self.tagger.run(&batch)?;
        if output.tag_ids.len() != batch.ids.len() {
            return Err(ModelError::ShapeMismatch {
                expected: batch.ids.len(),
                got: output.tag_ids.len(),
            }
            .into());
        }
        let weights = match (&output.weights, want_weights) {
            (Some(weights), _) if weights.len() != batch.ids.len() => {
                return Err(ModelError::ShapeMismatch {
                    expected: batch.ids.len(),
                    got: weights.len(),
                }
                .into())
            }
            (Some(weights), true) => Some(weights),
            (None, true) => return Err(ModelError::MissingWeights.into()),
            (_, false) => None,
        };

        let mut results = Vec::with_capacity(texts.len());
        let mut cursor = 0;
        for slot in &prepared {
            let Some((chars, alignment)) = slot else {
                results.push(Analyzed::default());
                continue;
            };
            let (lo, hi) = (batch.bounds[cursor], batch.bounds[cursor + 1]);
            cursor += 1;

            let mut tags = Vec::with_capacity(hi - lo);
            for &id in &output.tag_ids[lo..hi] {
                let label = self
                    .vocab
                    .label_of(id)
                    .ok_or(EngineError::UnknownTagId(id))?;
                let tag = Tag::parse(label)
                    .ok_or_else(|| EngineError::MalformedLabel(label.to_string()))?;
                tags.push(tag);
            }
            let mut tags = alignment.expand_tags(&tags);
            if let Some(custom) = &self.custom {
                custom.apply(chars, &mut tags);
            }
            let (words, labels) = tagger::reconstruct(chars, &tags);
            let word_weights = match weights {
                Some(weights) => {
                    let levels: Vec<i64> = weights[lo..hi]
                        .iter()
                        .map(|&id| self.vocab.weight_of(id))
                        .collect();
                    tagger::aggregate_weights(&tags, &alignment.expand_weights(&levels))
                }
                None => Vec::new(),
            };
            results.push(Analyzed {
                words,
                labels,
                weights: word_weights,
            });
        }
        Ok(results)
    }
}

/// Character-granularity alignment for the `Seg` variant: every character
/// is its own unit.
fn char_units(chars: &[char], vocab: &Vocab) -> Alignment {
    Alignment {
        units: chars
            .iter()
            .enumerate()
            .map(|(i, ch)| Unit {
                id: vocab.unit_id(&ch.to_string()),
                start: i,
                len: 1,
            })
            .collect(),
        explosions: Vec::new(),
    }
}
