pub mod align;
pub mod corpus;
pub mod custom;
pub mod dict;
pub mod engine;
pub mod model;
pub mod segmenter;
pub mod settings;
pub mod tagger;
pub mod trace_init;

#[cfg(test)]
pub(crate) mod testutil;

pub use engine::{Engine, EngineError, Ranked, Tagged};
pub use model::{ModelError, ModelOutput, SequenceTagger, UnitBatch};
pub use settings::{Mode, Settings};
