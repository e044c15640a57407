//! Engine configuration loaded from TOML (`engine.toml` in the model
//! directory), validated before use. Dictionary paths resolve relative to
//! the model directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const SETTINGS_FILE: &str = "engine.toml";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}

/// Engine operating mode: which pipeline variant is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Character-unit segmentation only.
    Seg,
    /// Word segmentation plus part-of-speech style labels.
    Tag,
    /// Tagging plus per-word importance weights.
    Rank,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub mode: Mode,
    pub dict: DictPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DictPaths {
    /// Unit vocabulary (`<id><TAB><word>`), must contain `OOV`.
    pub unit_vocab: PathBuf,
    /// Label table (`<id><TAB><label>`).
    pub label_vocab: PathBuf,
    /// Character/word normalization substitutions.
    #[serde(default)]
    pub replace_table: Option<PathBuf>,
    /// Weight-id table for ranking mode; identity when absent.
    #[serde(default)]
    pub weight_table: Option<PathBuf>,
    /// Frequency lexicon for the DAG segmenter; required in tag and rank
    /// modes.
    #[serde(default)]
    pub seg_lexicon: Option<PathBuf>,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let settings: Settings =
        toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), SettingsError> {
    if matches!(settings.mode, Mode::Tag | Mode::Rank) && settings.dict.seg_lexicon.is_none() {
        return Err(SettingsError::InvalidValue {
            field: "dict.seg_lexicon",
            reason: "required in tag and rank modes",
        });
    }
    Ok(())
}

impl Settings {
    /// Load `<dir>/engine.toml`, resolving relative dictionary paths
    /// against `dir`.
    pub fn from_model_dir(dir: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(dir.join(SETTINGS_FILE))?;
        let mut settings = parse_settings_toml(&raw)?;
        settings.resolve_relative(dir);
        Ok(settings)
    }

    fn resolve_relative(&mut self, dir: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = dir.join(path.as_path());
            }
        };
        resolve(&mut self.dict.unit_vocab);
        resolve(&mut self.dict.label_vocab);
        if let Some(path) = self.dict.replace_table.as_mut() {
            resolve(path);
        }
        if let Some(path) = self.dict.weight_table.as_mut() {
            resolve(path);
        }
        if let Some(path) = self.dict.seg_lexicon.as_mut() {
            resolve(path);
        }
    }
}
