use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use super::DictError;

/// Reserved key for the out-of-vocabulary sentinel.
pub const OOV_KEY: &str = "OOV";

/// Load a tab-separated key/value dictionary. With `reverse`, each line's
/// fields are read as `<value><TAB><key>` instead. Malformed lines are
/// skipped.
pub fn load_kv_dict(path: &Path, reverse: bool) -> Result<HashMap<String, String>, DictError> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut dict = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        match line.split_once('\t') {
            Some((a, b)) => {
                let (key, value) = if reverse { (b, a) } else { (a, b) };
                dict.insert(key.to_string(), value.to_string());
            }
            None => {
                if !line.trim().is_empty() {
                    debug!(%line, "skipped kv line: wrong field count");
                }
            }
        }
    }
    Ok(dict)
}

fn parse_id_table(raw: HashMap<String, String>) -> HashMap<i64, String> {
    let mut table = HashMap::new();
    for (id, value) in raw {
        match id.parse::<i64>() {
            Ok(id) => {
                table.insert(id, value);
            }
            Err(_) => debug!(%id, "skipped kv line: non-numeric id"),
        }
    }
    table
}

/// Model-side vocabulary tables: unit ids, label table, normalization
/// substitutions, and the optional ranking-weight table.
#[derive(Debug, Clone)]
pub struct Vocab {
    word2id: HashMap<String, i64>,
    id2label: HashMap<i64, String>,
    label2id: HashMap<String, i64>,
    replace: HashMap<String, String>,
    id2weight: HashMap<i64, i64>,
    oov_id: i64,
}

impl Vocab {
    /// Load the vocabulary from id-first kv files (`<id><TAB><word>` and
    /// `<id><TAB><label>`); the word table must contain the `OOV` key. The
    /// normalization and weight tables are optional.
    pub fn load(
        word_path: &Path,
        label_path: &Path,
        replace_path: Option<&Path>,
        weight_path: Option<&Path>,
    ) -> Result<Self, DictError> {
        let id2word = parse_id_table(load_kv_dict(word_path, false)?);
        let word2id = id2word.into_iter().map(|(id, w)| (w, id)).collect();
        let id2label = parse_id_table(load_kv_dict(label_path, false)?);
        let replace = match replace_path {
            Some(path) => load_kv_dict(path, false)?,
            None => HashMap::new(),
        };
        let id2weight = match weight_path {
            Some(path) => parse_id_table(load_kv_dict(path, false)?)
                .into_iter()
                .filter_map(|(id, w)| w.parse::<i64>().ok().map(|w| (id, w)))
                .collect(),
            None => HashMap::new(),
        };
        Self::from_tables(word2id, id2label, replace, id2weight)
    }

    /// Assemble a vocabulary from in-memory tables. Fails without an `OOV`
    /// entry in the unit table.
    pub fn from_tables(
        word2id: HashMap<String, i64>,
        id2label: HashMap<i64, String>,
        replace: HashMap<String, String>,
        id2weight: HashMap<i64, i64>,
    ) -> Result<Self, DictError> {
        let oov_id = *word2id.get(OOV_KEY).ok_or(DictError::MissingOov)?;
        let label2id = id2label
            .iter()
            .map(|(&id, label)| (label.clone(), id))
            .collect();
        Ok(Self {
            word2id,
            id2label,
            label2id,
            replace,
            id2weight,
            oov_id,
        })
    }

    /// Canonical form of `token` under the substitution table.
    pub fn normalize<'a>(&'a self, token: &'a str) -> &'a str {
        self.replace.get(token).map_or(token, |s| s.as_str())
    }

    /// Whether the normalized token is in the unit vocabulary.
    pub fn contains(&self, token: &str) -> bool {
        self.word2id.contains_key(self.normalize(token))
    }

    /// Unit id of the normalized token; unknown tokens map to the OOV id.
    pub fn unit_id(&self, token: &str) -> i64 {
        self.word2id
            .get(self.normalize(token))
            .copied()
            .unwrap_or(self.oov_id)
    }

    pub fn oov_id(&self) -> i64 {
        self.oov_id
    }

    pub fn label_of(&self, id: i64) -> Option<&str> {
        self.id2label.get(&id).map(|s| s.as_str())
    }

    pub fn label_id(&self, label: &str) -> Option<i64> {
        self.label2id.get(label).copied()
    }

    /// Importance level for a decoded weight id; identity when no weight
    /// table was loaded.
    pub fn weight_of(&self, id: i64) -> i64 {
        self.id2weight.get(&id).copied().unwrap_or(id)
    }

    pub fn vocab_size(&self) -> usize {
        self.word2id
            .values()
            .max()
            .map_or(0, |&max| max as usize + 1)
    }

    pub fn num_labels(&self) -> usize {
        self.id2label.keys().max().map_or(0, |&max| max as usize + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_lines(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_load_kv_dict_orientations() {
        let file = write_lines(&["0\tOOV", "1\t百度", "malformed line"]);
        let forward = load_kv_dict(file.path(), false).unwrap();
        assert_eq!(forward.get("1").map(String::as_str), Some("百度"));
        assert_eq!(forward.len(), 2);

        let reversed = load_kv_dict(file.path(), true).unwrap();
        assert_eq!(reversed.get("百度").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_load_full_vocab() {
        let words = write_lines(&["0\tOOV", "1\t百度", "2\t是"]);
        let labels = write_lines(&["0\tn-B", "1\tn-I", "2\tv-S"]);
        let replace = write_lines(&["Ａ\tA"]);
        let vocab = Vocab::load(words.path(), labels.path(), Some(replace.path()), None).unwrap();

        assert_eq!(vocab.oov_id(), 0);
        assert_eq!(vocab.unit_id("百度"), 1);
        assert_eq!(vocab.unit_id("未知"), 0);
        assert_eq!(vocab.normalize("Ａ"), "A");
        assert_eq!(vocab.label_of(2), Some("v-S"));
        assert_eq!(vocab.label_id("n-I"), Some(1));
        assert_eq!(vocab.vocab_size(), 3);
        assert_eq!(vocab.num_labels(), 3);
    }

    #[test]
    fn test_missing_oov_is_fatal() {
        let words = write_lines(&["1\t百度"]);
        let labels = write_lines(&["0\tn-B"]);
        let result = Vocab::load(words.path(), labels.path(), None, None);
        assert!(matches!(result, Err(DictError::MissingOov)));
    }

    #[test]
    fn test_normalization_applies_before_lookup() {
        let words = write_lines(&["0\tOOV", "5\ta"]);
        let labels = write_lines(&["0\t-S"]);
        let replace = write_lines(&["ａ\ta"]);
        let vocab = Vocab::load(words.path(), labels.path(), Some(replace.path()), None).unwrap();
        assert_eq!(vocab.unit_id("ａ"), 5);
        assert!(vocab.contains("ａ"));
    }

    #[test]
    fn test_weight_table_defaults_to_identity() {
        let words = write_lines(&["0\tOOV"]);
        let labels = write_lines(&["0\t-S"]);
        let vocab = Vocab::load(words.path(), labels.path(), None, None).unwrap();
        assert_eq!(vocab.weight_of(3), 3);

        let weights = write_lines(&["3\t1"]);
        let vocab = Vocab::load(words.path(), labels.path(), None, Some(weights.path())).unwrap();
        assert_eq!(vocab.weight_of(3), 1);
        assert_eq!(vocab.weight_of(7), 7);
    }
}
