//! DAG-based word segmentation over the frequency lexicon.
//!
//! Builds a per-position DAG of legal word boundaries from the lexicon
//! trie, then picks the maximum-likelihood path by dynamic programming
//! over log-normalized occurrence counts.

mod dag;

use std::path::Path;
use std::time::Instant;

use tracing::debug;

use crate::dict::{DictError, FreqDictionary};
use dag::build_dag;

pub struct Segmenter {
    dict: FreqDictionary,
}

impl Segmenter {
    pub fn new(dict: FreqDictionary) -> Self {
        Self { dict }
    }

    /// Load the frequency lexicon from a `<word> <count>` text file.
    pub fn from_file(path: &Path) -> Result<Self, DictError> {
        let start = Instant::now();
        let dict = FreqDictionary::from_file(path)?;
        debug!(
            total = dict.total(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "loaded segmentation lexicon"
        );
        Ok(Self::new(dict))
    }

    pub fn dict(&self) -> &FreqDictionary {
        &self.dict
    }

    /// Split `text` into words covering every character exactly once.
    ///
    /// A span scores `ln(max(count, 1)) − ln(total)` plus the best score
    /// of the rest; ties prefer the longest candidate span. Runs of
    /// adjacent single-character ASCII letter/digit units are merged into
    /// one token. All scratch state is local to the call, so `&self`
    /// segmentation is safe from multiple threads.
    pub fn segment(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let dag = build_dag(self.dict.trie(), &chars);
        let log_total = self.dict.log_total();

        // route[i] = (best score from i to the end, inclusive end of the
        // span chosen at i), filled back-to-front
        let mut route = vec![(0.0f64, 0usize); chars.len() + 1];
        for i in (0..chars.len()).rev() {
            let mut best_score = f64::NEG_INFINITY;
            let mut best_end = i;
            for edge in &dag[i] {
                let score = (edge.freq.max(1) as f64).ln() - log_total + route[edge.end + 1].0;
                if score >= best_score {
                    best_score = score;
                    best_end = edge.end;
                }
            }
            route[i] = (best_score, best_end);
        }

        let mut words = Vec::new();
        let mut ascii_run = String::new();
        let mut i = 0;
        while i < chars.len() {
            let end = route[i].1 + 1;
            if end - i == 1 && chars[i].is_ascii_alphanumeric() {
                ascii_run.push(chars[i]);
            } else {
                if !ascii_run.is_empty() {
                    words.push(std::mem::take(&mut ascii_run));
                }
                words.push(chars[i..end].iter().collect());
            }
            i = end;
        }
        if !ascii_run.is_empty() {
            words.push(ascii_run);
        }
        words
    }
}
