use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A dictionary match, in character indices (`end` exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Node {
    children: HashMap<char, Node>,
    /// Character count of the complete word ending at this node; -1 means
    /// the path is a prefix only.
    word_len: i32,
    /// Occurrence count used for segmentation scoring; 0 when the word
    /// carries no frequency.
    freq: u64,
}

impl Default for Node {
    fn default() -> Self {
        Node {
            children: HashMap::new(),
            word_len: -1,
            freq: 0,
        }
    }
}

/// Character trie for multi-pattern dictionary matching.
///
/// Every prefix of an inserted word is reachable, but only complete words
/// carry a positive length marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trie {
    root: Node,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `word` as a complete dictionary word. Idempotent.
    pub fn add_word(&mut self, word: &str) {
        self.insert(word, 0);
    }

    /// Insert `word` with an occurrence count. Re-inserting overwrites the
    /// count but never removes existing entries.
    pub fn insert(&mut self, word: &str, freq: u64) {
        let mut node = &mut self.root;
        let mut len = 0i32;
        for ch in word.chars() {
            node = node.children.entry(ch).or_default();
            len += 1;
        }
        if len == 0 {
            return;
        }
        node.word_len = len;
        node.freq = freq;
    }

    /// Character count of `word` if it was inserted as a complete word.
    pub fn word_len(&self, word: &str) -> Option<usize> {
        let mut node = &self.root;
        for ch in word.chars() {
            node = node.children.get(&ch)?;
        }
        (node.word_len > 0).then_some(node.word_len as usize)
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.word_len(word).is_some()
    }

    pub(crate) fn word_freq(&self, word: &str) -> Option<u64> {
        let mut node = &self.root;
        for ch in word.chars() {
            node = node.children.get(&ch)?;
        }
        (node.word_len > 0).then_some(node.freq)
    }

    /// All complete words starting at `start`: (exclusive end, count) pairs
    /// in ascending end order.
    pub(crate) fn matches_from(&self, chars: &[char], start: usize) -> Vec<(usize, u64)> {
        let mut out = Vec::new();
        let mut node = &self.root;
        for (i, ch) in chars[start..].iter().enumerate() {
            match node.children.get(ch) {
                Some(next) => node = next,
                None => break,
            }
            if node.word_len > 0 {
                out.push((start + i + 1, node.freq));
            }
        }
        out
    }

    /// Forward longest-match scan: at each unmatched position, emit the
    /// longest complete word starting there, then resume past its end.
    /// Returned spans never overlap.
    pub fn longest_match(&self, text: &str) -> Vec<Span> {
        let chars: Vec<char> = text.chars().collect();
        self.longest_match_chars(&chars)
    }

    pub(crate) fn longest_match_chars(&self, chars: &[char]) -> Vec<Span> {
        let mut result = Vec::new();
        let mut start = 0;
        let mut end = 0;
        while start < chars.len() {
            if let Some(&(match_end, _)) = self.matches_from(chars, start).last() {
                result.push(Span {
                    start,
                    end: match_end,
                });
                end = match_end;
            }
            start = (start + 1).max(end);
        }
        result
    }

    /// Enumerate every dictionary hit at every starting position, with no
    /// deduplication or overlap suppression.
    pub fn all_matches(&self, text: &str) -> Vec<Span> {
        let chars: Vec<char> = text.chars().collect();
        let mut result = Vec::new();
        for start in 0..chars.len() {
            for (end, _) in self.matches_from(&chars, start) {
                result.push(Span { start, end });
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trie() -> Trie {
        let mut trie = Trie::new();
        for word in ["百度", "家", "家家", "高科技", "技公", "科技", "科技公司"] {
            trie.add_word(word);
        }
        trie
    }

    #[test]
    fn test_longest_match_forward_scan() {
        let trie = sample_trie();
        let spans = trie.longest_match("百度是家高科技公司");
        assert_eq!(
            spans,
            vec![
                Span { start: 0, end: 2 },
                Span { start: 3, end: 4 },
                Span { start: 4, end: 7 },
            ]
        );
    }

    #[test]
    fn test_all_matches_enumerates_overlaps() {
        let trie = sample_trie();
        let spans = trie.all_matches("百度是家高科技公司");
        for expected in [
            Span { start: 0, end: 2 }, // 百度
            Span { start: 3, end: 4 }, // 家
            Span { start: 4, end: 7 }, // 高科技
            Span { start: 5, end: 9 }, // 科技公司
            Span { start: 5, end: 7 }, // 科技
        ] {
            assert!(spans.contains(&expected), "missing {expected:?} in {spans:?}");
        }
        // 技公 overlaps both 高科技 and 科技公司 and must still be reported
        assert!(spans.contains(&Span { start: 6, end: 8 }));
        assert_eq!(spans.len(), 6);
    }

    #[test]
    fn test_prefix_is_not_a_word() {
        let mut trie = Trie::new();
        trie.add_word("家家");
        assert!(!trie.contains_word("家"));
        assert!(trie.contains_word("家家"));
        assert!(trie.all_matches("家").is_empty());
    }

    #[test]
    fn test_add_word_idempotent() {
        let mut trie = Trie::new();
        trie.add_word("科技");
        trie.add_word("科技");
        assert_eq!(trie.word_len("科技"), Some(2));
        assert_eq!(trie.all_matches("科技"), vec![Span { start: 0, end: 2 }]);
    }

    #[test]
    fn test_insert_keeps_existing_entries() {
        let mut trie = Trie::new();
        trie.insert("科技", 5);
        trie.insert("科技公司", 3);
        assert_eq!(trie.word_freq("科技"), Some(5));
        assert_eq!(trie.word_freq("科技公司"), Some(3));
        assert_eq!(trie.word_freq("科技公"), None);
    }

    #[test]
    fn test_empty_input() {
        let trie = sample_trie();
        assert!(trie.longest_match("").is_empty());
        assert!(trie.all_matches("").is_empty());
    }

    #[test]
    fn test_no_match_yields_no_spans() {
        let trie = sample_trie();
        assert!(trie.longest_match("今天天气").is_empty());
    }

    #[test]
    fn test_containment_property() {
        let trie = sample_trie();
        // Every added word appearing as a substring is covered by some
        // returned span (possibly a longer dictionary word containing it).
        let text = "他家高科技公司";
        let chars: Vec<char> = text.chars().collect();
        for word in ["家", "高科技", "科技"] {
            let wchars: Vec<char> = word.chars().collect();
            let pos = (0..chars.len())
                .find(|&i| chars[i..].starts_with(&wchars))
                .expect("word occurs in text");
            let covered = trie
                .longest_match(text)
                .iter()
                .any(|s| s.start <= pos && pos + wchars.len() <= s.end);
            assert!(covered, "{word} not covered");
        }
    }
}
