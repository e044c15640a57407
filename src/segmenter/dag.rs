use crate::dict::Trie;

/// One legal word span starting at a DAG position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DagEdge {
    /// Inclusive end position of the span.
    pub end: usize,
    /// Occurrence count of the span's word (0 when not in the lexicon).
    pub freq: u64,
}

/// Build the segmentation DAG: `dag[i]` holds the ascending inclusive end
/// positions `j` such that `chars[i..=j]` is a complete lexicon word. The
/// single-character span `j == i` is always present, so every position
/// stays reachable even with no dictionary hit.
///
/// Rebuilt per input; callers must not cache it across texts.
pub(crate) fn build_dag(trie: &Trie, chars: &[char]) -> Vec<Vec<DagEdge>> {
    let mut dag = Vec::with_capacity(chars.len());
    for start in 0..chars.len() {
        let mut edges = vec![DagEdge {
            end: start,
            freq: 0,
        }];
        for (end, freq) in trie.matches_from(chars, start) {
            let end = end - 1;
            if end == start {
                edges[0].freq = freq;
            } else {
                edges.push(DagEdge { end, freq });
            }
        }
        dag.push(edges);
    }
    dag
}
