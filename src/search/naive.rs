use super::{ExactIndex, OccurrenceSet, SeedHit};

/// 两条等长序列的 Hamming 距离
#[inline]
pub fn hamming_distance(a: &[u8], b: &[u8]) -> usize {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

/// 穷举扫描：文本中与 query 完全相同的全部窗口
pub fn naive_search(text: &[u8], query: &[u8]) -> OccurrenceSet {
    if query.is_empty() || query.len() > text.len() {
        return OccurrenceSet::new();
    }
    text.windows(query.len())
        .enumerate()
        .filter(|(_, w)| *w == query)
        .map(|(i, _)| i as u32)
        .collect()
}

/// 穷举扫描：与 query 的 Hamming 距离不超过 `max_mismatches` 的全部窗口
pub fn hamming_search(text: &[u8], query: &[u8], max_mismatches: usize) -> OccurrenceSet {
    if query.is_empty() || query.len() > text.len() {
        return OccurrenceSet::new();
    }
    text.windows(query.len())
        .enumerate()
        .filter(|(_, w)| hamming_distance(w, query) <= max_mismatches)
        .map(|(i, _)| i as u32)
        .collect()
}

/// 以穷举扫描实现的精确索引，用于与 FM 索引对照
#[derive(Debug, Clone, Copy)]
pub struct NaiveIndex<'a> {
    pub text: &'a [u8],
}

impl ExactIndex for NaiveIndex<'_> {
    fn text_len(&self) -> usize {
        self.text.len()
    }

    fn search(&self, patterns: &[&[u8]]) -> Vec<SeedHit> {
        patterns
            .iter()
            .enumerate()
            .flat_map(|(pattern_id, pat)| {
                naive_search(self.text, pat)
                    .into_iter()
                    .map(move |text_pos| SeedHit { pattern_id, text_pos })
            })
            .collect()
    }
}
