use std::collections::HashSet;
use std::ops::Range;

use super::{ExactIndex, OccurrenceSet};
use crate::error::{Result, SearchError};

/// 错配上界的解释方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchBound {
    /// 接受 Hamming 距离 ≤ e
    #[default]
    Inclusive,
    /// 接受 Hamming 距离 < e（e = 0 时不接受任何位置）
    Strict,
}

impl MismatchBound {
    /// 在预算 `errors` 下允许的最大错配数；Strict 且 e = 0 时为 None
    #[inline]
    pub fn max_mismatches(self, errors: usize) -> Option<usize> {
        match self {
            MismatchBound::Inclusive => Some(errors),
            MismatchBound::Strict => errors.checked_sub(1),
        }
    }
}

/// 鸽巢检索参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PigeonOpt {
    /// 错误预算 e
    pub errors: usize,
    pub bound: MismatchBound,
}

/// 把长度为 `len` 的查询切成 `errors + 1` 段互不重叠、非空的连续区间，
/// 各段长度相差至多 1（较长的段在前）。
pub fn segments(len: usize, errors: usize) -> Result<Vec<Range<usize>>> {
    let parts = errors + 1;
    if len == 0 {
        return Err(SearchError::EmptyQuery);
    }
    if parts > len {
        return Err(SearchError::TooManyErrors { errors, query_len: len });
    }
    let base = len / parts;
    let remainder = len % parts;
    let mut out = Vec::with_capacity(parts);
    let mut start = 0usize;
    for i in 0..parts {
        let end = start + base + usize::from(i < remainder);
        out.push(start..end);
        start = end;
    }
    debug_assert_eq!(start, len);
    Ok(out)
}

/// 错配数不超过 `max` 时返回 true，超过即提前退出
#[inline]
fn within_mismatches(window: &[u8], query: &[u8], max: usize) -> bool {
    let mut mismatches = 0usize;
    for (a, b) in window.iter().zip(query) {
        if a != b {
            mismatches += 1;
            if mismatches > max {
                return false;
            }
        }
    }
    true
}

/// 鸽巢原理近似检索：
/// 1. 查询切为 e+1 段，至少一段在任何 ≤ e 错配的比对中完全匹配；
/// 2. 用精确索引批量检索各段，命中位置反推整条查询的起点；
/// 3. 每个候选起点只校验一次，全长比较 Hamming 距离。
pub fn pigeon_search<I: ExactIndex + ?Sized>(
    text: &[u8],
    index: &I,
    query: &[u8],
    opt: PigeonOpt,
) -> Result<OccurrenceSet> {
    let parts = segments(query.len(), opt.errors)?;
    assert_eq!(index.text_len(), text.len(), "exact index does not cover the text");

    let mut occ = OccurrenceSet::new();
    let Some(max) = opt.bound.max_mismatches(opt.errors) else {
        return Ok(occ);
    };
    let n = text.len();
    let len = query.len();
    if len > n {
        return Ok(occ);
    }

    let patterns: Vec<&[u8]> = parts.iter().map(|r| &query[r.clone()]).collect();
    let mut seen: HashSet<usize> = HashSet::new();

    for hit in index.search(&patterns) {
        let seg = &parts[hit.pattern_id];
        let pos = hit.text_pos as usize;
        assert!(
            pos + seg.len() <= n,
            "exact index reported segment {} at {} beyond text length {}",
            hit.pattern_id,
            pos,
            n
        );

        // 对应的整条查询起点；越界的候选直接丢弃
        let Some(start) = pos.checked_sub(seg.start) else {
            continue;
        };
        if start + len > n || !seen.insert(start) {
            continue;
        }
        if within_mismatches(&text[start..start + len], query, max) {
            occ.insert(start as u32);
        }
    }
    Ok(occ)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fm::FMIndex;
    use crate::search::naive::{hamming_distance, hamming_search, NaiveIndex};
    use crate::search::SeedHit;
    use crate::util::dna;

    fn make_text(len: usize, seed: u32) -> Vec<u8> {
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                ((x >> 16) % 4) as u8 + 1
            })
            .collect()
    }

    /// 在 query 上按 LCG 随机引入 k 个错配
    fn mutate(query: &[u8], k: usize, seed: u32) -> Vec<u8> {
        let mut q = query.to_vec();
        let mut x = seed;
        for _ in 0..k {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let i = (x >> 16) as usize % q.len();
            q[i] = q[i] % 4 + 1;
        }
        q
    }

    fn inclusive(errors: usize) -> PigeonOpt {
        PigeonOpt { errors, bound: MismatchBound::Inclusive }
    }

    #[test]
    fn segments_cover_query_evenly() {
        assert_eq!(segments(10, 0).unwrap(), vec![0..10]);
        assert_eq!(segments(10, 2).unwrap(), vec![0..4, 4..7, 7..10]);
        assert_eq!(segments(10, 4).unwrap(), vec![0..2, 2..4, 4..6, 6..8, 8..10]);
        assert_eq!(segments(3, 2).unwrap(), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn segments_reject_bad_configuration() {
        assert_eq!(segments(3, 3).unwrap_err(), SearchError::TooManyErrors { errors: 3, query_len: 3 });
        assert_eq!(segments(0, 0).unwrap_err(), SearchError::EmptyQuery);
    }

    #[test]
    fn one_mismatch_scenario() {
        let text = dna::encode(b"ACGTACGTAC");
        let fm = FMIndex::from_text(&text, 4);
        let got = pigeon_search(&text, &fm, &dna::encode(b"AGGT"), inclusive(1)).expect("search");
        assert_eq!(got.into_iter().collect::<Vec<_>>(), vec![0, 4]);
    }

    #[test]
    fn strict_bound_excludes_distance_equal_to_budget() {
        let text = dna::encode(b"ACGTACGTAC");
        let fm = FMIndex::from_text(&text, 4);
        let strict = PigeonOpt { errors: 1, bound: MismatchBound::Strict };
        assert!(pigeon_search(&text, &fm, &dna::encode(b"AGGT"), strict).expect("search").is_empty());
        let got = pigeon_search(&text, &fm, &dna::encode(b"ACGT"), strict).expect("search");
        assert_eq!(got.into_iter().collect::<Vec<_>>(), vec![0, 4]);
        let strict0 = PigeonOpt { errors: 0, bound: MismatchBound::Strict };
        assert!(pigeon_search(&text, &fm, &dna::encode(b"ACGT"), strict0).expect("search").is_empty());
    }

    #[test]
    fn exact_budget_and_absent_query() {
        let text = dna::encode(b"ACGTACGTAC");
        let fm = FMIndex::from_text(&text, 4);
        assert!(pigeon_search(&text, &fm, &dna::encode(b"GGGG"), inclusive(0)).expect("search").is_empty());
        let got = pigeon_search(&text, &fm, &dna::encode(b"AA"), inclusive(0)).expect("search");
        assert!(got.is_empty());
    }

    #[test]
    fn boundary_queries() {
        let text = dna::encode(b"ACGTAC");
        let fm = FMIndex::from_text(&text, 4);
        let whole = pigeon_search(&text, &fm, &text, inclusive(1)).expect("search");
        assert_eq!(whole.into_iter().collect::<Vec<_>>(), vec![0]);
        let longer = dna::encode(b"ACGTACG");
        assert!(pigeon_search(&text, &fm, &longer, inclusive(1)).expect("search").is_empty());
    }

    #[test]
    fn too_many_errors_is_reported() {
        let text = dna::encode(b"ACGTACGT");
        let fm = FMIndex::from_text(&text, 4);
        let err = pigeon_search(&text, &fm, &dna::encode(b"ACG"), inclusive(3)).unwrap_err();
        assert_eq!(err, SearchError::TooManyErrors { errors: 3, query_len: 3 });
    }

    #[test]
    fn sound_and_complete_against_scan() {
        let text = make_text(2_000, 99);
        let fm = FMIndex::from_text(&text, 32);
        for errors in 0..=3usize {
            for (i, start) in (0..1_900).step_by(131).enumerate() {
                let len = 12 + (i % 4) * 7;
                let q = mutate(&text[start..start + len], errors, start as u32 + 1);
                let got = pigeon_search(&text, &fm, &q, inclusive(errors)).expect("search");
                let want = hamming_search(&text, &q, errors);
                assert_eq!(got, want, "errors={} start={} len={}", errors, start, len);
                for &s in &got {
                    let s = s as usize;
                    assert!(hamming_distance(&text[s..s + q.len()], &q) <= errors);
                }
            }
        }
    }

    #[test]
    fn fm_and_naive_index_agree() {
        let text = make_text(600, 5);
        let fm = FMIndex::from_text(&text, 16);
        let naive = NaiveIndex { text: &text };
        for start in (0..580).step_by(41) {
            let q = mutate(&text[start..start + 16], 2, start as u32 + 7);
            let a = pigeon_search(&text, &fm, &q, inclusive(2)).expect("fm");
            let b = pigeon_search(&text, &naive, &q, inclusive(2)).expect("naive");
            assert_eq!(a, b);
        }
    }

    struct BrokenIndex;

    impl ExactIndex for BrokenIndex {
        fn text_len(&self) -> usize {
            4
        }

        fn search(&self, _patterns: &[&[u8]]) -> Vec<SeedHit> {
            vec![SeedHit { pattern_id: 0, text_pos: 10 }]
        }
    }

    #[test]
    #[should_panic(expected = "beyond text length")]
    fn out_of_bounds_hit_fails_loudly() {
        let text = dna::encode(b"ACGT");
        let _ = pigeon_search(&text, &BrokenIndex, &dna::encode(b"AC"), inclusive(0));
    }
}
