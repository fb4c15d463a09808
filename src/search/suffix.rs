use std::cmp::Ordering;

use super::OccurrenceSet;
use crate::error::{Result, SearchError};

/// 后缀数组区间检索策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaSearchMode {
    /// 二分查找任一匹配后缀，再向左右逐个扩展。
    /// 扩展代价为 O(k·L)，高度重复的文本上会退化。
    #[default]
    Expand,
    /// 两次二分分别求下界与上界，O(log n · L + k)
    Bounds,
}

/// 比较 query 与从 `pos` 开始、截断到 L 个符号的后缀。
/// 返回 query 相对后缀的顺序：Less 表示 query 在前，Equal 表示前 L 个符号完全相同。
/// 后缀不足 L 个符号且为 query 的前缀时，后缀在前（返回 Greater）。
#[inline]
fn cmp_query(text: &[u8], pos: usize, query: &[u8]) -> Ordering {
    let end = (pos + query.len()).min(text.len());
    query.cmp(&text[pos..end])
}

/// 在后缀数组上检索 query 的全部精确出现位置。
///
/// `sa` 必须是 `text` 的后缀数组（见 [`crate::index::sa::check_sa`]）；
/// 长度不一致视为调用方的编程错误，直接 panic。
pub fn sa_search(text: &[u8], sa: &[u32], query: &[u8], mode: SaSearchMode) -> Result<OccurrenceSet> {
    if query.is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    assert_eq!(sa.len(), text.len(), "suffix array does not cover the text");
    let occ = match mode {
        SaSearchMode::Expand => search_expand(text, sa, query),
        SaSearchMode::Bounds => search_bounds(text, sa, query),
    };
    Ok(occ)
}

fn search_expand(text: &[u8], sa: &[u32], query: &[u8]) -> OccurrenceSet {
    let mut occ = OccurrenceSet::new();
    let matches = |k: usize| cmp_query(text, sa[k] as usize, query) == Ordering::Equal;

    // 半开区间 [left, right)
    let mut left = 0usize;
    let mut right = sa.len();
    let mut hit = None;
    while left < right {
        let middle = left + (right - left) / 2;
        match cmp_query(text, sa[middle] as usize, query) {
            Ordering::Less => right = middle,
            Ordering::Greater => left = middle + 1,
            Ordering::Equal => {
                hit = Some(middle);
                break;
            }
        }
    }
    let Some(middle) = hit else {
        return occ;
    };

    // 相同前缀的后缀在 SA 中连续，向两侧扩展直到第一个不匹配
    let mut lo = middle;
    while lo > 0 && matches(lo - 1) {
        lo -= 1;
    }
    let mut hi = middle + 1;
    while hi < sa.len() && matches(hi) {
        hi += 1;
    }
    occ.extend(&sa[lo..hi]);
    occ
}

fn search_bounds(text: &[u8], sa: &[u32], query: &[u8]) -> OccurrenceSet {
    let lo = sa.partition_point(|&p| cmp_query(text, p as usize, query) == Ordering::Greater);
    let len = sa[lo..].partition_point(|&p| cmp_query(text, p as usize, query) == Ordering::Equal);
    sa[lo..lo + len].iter().copied().collect()
}
