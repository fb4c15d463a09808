use std::cmp::Ordering;

use crate::error::{Result, SearchError};

/// 构建后缀数组（前缀倍增法，每轮一次 O(n log n) 排序）。
/// 输入为数值化文本（0:$,1:A,2:C,3:G,4:T,5:N），可带也可不带末尾哨兵。
/// 某后缀若是另一后缀的前缀，则排在前面。
pub fn build_sa(text: &[u8]) -> Vec<u32> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    let mut sa: Vec<u32> = (0..n as u32).collect();
    // rank 从 1 开始，0 留给“越过文本末尾”
    let mut rank: Vec<u32> = text.iter().map(|&b| b as u32 + 1).collect();
    let mut next: Vec<u32> = vec![0; n];

    let mut k = 1usize;
    loop {
        let key = |i: u32, rank: &[u32]| {
            let i = i as usize;
            let second = rank.get(i + k).copied().unwrap_or(0);
            (rank[i], second)
        };
        sa.sort_unstable_by_key(|&i| key(i, &rank));

        next[sa[0] as usize] = 1;
        for w in 1..n {
            let (a, b) = (sa[w - 1], sa[w]);
            let bump = u32::from(key(a, &rank) != key(b, &rank));
            next[b as usize] = next[a as usize] + bump;
        }
        std::mem::swap(&mut rank, &mut next);

        // 所有 rank 互不相同即排序完成
        if rank[sa[n - 1] as usize] as usize == n || k >= n {
            break;
        }
        k <<= 1;
    }
    sa
}

/// 比较两个后缀的字典序（较短前缀在前）。
#[inline]
pub fn cmp_suffixes(text: &[u8], a: usize, b: usize) -> Ordering {
    text[a..].cmp(&text[b..])
}

/// 校验 `sa` 是 `0..n` 的排列且满足后缀字典序不变式。
/// 外部提供的后缀数组在用于检索前应通过此检查。
pub fn check_sa(text: &[u8], sa: &[u32]) -> Result<()> {
    let n = text.len();
    if sa.len() != n {
        return Err(SearchError::InvalidSuffixArray(format!(
            "length {} does not match text length {}",
            sa.len(),
            n
        )));
    }
    let mut seen = vec![false; n];
    for &p in sa {
        let p = p as usize;
        if p >= n || seen[p] {
            return Err(SearchError::InvalidSuffixArray(format!(
                "position {} is out of range or repeated",
                p
            )));
        }
        seen[p] = true;
    }
    for (i, w) in sa.windows(2).enumerate() {
        if cmp_suffixes(text, w[0] as usize, w[1] as usize) == Ordering::Greater {
            return Err(SearchError::InvalidSuffixArray(format!(
                "suffixes at ranks {} and {} are out of order",
                i,
                i + 1
            )));
        }
    }
    Ok(())
}
