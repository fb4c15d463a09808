//! 检索核心：后缀数组区间检索与鸽巢原理近似检索。
//!
//! 两种检索都是输入的纯函数：参考文本、后缀数组与 FM 索引在会话期间只读，
//! 每条查询产生一个全新的 [`OccurrenceSet`]，查询之间没有共享的可变状态。

use std::collections::BTreeSet;

use crate::error::{Result, SearchError};
use crate::index::fm::FMIndex;
use crate::index::sa;

pub mod naive;
pub mod pigeon;
pub mod suffix;

pub use pigeon::{pigeon_search, MismatchBound, PigeonOpt};
pub use suffix::{sa_search, SaSearchMode};

/// 一条查询在参考文本中的全部起始位置（集合语义，按位置有序迭代）
pub type OccurrenceSet = BTreeSet<u32>;

/// 精确索引的一次命中：第 `pattern_id` 个模式出现在文本位置 `text_pos`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeedHit {
    pub pattern_id: usize,
    pub text_pos: u32,
}

/// 多模式精确检索能力。实现者必须报告每个模式在文本中的全部出现位置。
pub trait ExactIndex {
    /// 被索引文本的长度
    fn text_len(&self) -> usize;

    /// 批量检索，返回所有 (模式编号, 文本位置)
    fn search(&self, patterns: &[&[u8]]) -> Vec<SeedHit>;
}

/// 一次检索会话：持有参考文本及其索引，构建一次后供所有查询借用。
#[derive(Debug)]
pub struct SearchSession {
    text: Vec<u8>,
    sa: Option<Vec<u32>>,
    fm: Option<FMIndex>,
}

impl SearchSession {
    /// `text` 为编码后的参考序列（1..=5，不含哨兵）
    pub fn new(text: Vec<u8>) -> Result<Self> {
        if text.is_empty() {
            return Err(SearchError::EmptyText);
        }
        if text.len() > u32::MAX as usize {
            return Err(SearchError::TextTooLong { len: text.len() });
        }
        Ok(Self { text, sa: None, fm: None })
    }

    /// 为文本构建后缀数组
    pub fn with_suffix_array(mut self) -> Self {
        self.sa = Some(sa::build_sa(&self.text));
        self
    }

    /// 使用外部提供的后缀数组；`check` 为真时先校验排序不变式
    pub fn with_given_suffix_array(mut self, sa_arr: Vec<u32>, check: bool) -> Result<Self> {
        if check {
            sa::check_sa(&self.text, &sa_arr)?;
        } else if sa_arr.len() != self.text.len() {
            return Err(SearchError::IndexMismatch { index_len: sa_arr.len(), text_len: self.text.len() });
        }
        self.sa = Some(sa_arr);
        Ok(self)
    }

    /// 挂载 FM 索引，索引必须覆盖同一参考文本
    pub fn with_fm_index(mut self, fm: FMIndex) -> Result<Self> {
        if fm.text_len() != self.text.len() {
            return Err(SearchError::IndexMismatch { index_len: fm.text_len(), text_len: self.text.len() });
        }
        if !fm.matches_text(&self.text) {
            return Err(SearchError::ForeignIndex);
        }
        self.fm = Some(fm);
        Ok(self)
    }

    /// 校验当前后缀数组的排序不变式
    pub fn check_suffix_array(&self) -> Result<()> {
        sa::check_sa(&self.text, self.suffix_array()?)
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn suffix_array(&self) -> Result<&[u32]> {
        self.sa.as_deref().ok_or(SearchError::MissingIndex("suffix array"))
    }

    pub fn fm_index(&self) -> Result<&FMIndex> {
        self.fm.as_ref().ok_or(SearchError::MissingIndex("FM index"))
    }

    /// 基于后缀数组的精确检索
    pub fn search_exact(&self, query: &[u8], mode: SaSearchMode) -> Result<OccurrenceSet> {
        sa_search(&self.text, self.suffix_array()?, query, mode)
    }

    /// 基于 FM 索引的精确检索
    pub fn search_fm(&self, query: &[u8]) -> Result<OccurrenceSet> {
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(self.fm_index()?.locate(query).iter().copied().collect())
    }

    /// 鸽巢原理近似检索（Hamming 距离）
    pub fn search_approx(&self, query: &[u8], opt: PigeonOpt) -> Result<OccurrenceSet> {
        pigeon_search(&self.text, self.fm_index()?, query, opt)
    }

    /// 穷举扫描，作为对照
    pub fn search_naive(&self, query: &[u8]) -> Result<OccurrenceSet> {
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(naive::naive_search(&self.text, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::dna;

    fn session(text: &[u8]) -> SearchSession {
        let text = dna::encode(text);
        let fm = FMIndex::from_text(&text, 8);
        SearchSession::new(text)
            .expect("session")
            .with_suffix_array()
            .with_fm_index(fm)
            .expect("fm")
    }

    fn positions(set: OccurrenceSet) -> Vec<u32> {
        set.into_iter().collect()
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(SearchSession::new(Vec::new()).unwrap_err(), SearchError::EmptyText);
    }

    #[test]
    fn missing_structures_are_reported() {
        let s = SearchSession::new(dna::encode(b"ACGT")).expect("session");
        let q = dna::encode(b"CG");
        assert_eq!(
            s.search_exact(&q, SaSearchMode::Expand).unwrap_err(),
            SearchError::MissingIndex("suffix array")
        );
        assert_eq!(s.search_approx(&q, PigeonOpt::default()).unwrap_err(), SearchError::MissingIndex("FM index"));
    }

    #[test]
    fn mismatched_index_is_rejected() {
        let fm = FMIndex::from_text(&dna::encode(b"ACG"), 4);
        let err = SearchSession::new(dna::encode(b"ACGT")).expect("session").with_fm_index(fm).unwrap_err();
        assert_eq!(err, SearchError::IndexMismatch { index_len: 3, text_len: 4 });
    }

    #[test]
    fn foreign_index_of_same_length_is_rejected() {
        let fm = FMIndex::from_text(&dna::encode(b"TTTTACGT"), 4);
        let err = SearchSession::new(dna::encode(b"ACGTTTTT")).expect("session").with_fm_index(fm).unwrap_err();
        assert_eq!(err, SearchError::ForeignIndex);
    }

    #[test]
    fn given_suffix_array_is_checked() {
        let text = dna::encode(b"ACGT");
        let err = SearchSession::new(text.clone())
            .expect("session")
            .with_given_suffix_array(vec![3, 2, 1, 0], true)
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidSuffixArray(_)));
        let ok = SearchSession::new(text).expect("session").with_given_suffix_array(vec![0, 1, 2, 3], true);
        assert!(ok.expect("valid array").check_suffix_array().is_ok());
    }

    #[test]
    fn all_methods_agree_on_exact_search() {
        let s = session(b"ACGTACGTAC");
        let q = dna::encode(b"ACGT");
        let want = vec![0, 4];
        assert_eq!(positions(s.search_exact(&q, SaSearchMode::Expand).expect("sa")), want);
        assert_eq!(positions(s.search_exact(&q, SaSearchMode::Bounds).expect("bounds")), want);
        assert_eq!(positions(s.search_fm(&q).expect("fm")), want);
        assert_eq!(positions(s.search_naive(&q).expect("naive")), want);
        let opt = PigeonOpt { errors: 0, bound: MismatchBound::Inclusive };
        assert_eq!(positions(s.search_approx(&q, opt).expect("pigeon")), want);
    }

    #[test]
    fn repeated_search_is_idempotent() {
        let s = session(b"AAAAACAAAAGAAAA");
        let q = dna::encode(b"AAAA");
        let opt = PigeonOpt { errors: 1, bound: MismatchBound::Inclusive };
        let first = s.search_approx(&q, opt).expect("first");
        let second = s.search_approx(&q, opt).expect("second");
        assert_eq!(first, second);
        assert_eq!(
            s.search_exact(&q, SaSearchMode::Expand).expect("sa"),
            s.search_exact(&q, SaSearchMode::Expand).expect("sa again")
        );
    }
}
