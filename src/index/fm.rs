use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::index::{bwt, sa};
use crate::search::{ExactIndex, SeedHit};
use crate::util::dna::{self, SENTINEL};

/// 索引构建元信息，随索引一起序列化
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct IndexMeta {
    pub reference_file: Option<String>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
    /// 被索引文本长度（不含哨兵），加载时与 BWT 长度核对
    pub text_len: usize,
}

/// 朴素 FM 索引实现：
/// - 字母以 [0..sigma) 编码，0 为文本末尾的哨兵 $。
/// - 采用定长分块的 Occ 采样（块内顺扫补偿）。
/// - 保存完整 SA，区间可直接映射为文本位置。
#[derive(Debug, Serialize, Deserialize)]
pub struct FMIndex {
    pub sigma: u8,
    pub block: u32,
    /// C[i] = 文本中字母 < i 的累计数量
    pub c: Vec<u32>,
    /// BWT 序列（与 SA 同长度，含哨兵）
    pub bwt: Vec<u8>,
    /// Occ 采样（按块存储，行优先展平）：occ_samples[block_id * sigma + c]
    pub occ_samples: Vec<u32>,
    /// 完整 SA（含哨兵位置）
    pub sa: Vec<u32>,
    pub meta: IndexMeta,
}

impl FMIndex {
    /// 从编码后的参考文本（不含哨兵）直接构建索引。
    pub fn from_text(text: &[u8], block: usize) -> Self {
        let mut full = Vec::with_capacity(text.len() + 1);
        full.extend_from_slice(text);
        full.push(SENTINEL);
        let sa_arr = sa::build_sa(&full);
        let bwt_arr = bwt::build_bwt(&full, &sa_arr);
        Self::build(bwt_arr, sa_arr, dna::SIGMA as u8, block)
    }

    pub fn build(bwt: Vec<u8>, sa: Vec<u32>, sigma: u8, block: usize) -> Self {
        assert!(block > 0, "Occ block size must be positive");
        assert_eq!(bwt.len(), sa.len(), "BWT and SA length differ");
        let n = bwt.len();
        let sigma_us = sigma as usize;

        // 计算 C 表
        let mut freq = vec![0u32; sigma_us];
        for &ch in &bwt {
            freq[ch as usize] += 1;
        }
        let mut c = vec![0u32; sigma_us];
        let mut acc = 0u32;
        for (slot, &f) in c.iter_mut().zip(&freq) {
            *slot = acc;
            acc += f;
        }

        // 采样 Occ：每块记录块起始位置之前的累计计数
        let num_blocks = (n + block - 1) / block;
        let mut occ_samples = Vec::with_capacity(num_blocks * sigma_us);
        let mut running = vec![0u32; sigma_us];
        for chunk in bwt.chunks(block) {
            occ_samples.extend_from_slice(&running);
            for &ch in chunk {
                running[ch as usize] += 1;
            }
        }

        Self {
            sigma,
            block: block as u32,
            c,
            bwt,
            occ_samples,
            sa,
            meta: IndexMeta { text_len: n.saturating_sub(1), ..IndexMeta::default() },
        }
    }

    /// 设置元信息；text_len 始终由索引本身决定
    pub fn set_meta(&mut self, meta: IndexMeta) {
        self.meta = IndexMeta { text_len: self.text_len(), ..meta };
    }

    /// 索引是否建立在 `text` 之上：对每个 rank i，bwt[i] 必须等于 text[sa[i] - 1]，
    /// sa[i] = 0 的行对应哨兵。SA 是排列，因此逐位相等即文本相同。O(n)。
    pub fn matches_text(&self, text: &[u8]) -> bool {
        if self.text_len() != text.len() || self.sa.len() != self.bwt.len() {
            return false;
        }
        self.sa.iter().zip(&self.bwt).all(|(&p, &b)| match p as usize {
            0 => b == SENTINEL,
            p if p <= text.len() => b == text[p - 1],
            _ => false,
        })
    }

    /// 被索引文本的长度（不含哨兵）
    pub fn text_len(&self) -> usize {
        self.bwt.len().saturating_sub(1)
    }

    /// 返回 BWT[0..pos) 中 c 的出现次数
    #[inline]
    pub fn occ(&self, c: u8, pos: usize) -> u32 {
        if pos == 0 {
            return 0;
        }
        let sigma_us = self.sigma as usize;
        let block = self.block as usize;
        let bi = (pos - 1) / block;
        let base = self.occ_samples[bi * sigma_us + c as usize];
        let start = bi * block;
        let add = self.bwt[start..pos].iter().filter(|&&ch| ch == c).count() as u32;
        base + add
    }

    /// 在区间 [l, r) 前扩展字符 c 后的新区间
    #[inline]
    pub fn rank_range(&self, c: u8, l: usize, r: usize) -> (usize, usize) {
        let c0 = self.c[c as usize] as usize;
        (c0 + self.occ(c, l) as usize, c0 + self.occ(c, r) as usize)
    }

    /// 反向搜索精确匹配，pat 为编码后的字母表（不应包含 0）。
    /// 空模式匹配整个 SA。
    pub fn backward_search(&self, pat: &[u8]) -> Option<(usize, usize)> {
        if self.bwt.is_empty() {
            return None;
        }
        let mut l = 0usize;
        let mut r = self.bwt.len();
        for &a in pat.iter().rev() {
            if !dna::is_symbol(a) || a >= self.sigma {
                return None;
            }
            let (nl, nr) = self.rank_range(a, l, r);
            if nl >= nr {
                return None;
            }
            l = nl;
            r = nr;
        }
        Some((l, r))
    }

    /// 取出 SA 区间对应的文本位置
    pub fn sa_interval_positions(&self, l: usize, r: usize) -> &[u32] {
        &self.sa[l..r]
    }

    /// 模式在文本中的全部出现位置（无序）
    pub fn locate(&self, pat: &[u8]) -> &[u32] {
        match self.backward_search(pat) {
            Some((l, r)) => self.sa_interval_positions(l, r),
            None => &[],
        }
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let f = std::fs::File::create(path).with_context(|| format!("cannot create '{}'", path))?;
        let mut w = std::io::BufWriter::new(f);
        bincode::serialize_into(&mut w, self)?;
        Ok(())
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let f = std::fs::File::open(path).with_context(|| format!("cannot open index '{}'", path))?;
        let idx: Self = bincode::deserialize_from(std::io::BufReader::new(f))
            .with_context(|| format!("cannot decode index '{}'", path))?;
        if idx.sa.len() != idx.bwt.len() || idx.meta.text_len != idx.text_len() {
            bail!(
                "index '{}' is corrupted: header says {} symbols, BWT holds {}, SA holds {}",
                path,
                idx.meta.text_len,
                idx.text_len(),
                idx.sa.len().saturating_sub(1)
            );
        }
        Ok(idx)
    }
}

impl ExactIndex for FMIndex {
    fn text_len(&self) -> usize {
        FMIndex::text_len(self)
    }

    fn search(&self, patterns: &[&[u8]]) -> Vec<SeedHit> {
        let mut hits = Vec::new();
        for (pattern_id, pat) in patterns.iter().enumerate() {
            hits.extend(self.locate(pat).iter().map(|&text_pos| SeedHit { pattern_id, text_pos }));
        }
        hits
    }
}
