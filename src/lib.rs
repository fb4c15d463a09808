//! # seqsearch
//!
//! 在一条长参考序列（DNA 碱基 + 通配符 N）上检索大量短查询序列的基准工具。
//!
//! 提供两种检索方式：
//!
//! - **精确检索**：在后缀数组上二分查找匹配区间（[`search::suffix`]）
//! - **近似检索**：鸽巢原理切分查询，FM 索引播种后按 Hamming 距离校验（[`search::pigeon`]）
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use seqsearch::index::fm::FMIndex;
//! use seqsearch::search::{MismatchBound, PigeonOpt, SaSearchMode, SearchSession};
//! use seqsearch::util::dna;
//!
//! let text = dna::encode(b"ACGTACGTAC");
//! let fm = FMIndex::from_text(&text, 16);
//! let session = SearchSession::new(text)?
//!     .with_suffix_array()
//!     .with_fm_index(fm)?;
//!
//! let exact = session.search_exact(&dna::encode(b"ACGT"), SaSearchMode::Expand)?;
//! assert_eq!(exact.into_iter().collect::<Vec<_>>(), vec![0, 4]);
//!
//! let opt = PigeonOpt { errors: 1, bound: MismatchBound::Inclusive };
//! let approx = session.search_approx(&dna::encode(b"AGGT"), opt)?;
//! assert_eq!(approx.into_iter().collect::<Vec<_>>(), vec![0, 4]);
//! # Ok::<(), seqsearch::error::SearchError>(())
//! ```
//!
//! ## 模块说明
//!
//! - [`io`] — FASTA 解析，参考序列拼接与查询加载
//! - [`index`] — 后缀数组、BWT、FM 索引构建与持久化
//! - [`search`] — 检索会话与两种检索算法
//! - [`bench`] — 查询扩增、并行计时
//! - [`util`] — DNA 编码 / 解码

pub mod bench;
pub mod error;
pub mod index;
pub mod io;
pub mod search;
pub mod util;
