//! 检索核心的错误类型。
//!
//! 配置类错误（空文本、空查询、错误预算过大）在检索开始前返回给调用方，
//! 不做静默截断。外部协作者违反约定（索引命中越界）属于编程错误，直接 panic。

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// 参考文本为空
    #[error("reference text is empty")]
    EmptyText,

    /// 参考文本超过 u32 可寻址范围
    #[error("reference text too long: {len} symbols (max {})", u32::MAX)]
    TextTooLong { len: usize },

    /// 查询为空
    #[error("query is empty")]
    EmptyQuery,

    /// e+1 个分段无法放入长度为 L 的查询
    #[error("error budget {errors} needs {} segments but the query has only {query_len} symbols", .errors + 1)]
    TooManyErrors { errors: usize, query_len: usize },

    /// 需要扩增查询集合，但输入为空
    #[error("cannot amplify an empty query set to {target} queries")]
    EmptyQuerySet { target: usize },

    /// 后缀数组不满足排列或字典序不变式
    #[error("invalid suffix array: {0}")]
    InvalidSuffixArray(String),

    /// 索引与参考文本长度不一致
    #[error("index covers {index_len} symbols but the reference has {text_len}")]
    IndexMismatch { index_len: usize, text_len: usize },

    /// 索引长度相同，但建立在另一条参考序列之上
    #[error("index was built over a different reference of the same length")]
    ForeignIndex,

    /// 会话缺少所需的索引结构
    #[error("search session has no {0}")]
    MissingIndex(&'static str),
}
