//! 基准测试外壳：扩增查询集合、并行执行检索并计时。

use anyhow::{anyhow, Result};
use rayon::prelude::*;
use std::io::Write;
use std::time::{Duration, Instant};

use crate::error::SearchError;
use crate::search::OccurrenceSet;

/// 一轮检索的汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub queries: usize,
    pub searched: usize,
    /// 截止时间到达后未开始的查询数
    pub skipped: usize,
    pub total_hits: usize,
    pub elapsed: Duration,
}

/// 反复倍增查询列表直到不少于 `target` 条，再截断为恰好 `target` 条。
pub fn amplify_queries(mut queries: Vec<Vec<u8>>, target: usize) -> Result<Vec<Vec<u8>>, SearchError> {
    if queries.is_empty() && target > 0 {
        return Err(SearchError::EmptyQuerySet { target });
    }
    while queries.len() < target {
        let old = queries.len();
        queries.extend_from_within(..old);
    }
    queries.truncate(target);
    Ok(queries)
}

/// 每条查询一个任务，分发到 `threads` 个工作线程（0 表示 rayon 默认线程数）。
///
/// 设置 `deadline` 时，每条查询开始前检查是否超时；超时的查询结果为 None，
/// 已开始的查询总会完整执行。
pub fn run_queries<F>(
    queries: &[Vec<u8>],
    threads: usize,
    deadline: Option<Duration>,
    search: F,
) -> Result<(Vec<Option<OccurrenceSet>>, RunReport)>
where
    F: Fn(&[u8]) -> crate::error::Result<OccurrenceSet> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| anyhow!("cannot start worker pool: {}", e))?;

    let start = Instant::now();
    let results: Vec<Option<OccurrenceSet>> = pool.install(|| {
        queries
            .par_iter()
            .enumerate()
            .map(|(i, q)| {
                if deadline.is_some_and(|limit| start.elapsed() >= limit) {
                    return Ok(None);
                }
                search(q).map(Some).map_err(|e| anyhow!("query #{}: {}", i, e))
            })
            .collect::<Result<_>>()
    })?;
    let elapsed = start.elapsed();

    let searched = results.iter().filter(|r| r.is_some()).count();
    let total_hits = results.iter().flatten().map(OccurrenceSet::len).sum();
    let report = RunReport {
        queries: queries.len(),
        searched,
        skipped: queries.len() - searched,
        total_hits,
        elapsed,
    };
    Ok((results, report))
}

/// 每行一条查询：`查询序号<TAB>逗号分隔的起始位置`；跳过的查询输出 `*`。
pub fn write_occurrences<W: Write>(out: &mut W, results: &[Option<OccurrenceSet>]) -> std::io::Result<()> {
    for (i, res) in results.iter().enumerate() {
        match res {
            Some(occ) => {
                let joined: Vec<String> = occ.iter().map(u32::to_string).collect();
                writeln!(out, "{}\t{}", i, joined.join(","))?;
            }
            None => writeln!(out, "{}\t*", i)?,
        }
    }
    Ok(())
}
