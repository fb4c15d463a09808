use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::io::Write;
use std::time::{Duration, Instant};

use seqsearch::bench;
use seqsearch::index::fm::{FMIndex, IndexMeta};
use seqsearch::io::fasta;
use seqsearch::search::{MismatchBound, PigeonOpt, SaSearchMode, SearchSession};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "seqsearch", author, version, about = "Benchmark exact and approximate read search on a DNA reference", arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Method {
    /// Exhaustive window scan
    Naive,
    /// Suffix array binary search with neighbour expansion
    Sa,
    /// Suffix array lower/upper bound search
    SaBounds,
    /// Exact FM index backward search
    Fm,
    /// Pigeonhole seeding on the FM index, Hamming verification
    Pigeon,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an FM index of the reference
    Index {
        /// Reference FASTA file
        reference: String,
        /// Output prefix for the index file
        #[arg(short, long, default_value = "ref")]
        output: String,
        /// Occ sampling block size
        #[arg(long, default_value_t = 512, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        block: usize,
    },
    /// Search queries against the reference and report the elapsed time
    Search {
        #[arg(short, long, value_enum, default_value_t = Method::Sa)]
        method: Method,
        /// Reference FASTA file
        #[arg(long)]
        reference: String,
        /// Query FASTA file
        #[arg(long)]
        query: String,
        /// Prebuilt FM index (.fm); built in memory when omitted
        #[arg(short = 'i', long)]
        index: Option<String>,
        /// Number of queries; the query set is duplicated or truncated to this size
        #[arg(long = "query-ct", default_value_t = 100)]
        query_ct: usize,
        /// Allowed Hamming distance errors (pigeon only)
        #[arg(short, long, default_value_t = 0)]
        errors: usize,
        /// Accept only distance < errors instead of <= errors
        #[arg(long)]
        strict_bound: bool,
        /// Worker threads (0 = all cores)
        #[arg(short = 't', long, default_value_t = 0)]
        threads: usize,
        /// Stop starting new queries after this many seconds
        #[arg(long)]
        time_limit: Option<f64>,
        /// Verify the suffix array sort invariant before searching
        #[arg(long)]
        check_sa: bool,
        /// Write per-query occurrences as TSV
        #[arg(short, long)]
        out: Option<String>,
        /// Occ sampling block size for an in-memory FM index
        #[arg(long, default_value_t = 512, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        block: usize,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Index { reference, output, block } => run_index(&reference, &output, block),
        Commands::Search {
            method,
            reference,
            query,
            index,
            query_ct,
            errors,
            strict_bound,
            threads,
            time_limit,
            check_sa,
            out,
            block,
        } => {
            let time_limit = time_limit
                .map(Duration::try_from_secs_f64)
                .transpose()
                .context("invalid --time-limit")?;
            let bound = if strict_bound { MismatchBound::Strict } else { MismatchBound::Inclusive };
            let opt = SearchOpt {
                method,
                query_ct,
                pigeon: PigeonOpt { errors, bound },
                threads,
                time_limit,
                check_sa,
                block,
            };
            run_search(&reference, &query, index.as_deref(), out.as_deref(), opt)
        }
    }
}

struct SearchOpt {
    method: Method,
    query_ct: usize,
    pigeon: PigeonOpt,
    threads: usize,
    time_limit: Option<Duration>,
    check_sa: bool,
    block: usize,
}

fn run_index(reference: &str, output: &str, block: usize) -> Result<()> {
    let text = fasta::load_reference(reference)?;
    info!("reference: {} ({} symbols)", reference, text.len());

    let t = Instant::now();
    let mut fm = FMIndex::from_text(&text, block);
    fm.set_meta(IndexMeta {
        reference_file: Some(reference.to_string()),
        build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
        build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
        text_len: text.len(),
    });
    info!("FM index built in {:.3?}", t.elapsed());

    let out_path = format!("{}.fm", output);
    fm.save_to_file(&out_path)?;
    info!("FM index saved: {}", out_path);
    Ok(())
}

fn load_fm(index_path: Option<&str>, text: &[u8], block: usize) -> Result<FMIndex> {
    let t = Instant::now();
    let fm = match index_path {
        Some(p) => {
            let fm = FMIndex::load_from_file(p)?;
            if let Some(ts) = &fm.meta.build_timestamp {
                debug!("index '{}' built at {}", p, ts);
            }
            info!("FM index loaded in {:.3?}", t.elapsed());
            fm
        }
        None => {
            let fm = FMIndex::from_text(text, block);
            info!("FM index built in {:.3?}", t.elapsed());
            fm
        }
    };
    Ok(fm)
}

fn run_search(
    reference: &str,
    query_path: &str,
    index_path: Option<&str>,
    out_path: Option<&str>,
    opt: SearchOpt,
) -> Result<()> {
    let text = fasta::load_reference(reference)?;
    info!("reference: {} ({} symbols)", reference, text.len());
    let queries = fasta::load_queries(query_path)?;
    info!("queries: {} loaded from {}", queries.len(), query_path);
    let queries = bench::amplify_queries(queries, opt.query_ct)?;

    let fm = match opt.method {
        Method::Fm | Method::Pigeon => Some(load_fm(index_path, &text, opt.block)?),
        _ => None,
    };
    let mut session = SearchSession::new(text)?;
    if matches!(opt.method, Method::Sa | Method::SaBounds) {
        let t = Instant::now();
        session = session.with_suffix_array();
        info!("suffix array built in {:.3?}", t.elapsed());
        if opt.check_sa {
            session.check_suffix_array()?;
            info!("suffix array invariant verified");
        }
    }
    if let Some(fm) = fm {
        session = session.with_fm_index(fm).context("index does not match the reference")?;
    }

    let session = &session;
    let method = opt.method;
    let pigeon = opt.pigeon;
    let (results, report) = bench::run_queries(&queries, opt.threads, opt.time_limit, |q| match method {
        Method::Naive => session.search_naive(q),
        Method::Sa => session.search_exact(q, SaSearchMode::Expand),
        Method::SaBounds => session.search_exact(q, SaSearchMode::Bounds),
        Method::Fm => session.search_fm(q),
        Method::Pigeon => session.search_approx(q, pigeon),
    })?;

    info!(
        "{:?}: searched {}/{} queries, {} skipped, {} occurrences",
        method, report.searched, report.queries, report.skipped, report.total_hits
    );
    println!("Time took: {} ns", report.elapsed.as_nanos());

    if let Some(p) = out_path {
        let fh = std::fs::File::create(p).with_context(|| format!("cannot create '{}'", p))?;
        let mut w = std::io::BufWriter::new(fh);
        bench::write_occurrences(&mut w, &results)?;
        w.flush()?;
        info!("occurrences written to {}", p);
    }
    Ok(())
}
