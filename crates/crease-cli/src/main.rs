// crease entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, keep stdout for tables)
// 3. Load config (copying defaults on first run)
// 4. Run the requested command against the corpus

mod render;

use std::fmt::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use crease_core::aggregate::YearRange;
use crease_core::config::{self, Config};
use crease_core::convert;
use crease_core::corpus::{self, Corpus, MatchFormat};
use crease_core::selector::{self, SelectionQuery};
use crease_core::summary;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "crease.log";
const DEFAULT_LOG_FILTER: &str = "crease=info,crease_core=info,warn";

#[derive(Debug, Parser)]
#[command(name = "crease", version, about = "Cricket statistics and optimal XI selection")]
struct Cli {
    /// Corpus JSON to read instead of the configured one.
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Mirror log output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Args)]
struct RangeArgs {
    /// First season (inclusive).
    #[arg(long)]
    start: Option<i32>,
    /// Last season (inclusive).
    #[arg(long)]
    end: Option<i32>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pick the optimal XI for a format and season range.
    Select {
        #[arg(long)]
        format: Option<MatchFormat>,
        #[command(flatten)]
        range: RangeArgs,
        /// Give up on the solver after this many seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Batting and bowling summary for one player across formats.
    Player {
        name: String,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Leading run scorers and wicket takers for a format.
    Leaders {
        #[arg(long)]
        format: Option<MatchFormat>,
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Top run scorers and wicket takers of one season, with everyone else
    /// grouped as "Others".
    Year {
        year: i32,
        #[arg(long)]
        format: Option<MatchFormat>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Two players' seasons side by side, with totals across formats.
    Compare {
        first: String,
        second: String,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Build the corpus JSON from a directory of scraped CSV files.
    Convert {
        #[arg(long)]
        csv_dir: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let cli = Cli::parse();

    // 2. Initialize tracing
    init_tracing(cli.verbose)?;

    // 3. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: corpus={}, default query {} {}",
        config.data.corpus, config.query.format, config.query.range
    );

    // 4. Run command. A timed-out solve may still be running on a blocking
    // thread; shutting down in the background lets the process exit now.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let result = runtime.block_on(run(cli, config));
    runtime.shutdown_background();

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let corpus_path = cli
        .corpus
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.data.corpus));

    match cli.command {
        Command::Select {
            format,
            range,
            timeout_secs,
        } => {
            let corpus = load(&corpus_path)?;
            let query = SelectionQuery {
                format: format.unwrap_or(config.query.format),
                range: resolve_range(&range, &config)?,
            };
            let timeout = timeout_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.solver.timeout());
            run_select(&corpus, &query, timeout).await
        }
        Command::Player { name, range } => {
            let corpus = load(&corpus_path)?;
            let range = resolve_range(&range, &config)?;
            let summary = summary::player_summary(&corpus, &name, range);
            let mut text = String::new();
            render::player_summary(&mut text, &summary)?;
            print!("{text}");
            Ok(())
        }
        Command::Leaders {
            format,
            range,
            limit,
        } => {
            let corpus = load(&corpus_path)?;
            let range = resolve_range(&range, &config)?;
            let limit = limit.unwrap_or(config.leaders.limit);
            let mut text = String::new();
            for format in formats_to_show(&corpus, format) {
                match corpus.format(format) {
                    Some(records) => {
                        let leaders = summary::format_leaders(records, range, limit);
                        render::format_leaders(&mut text, format, range, &leaders)?;
                    }
                    None => writeln!(text, "{}: no data", format.key().to_uppercase())?,
                }
            }
            print!("{text}");
            Ok(())
        }
        Command::Year {
            year,
            format,
            limit,
        } => {
            let corpus = load(&corpus_path)?;
            let limit = limit.unwrap_or(config.leaders.limit);
            let mut text = String::new();
            for format in formats_to_show(&corpus, format) {
                match corpus.format(format) {
                    Some(records) => {
                        let contributions = summary::year_contributions(records, year, limit);
                        render::year_contributions(&mut text, format, &contributions)?;
                    }
                    None => writeln!(text, "{}: no data", format.key().to_uppercase())?,
                }
            }
            print!("{text}");
            Ok(())
        }
        Command::Compare {
            first,
            second,
            range,
        } => {
            let corpus = load(&corpus_path)?;
            let range = resolve_range(&range, &config)?;
            let comparison = summary::compare_players(&corpus, &first, &second, range);
            let mut text = String::new();
            render::comparison(&mut text, &comparison)?;
            print!("{text}");
            Ok(())
        }
        Command::Convert { csv_dir, out } => {
            let csv_dir = csv_dir.unwrap_or_else(|| PathBuf::from(&config.data.csv_dir));
            let out = out.unwrap_or(corpus_path);
            let value = convert::build_corpus_json(&csv_dir)
                .with_context(|| format!("failed to read CSV files from {}", csv_dir.display()))?;
            convert::write_corpus_json(&value, &out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Corpus written to {}", out.display());
            Ok(())
        }
    }
}

fn load(path: &std::path::Path) -> anyhow::Result<Corpus> {
    let corpus = corpus::load_corpus(path)
        .with_context(|| format!("failed to load corpus from {}", path.display()))?;
    info!("Loaded corpus with formats {:?}", corpus.formats());
    Ok(corpus)
}

/// The requested format, or every format in the corpus.
fn formats_to_show(corpus: &Corpus, format: Option<MatchFormat>) -> Vec<MatchFormat> {
    match format {
        Some(f) => vec![f],
        None => corpus.formats(),
    }
}

fn resolve_range(args: &RangeArgs, config: &Config) -> anyhow::Result<YearRange> {
    let start = args.start.unwrap_or(config.query.range.start());
    let end = args.end.unwrap_or(config.query.range.end());
    YearRange::new(start, end)
        .with_context(|| format!("start year {start} is after end year {end}"))
}

/// Render the optimal XI, or say plainly why there is none. "No data" and
/// "infeasible" are answers, not failures of the command.
async fn run_select(
    corpus: &Corpus,
    query: &SelectionQuery,
    timeout: Duration,
) -> anyhow::Result<()> {
    match selector::select_optimal_xi(corpus, query, timeout).await {
        Ok(result) => {
            let mut text = String::new();
            render::selection(&mut text, query, &result)?;
            print!("{text}");
            Ok(())
        }
        Err(e) if e.is_no_data() => {
            println!("No data: {e}");
            Ok(())
        }
        Err(e) if e.is_infeasible() => {
            println!("No valid XI: {e}");
            Ok(())
        }
        Err(e) => Err(e).context("optimal XI selection failed"),
    }
}

/// Log to `logs/crease.log`, and also to stderr with `--verbose`. Stdout is
/// reserved for command output.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter};

    std::fs::create_dir_all(LOG_DIR).with_context(|| format!("failed to create {LOG_DIR}/"))?;
    let log_path = std::path::Path::new(LOG_DIR).join(LOG_FILE);
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("failed to create {}", log_path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let file_layer = fmt::layer()
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .with_line_number(true);
    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("failed to set tracing subscriber")
}
