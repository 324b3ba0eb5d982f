// Command-line entry point for iavldump.
//
// Opens the application database read-only, prints every record to stdout
// and exits non-zero on the first fatal error. Diagnostics go to stderr.

use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueHint};

use crate::inspect::{self, DumpStats};
use crate::store::LevelDbStore;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Where the application keeps its multi-store database.
const DEFAULT_DB_PATH: &str = "data/application.db";

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Print the records of a versioned Merkle-tree application store.
#[derive(Parser, Debug)]
#[command(
    name = "iavldump",
    version,
    about = "Print the records of a versioned Merkle-tree application store"
)]
struct Cli {
    /// Application database directory (LevelDB).
    #[arg(value_hint = ValueHint::DirPath, default_value = DEFAULT_DB_PATH)]
    db_path: PathBuf,

    /// Quiet mode (only log errors).
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Print scan counters to stderr when done.
    #[arg(long)]
    stats: bool,

    /// Print scan counters as JSON to stderr (implies --stats).
    #[arg(long = "json")]
    json_output: bool,
}

fn log_filter(cli: &Cli) -> &'static str {
    if cli.quiet {
        return "error";
    }
    match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("iavldump".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = log_filter(&cli);
    }
}

// ---------------------------------------------------------------------------
// Stats output
// ---------------------------------------------------------------------------

fn print_stats(stats: &DumpStats, json_output: bool) {
    if json_output {
        let json = serde_json::json!({
            "records": stats.records,
            "versions": stats.versions,
            "blocks": stats.blocks,
            "keeper_records": stats.keeper_records,
            "nodes": stats.nodes,
            "roots": stats.roots,
            "node_errors": stats.node_errors,
        });
        match serde_json::to_string_pretty(&json) {
            Ok(text) => eprintln!("{text}"),
            Err(e) => log::error!("cannot serialize stats: {e}"),
        }
    } else {
        eprintln!(
            "iavldump: records: {}, versions: {}, blocks: {}, keeper records: {}, nodes: {}, roots: {}, skipped nodes: {}",
            stats.records,
            stats.versions,
            stats.blocks,
            stats.keeper_records,
            stats.nodes,
            stats.roots,
            stats.node_errors
        );
    }
}

// ---------------------------------------------------------------------------
// Dump command
// ---------------------------------------------------------------------------

fn cmd_dump(cli: &Cli) -> i32 {
    let mut store = match LevelDbStore::open(&cli.db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("iavldump: {e}");
            return 1;
        }
    };

    log::debug!("scanning {}", store.path().display());
    let out = BufWriter::with_capacity(BUF_SIZE, io::stdout().lock());
    match inspect::dump(&mut store, out) {
        Ok(stats) => {
            if cli.stats || cli.json_output {
                print_stats(&stats, cli.json_output);
            }
            0
        }
        Err(e) => {
            eprintln!("iavldump: {e}");
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

pub fn run() -> ! {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&cli)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = cmd_dump(&cli);
    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
