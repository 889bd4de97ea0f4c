use allotax::bench::summary::DEFAULT_HISTORY_LIMIT;
use allotax::bench::{HistorianConfig, save_summary, show_history};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
enum BenchError {
    #[error("usage: allotax-bench [--root <dir>] [history [N]]")]
    Usage,
    #[error("invalid history limit: {0}")]
    InvalidLimit(String),
    #[error(transparent)]
    Allotax(#[from] allotax::Error),
}

#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Save,
    History { limit: usize },
}

#[derive(Debug)]
struct Args {
    root: PathBuf,
    mode: Mode,
}

fn print_help() {
    println!("usage: allotax-bench [--root <dir>] [history [N]]");
    println!();
    println!("Without a command, records the newest benchmark results under .benchmarks/");
    println!("into .benchmarks/summary_history.json (last 50 runs) and prints comparisons");
    println!("against the previous run and the latest run of the same version.");
    println!();
    println!("Commands:");
    println!("  history [N]   list the last N runs, newest first (default {DEFAULT_HISTORY_LIMIT})");
}

fn parse_args(argv: Vec<String>) -> Result<Option<Args>, BenchError> {
    let mut root = PathBuf::from(".");
    let mut mode = Mode::Save;

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "--help" | "-h" => return Ok(None),
            "--root" => {
                i += 1;
                root = argv.get(i).map(PathBuf::from).ok_or(BenchError::Usage)?;
            }
            "history" if mode == Mode::Save => {
                let mut limit = DEFAULT_HISTORY_LIMIT;
                if let Some(n) = argv.get(i + 1).filter(|a| !a.starts_with('-')) {
                    limit = n
                        .parse::<usize>()
                        .map_err(|_| BenchError::InvalidLimit(n.clone()))?;
                    i += 1;
                }
                mode = Mode::History { limit };
            }
            _ => return Err(BenchError::Usage),
        }
        i += 1;
    }

    Ok(Some(Args { root, mode }))
}

fn run(args: Args) -> Result<(), BenchError> {
    let config = HistorianConfig::with_root(args.root);
    let mut stdout = std::io::stdout().lock();
    match args.mode {
        Mode::Save => {
            save_summary(&config, &mut stdout)?;
        }
        Mode::History { limit } => show_history(&config, limit, &mut stdout)?,
    }
    Ok(())
}

fn main() {
    allotax::logging::init("warn");

    let args = match parse_args(std::env::args().skip(1).collect()) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_help();
            return;
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    tracing::debug!(root = %args.root.display(), mode = ?args.mode, "running benchmark historian");

    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
