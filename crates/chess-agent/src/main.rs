use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chess_agent::{AgentConfig, Observation};
use chess_book::{OpeningBook, placement_field};
use clap::{Parser, Subcommand};

/// Opening-book + UCI engine move agent.
///
/// # Examples
///
/// - Serve observations from stdin (one JSON object per line):
///   `echo '{"board": "<fen>", "remainingOverageTime": 10.0}' | chess_agent serve --engine ./stockfish`
///
/// - Check whether a book file covers a position:
///   `chess_agent book chess_data.bin --fen "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"`
#[derive(Parser, Debug)]
#[command(author, version, about = "Opening-book + UCI engine move agent")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer observations read from stdin, one move per line on stdout
    Serve {
        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Book file (overrides config and CHESS_AGENT_BOOK)
        #[arg(long)]
        book: Option<PathBuf>,

        /// Engine executable (overrides config and CHESS_AGENT_ENGINE)
        #[arg(long)]
        engine: Option<PathBuf>,

        /// Skip the opening book
        #[arg(long, default_value_t = false)]
        no_book: bool,
    },

    /// Load a book file and report its size
    Book {
        path: PathBuf,

        /// Print the stored move for this position
        #[arg(long)]
        fen: Option<String>,

        /// Print every entry, sorted by placement
        #[arg(long, default_value_t = false)]
        list: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            config,
            book,
            engine,
            no_book,
        } => {
            let mut cfg = match config {
                Some(path) => AgentConfig::load(&path)?,
                None => AgentConfig::default(),
            };
            cfg.apply_env();
            if let Some(path) = book {
                cfg.book.path = path;
            }
            if let Some(path) = engine {
                cfg.engine.path = path;
            }
            if no_book {
                cfg.book.enabled = false;
            }
            serve(&cfg)
        }
        Command::Book { path, fen, list } => inspect_book(&path, fen.as_deref(), list),
    }
}

fn serve(cfg: &AgentConfig) -> Result<()> {
    let mut decider = cfg.build_decider().context("failed to load opening book")?;
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for (lineno, line) in stdin.lock().lines().enumerate() {
        let line = line.context("failed to read observation")?;
        if line.trim().is_empty() {
            continue;
        }
        let obs: Observation = serde_json::from_str(&line)
            .with_context(|| format!("invalid observation on line {}", lineno + 1))?;
        let mv = decider
            .decide(&obs)
            .with_context(|| format!("no move for {}", obs.board))?;
        writeln!(stdout, "{mv}")?;
        stdout.flush()?;
    }

    decider.shutdown().context("failed to stop engine")?;
    Ok(())
}

fn inspect_book(path: &Path, fen: Option<&str>, list: bool) -> Result<()> {
    let book = OpeningBook::open(path)
        .with_context(|| format!("failed to load book {}", path.display()))?;
    println!("{} positions", book.len());
    if let Some(fen) = fen {
        let key = placement_field(fen);
        match book.peek(key) {
            Some(mv) => println!("{key} -> {mv}"),
            None => println!("{key} not in book"),
        }
    }
    if list {
        let mut entries: Vec<_> = book.iter().collect();
        entries.sort_unstable();
        for (key, mv) in entries {
            println!("{key} -> {mv}");
        }
    }
    Ok(())
}
