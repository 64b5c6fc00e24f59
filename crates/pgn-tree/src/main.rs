//! pgn-tree - inspect, merge and convert PGN files through the game tree.

mod config;

use anyhow::Context;
use chess_core::Variant;
use chess_position::Position;
use clap::{Parser, Subcommand};
use config::CliConfig;
use game_tree::{split_pgn, GameTree};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pgn-tree")]
#[command(about = "Inspect, merge and convert PGN files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the mainline of the first game
    Show {
        /// PGN file
        file: PathBuf,
        /// Print movetext only
        #[arg(long)]
        no_headers: bool,
    },
    /// List the games found in a file
    Split {
        /// PGN file
        file: PathBuf,
    },
    /// Merge every game of every file into one tree and print it as JSON
    Merge {
        /// PGN files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the legal moves at the end of the first game
    Moves {
        /// PGN file
        file: PathBuf,
    },
    /// Print the storage key of a position
    Key {
        /// Position in FEN
        fen: String,
        /// Variant key (e.g. "atomic", "3check")
        #[arg(short, long)]
        variant: Option<String>,
    },
}

fn read_pgn(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_game(path: &Path, config: &CliConfig) -> anyhow::Result<GameTree> {
    let text = read_pgn(path)?;
    let mut tree = GameTree::with_variant(config.default_variant, None);
    tree.parse_pgn_with_variant(&text, config.default_variant)
        .with_context(|| format!("no game in {}", path.display()))?;
    Ok(tree)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = CliConfig::load()?;

    match cli.command {
        Commands::Show { file, no_headers } => {
            let mut tree = load_game(&file, &config)?;
            config.apply_headers(&mut tree);
            println!("{}", tree.report_pgn(!no_headers));
        }
        Commands::Split { file } => {
            let text = read_pgn(&file)?;
            for (i, pgn) in split_pgn(&text).iter().enumerate() {
                let mut tree = GameTree::with_variant(config.default_variant, None);
                tree.parse_pgn_with_variant(pgn, config.default_variant)?;
                println!(
                    "{:>4}  {} - {}  {}  {} plies  {}",
                    i + 1,
                    tree.header("White", "?"),
                    tree.header("Black", "?"),
                    tree.header("Result", "*"),
                    tree.current().depth(),
                    tree.variant().display_name(),
                );
            }
        }
        Commands::Merge { files, output } => {
            let mut tree = GameTree::with_variant(config.default_variant, None);
            for file in &files {
                let text = read_pgn(file)?;
                let games = tree
                    .merge_pgn(&text)
                    .with_context(|| format!("no game in {}", file.display()))?;
                tracing::info!("Merged {} games from {}", games, file.display());
            }
            config.apply_headers(&mut tree);
            let json = if config.pretty_json {
                tree.to_json_pretty()?
            } else {
                tree.to_json()?
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!("Wrote {} nodes to {}", tree.len(), path.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Moves { file } => {
            let tree = load_game(&file, &config)?;
            for m in tree.rich_legal_sans() {
                let marker = if m.is_mainline {
                    "*"
                } else if m.is_variation {
                    "+"
                } else {
                    " "
                };
                println!(
                    "{} {:<8} {:<6} {:<12} {:?}",
                    marker, m.san, m.uci, m.rating, m.weights
                );
            }
        }
        Commands::Key { fen, variant } => {
            let variant = variant.map_or(config.default_variant, |key| Variant::from_key(&key));
            let position = Position::from_fen(variant, &fen)?;
            println!("{}", position.store_key());
        }
    }
    Ok(())
}
