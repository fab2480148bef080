//! Command-line front end: move-generation counts and engine search.

mod config;
mod report;

use anyhow::{bail, Context};
use chess_core::{FenParser, Move};
use chess_engine::{perft, perft_divide, Game};
use chess_search::{Engine, SearchLimits};
use clap::{Parser, Subcommand};
use config::EngineConfig;
use report::{PerftReport, SearchReport};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess")]
#[command(about = "Chess move generator and search engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count leaf nodes of the legal move tree
    Perft {
        /// Position in FEN
        #[arg(long, default_value = FenParser::STARTPOS)]
        fen: String,
        /// Depth in plies
        #[arg(short, long, default_value = "4")]
        depth: u32,
        /// Print the count below each root move
        #[arg(long)]
        divide: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Search for the best move
    Search {
        /// Position in FEN
        #[arg(long, default_value = FenParser::STARTPOS)]
        fen: String,
        /// Moves in UCI notation played from the position first
        #[arg(long, num_args = 1..)]
        moves: Vec<String>,
        /// Maximum depth; overrides the config file
        #[arg(short, long)]
        depth: Option<u8>,
        /// Time budget in milliseconds; overrides the config file
        #[arg(long)]
        movetime: Option<u64>,
        /// Engine configuration file
        #[arg(long, default_value_os_t = EngineConfig::default_path())]
        config: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Perft {
            fen,
            depth,
            divide,
            json,
        } => {
            let game = load_game(&fen)?;
            tracing::info!("perft depth {} from {}", depth, fen);

            let start = Instant::now();
            let (entries, nodes) = if divide {
                let entries = perft_divide(&game, depth);
                let nodes = entries.iter().map(|(_, n)| n).sum();
                (entries, nodes)
            } else {
                (Vec::new(), perft(&game, depth))
            };
            let report = PerftReport::new(fen, depth, entries, nodes, start.elapsed());
            print_report(&report, json)?;
        }
        Commands::Search {
            fen,
            moves,
            depth,
            movetime,
            config,
            json,
        } => {
            let config = EngineConfig::load(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            let mut game = load_game(&fen)?;
            play_moves(&mut game, &moves)?;

            let limits = SearchLimits {
                depth: Some(depth.unwrap_or(config.max_depth)),
                time: movetime.map(Duration::from_millis).or(config.movetime()),
            };
            tracing::info!(
                "searching {} (depth {:?}, time {:?})",
                game.to_fen(),
                limits.depth,
                limits.time
            );

            let start = Instant::now();
            let result = Engine::new().search(&game, limits);
            let report = SearchReport::new(
                game.to_fen(),
                result,
                game.result().map(|r| r.to_string()),
                start.elapsed(),
            );
            print_report(&report, json)?;
        }
    }
    Ok(())
}

fn load_game(fen: &str) -> anyhow::Result<Game> {
    Game::from_fen(fen).with_context(|| format!("invalid position: {}", fen))
}

fn play_moves(game: &mut Game, moves: &[String]) -> anyhow::Result<()> {
    for text in moves {
        let Some(mv) = Move::from_uci(text) else {
            bail!("malformed move: {}", text);
        };
        if !game.execute_move(mv.from(), mv.to(), mv.promotion()).is_executed() {
            bail!("illegal move {} in {}", text, game.to_fen());
        }
    }
    Ok(())
}

fn print_report<T>(report: &T, json: bool) -> anyhow::Result<()>
where
    T: serde::Serialize + std::fmt::Display,
{
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
