//! Tic-tac-toe arena for the UCT search engine.
//!
//! Plays engine-vs-engine matches with per-side budgets and playout
//! policies, or a single game against a human at the terminal.

mod human;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};
use uct_core::{Game, OutcomeTally};
use uct_mcts::{
    games::{Player, TicTacToe, TicTacToeAction, TicTacToeState},
    Mcts, MctsConfig,
};

/// Fewest simulations an arena search may run.
const MIN_SIMULATIONS: usize = 1000;

/// Most simulations an arena search may run.
const MAX_SIMULATIONS: usize = 300_000;

/// Most games a single match may play.
const MAX_GAMES: usize = 100;

/// UCT tic-tac-toe arena.
#[derive(Parser)]
#[command(name = "uct-arena")]
#[command(about = "Play tic-tac-toe matches between UCT search engines, or against one")]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play engine-vs-engine games and report each side's results.
    Match {
        /// Number of games to play (1-100).
        #[arg(short, long, default_value = "10")]
        games: usize,

        /// Simulations per move for X (1000-300000).
        #[arg(long, default_value = "1000")]
        x_simulations: usize,

        /// Simulations per move for O (1000-300000).
        #[arg(long, default_value = "1000")]
        o_simulations: usize,

        /// Use heavy (opponent-modelling) playouts for X.
        #[arg(long)]
        x_heavy: bool,

        /// Use heavy (opponent-modelling) playouts for O.
        #[arg(long)]
        o_heavy: bool,

        /// Random seed for reproducibility.
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Write a JSON summary of the match to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Play one game against the engine.
    Play {
        /// Side the human plays.
        #[arg(long, value_enum, default_value = "x")]
        human: Side,

        /// Simulations per engine move (1000-300000).
        #[arg(short, long, default_value = "1000")]
        simulations: usize,

        /// Use heavy (opponent-modelling) playouts for the engine.
        #[arg(long)]
        heavy: bool,

        /// Random seed for reproducibility.
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Side {
    X,
    O,
}

impl From<Side> for Player {
    fn from(side: Side) -> Self {
        match side {
            Side::X => Player::X,
            Side::O => Player::O,
        }
    }
}

/// Search settings for one side of a match.
#[derive(Clone, Copy, Debug, Serialize)]
struct Contender {
    simulations: usize,
    heavy: bool,
}

impl Contender {
    fn config(&self) -> MctsConfig {
        if self.heavy {
            MctsConfig::heavy(self.simulations)
        } else {
            MctsConfig::with_simulations(self.simulations)
        }
    }
}

/// A finished engine-vs-engine game.
#[derive(Debug)]
struct PlayedGame {
    seed: u64,
    moves: Vec<(Player, TicTacToeAction)>,
    final_state: TicTacToeState,
}

/// One move in the JSON summary, 1-based like the interactive prompt.
#[derive(Serialize, Debug)]
struct MoveRecord {
    player: String,
    row: u8,
    col: u8,
}

/// One game in the JSON summary.
#[derive(Serialize, Debug)]
struct GameRecord {
    seed: u64,
    moves: Vec<MoveRecord>,

    /// "X", "O", or `null` for a draw.
    winner: Option<String>,
}

impl From<&PlayedGame> for GameRecord {
    fn from(played: &PlayedGame) -> Self {
        Self {
            seed: played.seed,
            moves: played
                .moves
                .iter()
                .map(|(player, action)| MoveRecord {
                    player: player.to_string(),
                    row: action.row() + 1,
                    col: action.col() + 1,
                })
                .collect(),
            winner: played.final_state.winner().map(|p| p.to_string()),
        }
    }
}

/// Per-side results in the JSON summary.
#[derive(Serialize, Debug)]
struct SideSummary {
    #[serde(flatten)]
    contender: Contender,
    wins: u32,
    draws: u32,
    losses: u32,
}

impl SideSummary {
    fn new(contender: Contender, tally: &OutcomeTally) -> Self {
        Self {
            contender,
            wins: tally.wins(),
            draws: tally.draws(),
            losses: tally.losses(),
        }
    }
}

/// Whole-match JSON summary.
#[derive(Serialize, Debug)]
struct MatchSummary {
    x: SideSummary,
    o: SideSummary,
    games: Vec<GameRecord>,
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    Ok(())
}

/// Clamp a per-move simulation budget into the arena's range.
fn clamp_simulations(requested: usize) -> usize {
    let clamped = requested.clamp(MIN_SIMULATIONS, MAX_SIMULATIONS);
    if clamped != requested {
        warn!(requested, clamped, "simulation budget out of range");
    }
    clamped
}

/// Clamp a match length into the arena's range.
fn clamp_games(requested: usize) -> usize {
    let clamped = requested.clamp(1, MAX_GAMES);
    if clamped != requested {
        warn!(requested, clamped, "game count out of range");
    }
    clamped
}

/// Play one engine-vs-engine game; each side searches with its own generator.
fn play_match_game(
    game: &TicTacToe,
    x: &Contender,
    o: &Contender,
    seed: u64,
) -> uct_core::Result<PlayedGame> {
    let mut x_mcts = Mcts::new(x.config(), ChaCha8Rng::seed_from_u64(seed));
    let mut o_mcts = Mcts::new(o.config(), ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)));

    let mut state = game.initial_state();
    let mut moves = Vec::new();

    while !game.is_game_over(&state, Player::X) {
        let mover = game.next_to_move(&state);
        let mcts = match mover {
            Player::X => &mut x_mcts,
            Player::O => &mut o_mcts,
        };

        let result = mcts.search(game, &state, mover, mover.opposite())?;
        debug!(
            seed,
            %mover,
            simulations = mcts.config().num_simulations,
            playout = ?mcts.config().playout,
            action = %result.best_action,
            value = result.value,
            "move"
        );

        moves.push((mover, result.best_action));
        state = result.next_state;
    }

    Ok(PlayedGame {
        seed,
        moves,
        final_state: state,
    })
}

/// Record every game's result from `party`'s side.
fn tally_for(game: &TicTacToe, played: &[PlayedGame], party: Player) -> OutcomeTally {
    let mut tally = OutcomeTally::new();
    for record in played {
        tally.record(game.game_result(&record.final_state, party));
    }
    tally
}

fn describe(played: &PlayedGame) -> String {
    match played.final_state.winner() {
        Some(winner) => format!("{} wins in {} moves", winner, played.moves.len()),
        None => format!("draw after {} moves", played.moves.len()),
    }
}

/// Run the match command.
fn cmd_match(
    games: usize,
    x: Contender,
    o: Contender,
    seed: u64,
    output: Option<PathBuf>,
) -> Result<()> {
    let games = clamp_games(games);
    let x = Contender {
        simulations: clamp_simulations(x.simulations),
        ..x
    };
    let o = Contender {
        simulations: clamp_simulations(o.simulations),
        ..o
    };

    println!(
        "Playing {} games: X ({} sims{}) vs O ({} sims{})",
        games,
        x.simulations,
        if x.heavy { ", heavy" } else { "" },
        o.simulations,
        if o.heavy { ", heavy" } else { "" }
    );
    println!("Seed: {}", seed);

    let start = Instant::now();
    let game = TicTacToe;

    let played: Vec<PlayedGame> = (0..games)
        .into_par_iter()
        .map(|i| play_match_game(&game, &x, &o, seed.wrapping_add(i as u64 * 1000)))
        .collect::<uct_core::Result<_>>()
        .context("Match game failed")?;

    for (i, record) in played.iter().enumerate() {
        println!("Game {}: {}", i + 1, describe(record));
    }

    let x_tally = tally_for(&game, &played, Player::X);
    let o_tally = tally_for(&game, &played, Player::O);

    info!(
        games,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "match finished"
    );

    println!("\nCompleted in {:.2}s", start.elapsed().as_secs_f64());
    println!("X: {}", x_tally);
    println!("O: {}", o_tally);

    if let Some(path) = output {
        let summary = MatchSummary {
            x: SideSummary::new(x, &x_tally),
            o: SideSummary::new(o, &o_tally),
            games: played.iter().map(GameRecord::from).collect(),
        };

        let file =
            File::create(&path).with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &summary)
            .with_context(|| format!("Failed to write summary to {:?}", path))?;
        println!("Summary saved to: {:?}", path);
    }

    Ok(())
}

/// Run the play command.
fn cmd_play(human: Side, simulations: usize, heavy: bool, seed: u64) -> Result<()> {
    let engine = Contender {
        simulations: clamp_simulations(simulations),
        heavy,
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    human::play(
        &mut stdin.lock(),
        &mut stdout.lock(),
        human.into(),
        engine.config(),
        seed,
    )?;

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Match {
            games,
            x_simulations,
            o_simulations,
            x_heavy,
            o_heavy,
            seed,
            output,
        } => cmd_match(
            games,
            Contender {
                simulations: x_simulations,
                heavy: x_heavy,
            },
            Contender {
                simulations: o_simulations,
                heavy: o_heavy,
            },
            seed,
            output,
        ),

        Commands::Play {
            human,
            simulations,
            heavy,
            seed,
        } => cmd_play(human, simulations, heavy, seed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use uct_core::Outcome;

    fn light(simulations: usize) -> Contender {
        Contender {
            simulations,
            heavy: false,
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_match() {
        let cli = Cli::try_parse_from([
            "uct-arena",
            "match",
            "--games",
            "4",
            "--x-simulations",
            "2000",
            "--o-heavy",
        ])
        .unwrap();

        match cli.command {
            Commands::Match {
                games,
                x_simulations,
                o_simulations,
                x_heavy,
                o_heavy,
                ..
            } => {
                assert_eq!(games, 4);
                assert_eq!(x_simulations, 2000);
                assert_eq!(o_simulations, 1000);
                assert!(!x_heavy);
                assert!(o_heavy);
            }
            Commands::Play { .. } => panic!("expected match command"),
        }
    }

    #[test]
    fn test_cli_parses_play() {
        let cli = Cli::try_parse_from(["uct-arena", "play", "--human", "o"]).unwrap();
        match cli.command {
            Commands::Play { human, .. } => assert_eq!(Player::from(human), Player::O),
            Commands::Match { .. } => panic!("expected play command"),
        }
    }

    #[test]
    fn test_clamps() {
        assert_eq!(clamp_simulations(10), MIN_SIMULATIONS);
        assert_eq!(clamp_simulations(5000), 5000);
        assert_eq!(clamp_simulations(1_000_000), MAX_SIMULATIONS);

        assert_eq!(clamp_games(0), 1);
        assert_eq!(clamp_games(50), 50);
        assert_eq!(clamp_games(500), MAX_GAMES);
    }

    #[test]
    fn test_match_game_is_legal_and_finished() {
        let game = TicTacToe;
        let played = play_match_game(&game, &light(50), &light(50), 3).unwrap();

        assert!(game.is_game_over(&played.final_state, Player::X));
        assert!(played.moves.len() >= 5 && played.moves.len() <= 9);

        // Replaying the moves reaches the same final position
        let mut state = game.initial_state();
        for (i, &(player, action)) in played.moves.iter().enumerate() {
            let expected = if i % 2 == 0 { Player::X } else { Player::O };
            assert_eq!(player, expected);
            assert!(game.legal_actions(&state).contains(&action));
            state = game.apply(&state, action);
        }
        assert_eq!(state, played.final_state);
    }

    #[test]
    fn test_match_game_deterministic() {
        let game = TicTacToe;
        let heavy = Contender {
            simulations: 40,
            heavy: true,
        };

        let first = play_match_game(&game, &heavy, &light(60), 9).unwrap();
        let second = play_match_game(&game, &heavy, &light(60), 9).unwrap();
        assert_eq!(first.moves, second.moves);
    }

    #[test]
    fn test_tallies_mirror_each_other() {
        let game = TicTacToe;
        let played: Vec<PlayedGame> = (0..6)
            .map(|i| play_match_game(&game, &light(30), &light(30), i).unwrap())
            .collect();

        let x = tally_for(&game, &played, Player::X);
        let o = tally_for(&game, &played, Player::O);

        assert_eq!(x.total(), 6);
        assert_eq!(o.total(), 6);
        assert_eq!(x.wins(), o.losses());
        assert_eq!(x.losses(), o.wins());
        assert_eq!(x.draws(), o.draws());
        assert_eq!(x.get(Outcome::Draw), o.get(Outcome::Draw));
    }

    #[test]
    fn test_game_record_json() {
        let played = PlayedGame {
            seed: 5,
            moves: vec![(Player::X, TicTacToeAction(4)), (Player::O, TicTacToeAction(0))],
            final_state: TicTacToeState::from_cells("O...X....").unwrap(),
        };

        let json = serde_json::to_value(GameRecord::from(&played)).unwrap();
        assert_eq!(json["seed"], 5);
        assert_eq!(json["moves"][0]["player"], "X");
        assert_eq!(json["moves"][0]["row"], 2);
        assert_eq!(json["moves"][0]["col"], 2);
        assert_eq!(json["moves"][1]["row"], 1);
        assert!(json["winner"].is_null());
    }

    #[test]
    fn test_side_summary_flattens_contender() {
        let mut tally = OutcomeTally::new();
        tally.record(Outcome::Win);
        tally.record(Outcome::Draw);

        let json = serde_json::to_value(SideSummary::new(light(1000), &tally)).unwrap();
        assert_eq!(json["simulations"], 1000);
        assert_eq!(json["heavy"], false);
        assert_eq!(json["wins"], 1);
        assert_eq!(json["draws"], 1);
        assert_eq!(json["losses"], 0);
    }
}
