//! Interactive game between a human at the terminal and the search engine.
//!
//! Input and output are generic so the loop can be driven by scripted
//! input in tests.

use anyhow::{bail, Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::{BufRead, Write};
use tracing::info;
use uct_core::Game;
use uct_mcts::{
    games::{Player, TicTacToe, TicTacToeAction, TicTacToeState},
    Mcts, MctsConfig,
};

/// Parse a 1-based `row col` pair into an action.
///
/// Accepts whitespace or a comma between the two numbers. Returns `None`
/// for anything that is not a cell on the board.
pub fn parse_move(line: &str) -> Option<TicTacToeAction> {
    let mut parts = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty());

    let row: u8 = parts.next()?.parse().ok()?;
    let col: u8 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || row == 0 || col == 0 {
        return None;
    }

    TicTacToeAction::from_row_col(row - 1, col - 1)
}

/// Prompt until the human names a free cell.
fn read_move<I: BufRead, O: Write>(
    input: &mut I,
    output: &mut O,
    state: &TicTacToeState,
) -> Result<TicTacToeAction> {
    let mut line = String::new();

    loop {
        write!(output, "Your move (row col, 1-3): ")?;
        output.flush()?;

        line.clear();
        let read = input.read_line(&mut line).context("Failed to read move")?;
        if read == 0 {
            bail!("input closed before the game finished");
        }

        match parse_move(&line) {
            Some(action) if state.is_valid_move(action.0 as usize) => return Ok(action),
            Some(_) => writeln!(output, "That cell is taken, try again.")?,
            None => writeln!(output, "Invalid move, enter a row and a column from 1 to 3.")?,
        }
    }
}

/// Play one game, the human as `human` and the engine as the other side.
///
/// Returns the winner, or `None` for a draw.
pub fn play<I: BufRead, O: Write>(
    input: &mut I,
    output: &mut O,
    human: Player,
    config: MctsConfig,
    seed: u64,
) -> Result<Option<Player>> {
    let game = TicTacToe;
    let engine = human.opposite();
    let mut mcts = Mcts::new(config, ChaCha8Rng::seed_from_u64(seed));
    let mut state = game.initial_state();

    writeln!(output, "You are {}, the engine is {}.", human, engine)?;
    writeln!(output, "{}", state)?;

    while !game.is_game_over(&state, human) {
        let mover = game.next_to_move(&state);

        let action = if mover == human {
            read_move(input, output, &state)?
        } else {
            let result = mcts
                .search(&game, &state, engine, human)
                .context("Engine search failed")?;
            info!(action = %result.best_action, value = result.value, "engine move");
            writeln!(
                output,
                "Engine plays row {} col {}.",
                result.best_action.row() + 1,
                result.best_action.col() + 1
            )?;
            result.best_action
        };

        state = game.apply(&state, action);
        writeln!(output, "{}", state)?;
    }

    let winner = state.winner();
    match winner {
        Some(player) if player == human => writeln!(output, "You win!")?,
        Some(_) => writeln!(output, "The engine wins.")?,
        None => writeln!(output, "Draw.")?,
    }

    Ok(winner)
}
