// Turn decision engine
//
// One pass per turn, no state carried between calls:
//   enumerate candidates -> drop fatal ones -> pick a mode -> pick a move,
// with a fixed fallback when nothing survives the filter.
//
// The safety model is one-ply and conservative. Every body segment in the
// snapshot, tails included, is treated as solid for the coming move, and
// opponents are assumed not to move at all.

use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Battlesnake, Board, Coord, Direction, GameState};

/// Move returned when no candidate survives the safety filter
pub const FALLBACK_MOVE: Direction = Direction::Down;

/// Strategy used to choose among safe moves for a single turn.
///
/// New strategies slot in here as additional variants, each with its own
/// selection rule in `Mode::select` and picker in `pick_move`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Random walk over the safe moves
    Default,
    /// Greedy single step toward the nearest food
    Starving,
}

impl Mode {
    /// Starving when health is strictly below the Manhattan length of the
    /// board diagonal, otherwise default.
    pub fn select(board: &Board, you: &Battlesnake) -> Mode {
        if you.health < starvation_threshold(board) {
            Mode::Starving
        } else {
            Mode::Default
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Default => "default",
            Mode::Starving => "starving",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one turn's decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub mode: Mode,
    pub safe_moves: Vec<Direction>,
    pub chosen: Direction,
    pub fallback: bool,
}

/// Health below which the snake goes looking for food
pub fn starvation_threshold(board: &Board) -> i32 {
    (board.height - 1) + (board.width - 1)
}

/// Coordinate our head would occupy after `direction`
pub fn next_head(state: &GameState, direction: Direction) -> Result<Coord, String> {
    let head = state
        .you
        .head_segment()
        .ok_or_else(|| format!("{} snake '{}' has an empty body", state.game.id, state.you.id))?;
    Ok(direction.apply(&head))
}

/// Computes the moves that do not kill us this turn, in `Direction::all()` order
pub fn safe_moves(state: &GameState) -> Result<Vec<Direction>, String> {
    let you = &state.you;
    let board = &state.board;
    let head = you
        .head_segment()
        .ok_or_else(|| format!("{} snake '{}' has an empty body", state.game.id, you.id))?;

    let mut candidates = Direction::all().to_vec();

    // Never reverse onto our own neck
    match you.neck() {
        Some(neck) => {
            if let Some(back) = Direction::towards(&head, &neck) {
                candidates.retain(|&d| d != back);
            }
        }
        None => warn!(
            "{} Snake '{}' has a single segment, skipping neck check",
            state.game.id, you.id
        ),
    }

    // Walls
    if head.x == 0 {
        candidates.retain(|&d| d != Direction::Left);
    }
    if head.x == board.width - 1 {
        candidates.retain(|&d| d != Direction::Right);
    }
    if head.y == 0 {
        candidates.retain(|&d| d != Direction::Down);
    }
    if head.y == board.height - 1 {
        candidates.retain(|&d| d != Direction::Up);
    }

    // Our own body, tail included
    for dir in Direction::all() {
        let target = dir.apply(&head);
        if you.body.contains(&target) {
            info!("{} Body collision prevents moving {}", state.game.id, dir);
            candidates.retain(|&d| d != dir);
        }
    }

    // Everybody else, as they stand right now
    for dir in Direction::all() {
        let target = dir.apply(&head);
        let hit = board
            .snakes
            .iter()
            .filter(|snake| snake.id != you.id)
            .any(|snake| snake.body.contains(&target));
        if hit {
            info!("{} Snake collision prevents moving {}", state.game.id, dir);
            candidates.retain(|&d| d != dir);
        }
    }

    Ok(candidates)
}

pub fn manhattan_distance(a: Coord, b: Coord) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Distance from `target` to the closest food, or `height + width` when the
/// board has none.
pub fn nearest_food_distance(board: &Board, target: Coord) -> i32 {
    board
        .food
        .iter()
        .map(|&food| manhattan_distance(target, food))
        .min()
        .unwrap_or(board.height + board.width)
}

/// Chooses one of `safe` according to `mode`. Returns None only when `safe` is empty.
///
/// Starving ties go to whichever candidate comes first in `safe`.
pub fn pick_move<R: Rng>(
    mode: Mode,
    safe: &[Direction],
    state: &GameState,
    rng: &mut R,
) -> Option<Direction> {
    if safe.is_empty() {
        return None;
    }

    match mode {
        Mode::Default => Some(safe[rng.random_range(0..safe.len())]),
        Mode::Starving => {
            let mut best = safe[0];
            let mut best_distance = nearest_food_distance(&state.board, next_head(state, best).ok()?);
            for &dir in &safe[1..] {
                let distance = nearest_food_distance(&state.board, next_head(state, dir).ok()?);
                if distance < best_distance {
                    best = dir;
                    best_distance = distance;
                }
            }
            Some(best)
        }
    }
}

/// Runs the whole pipeline for one turn
pub fn decide<R: Rng>(state: &GameState, rng: &mut R) -> Result<Decision, String> {
    let safe = safe_moves(state)?;
    let mode = Mode::select(&state.board, &state.you);

    let decision = match pick_move(mode, &safe, state, rng) {
        Some(chosen) => Decision {
            mode,
            safe_moves: safe,
            chosen,
            fallback: false,
        },
        None => Decision {
            mode,
            safe_moves: safe,
            chosen: FALLBACK_MOVE,
            fallback: true,
        },
    };

    Ok(decision)
}
