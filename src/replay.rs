// Replay module for checking logged decisions against the current engine
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Re-run the decision pipeline on each logged snapshot
// 3. Check the logged move is consistent with the recomputed one
// 4. Print a summary report
//
// Default-mode moves are random, so for those turns only membership in the
// safe set is checked. Starving and fallback turns must match exactly.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::Config;
use crate::debug_logger::DebugLogEntry;
use crate::engine::{self, Decision, Mode};
use crate::types::{Direction, Game, GameState};

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: i32,
    pub original_move: Direction,
    pub replayed: Decision,
    pub safe_moves_match: bool,
    pub mode_match: bool,
    pub matches: bool,
}

/// Statistics for a complete replay session
#[derive(Debug, Default, PartialEq)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub starving_turns: usize,
    pub fallback_turns: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine { config, verbose }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<DebugLogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: DebugLogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Rebuilds the snapshot a log entry was decided from
    fn state_for(entry: &DebugLogEntry) -> GameState {
        GameState {
            game: Game {
                id: entry.game_id.clone(),
                ruleset: HashMap::new(),
                timeout: 0,
                source: String::new(),
            },
            turn: entry.turn,
            board: entry.board.clone(),
            you: entry.you.clone(),
        }
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &DebugLogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let state = Self::state_for(entry);
        let mut rng = StdRng::seed_from_u64(self.config.rng.seed.unwrap_or_default());
        let replayed = engine::decide(&state, &mut rng)?;

        let safe_moves_match = replayed.safe_moves == entry.safe_moves;
        let move_consistent = if replayed.fallback || replayed.mode == Mode::Starving {
            replayed.chosen == entry.chosen_move
        } else {
            replayed.safe_moves.contains(&entry.chosen_move)
        };
        let mode_match = replayed.mode == entry.mode;
        let matches = safe_moves_match
            && mode_match
            && move_consistent
            && replayed.fallback == entry.fallback;

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: MATCH - {} (mode: {}, safe: {:?})",
                    entry.turn, entry.chosen_move, replayed.mode, replayed.safe_moves
                );
            } else {
                warn!(
                    "Turn {}: MISMATCH - Original: {} {} {:?}, Replayed: {} {} {:?}",
                    entry.turn,
                    entry.mode,
                    entry.chosen_move,
                    entry.safe_moves,
                    replayed.mode,
                    replayed.chosen,
                    replayed.safe_moves
                );
            }
        }

        Ok(ReplayResult {
            turn: entry.turn,
            original_move: entry.chosen_move,
            replayed,
            safe_moves_match,
            mode_match,
            matches,
        })
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[DebugLogEntry]) -> Vec<ReplayResult> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => warn!("Failed to replay turn {}: {}", entry.turn, e),
            }
        }

        results
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[DebugLogEntry],
        turn_numbers: &[i32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;

            results.push(self.replay_entry(entry)?);
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches: total_turns - matches,
            starving_turns: results
                .iter()
                .filter(|r| r.replayed.mode == Mode::Starving)
                .count(),
            fallback_turns: results.iter().filter(|r| r.replayed.fallback).count(),
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("Starving Turns: {}", stats.starving_turns);
        println!("Fallback Turns: {}", stats.fallback_turns);
        println!("═══════════════════════════════════════════════════════════\n");

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Turn {}: {} → {} (mode: {}, mode {}, safe moves {})",
                    result.turn,
                    result.original_move,
                    result.replayed.chosen,
                    result.replayed.mode,
                    if result.mode_match { "agrees" } else { "differs" },
                    if result.safe_moves_match { "agree" } else { "differ" }
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[DebugLogEntry],
        expected_moves: &[(i32, Vec<Direction>)], // (turn, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            if !acceptable.contains(&entry.chosen_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    entry.chosen_move
                ));
            }
        }

        Ok(())
    }
}
