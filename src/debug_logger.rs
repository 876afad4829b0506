// Debug logging module for asynchronous game state logging
//
// This module provides fire-and-forget async logging to avoid blocking
// the main request/response cycle. Each turn's decision is written to a JSONL file
// that the replay tool can read back.

use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::engine::{Decision, Mode};
use crate::types::{Battlesnake, Board, Direction};

/// A single debug log entry, one per line
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DebugLogEntry {
    pub game_id: String,
    pub turn: i32,
    pub mode: Mode,
    pub safe_moves: Vec<Direction>,
    pub chosen_move: Direction,
    pub fallback: bool,
    pub board: Board,
    pub you: Battlesnake,
    pub timestamp: String,
}

impl DebugLogEntry {
    pub fn new(game_id: &str, turn: i32, board: &Board, you: &Battlesnake, decision: &Decision) -> Self {
        DebugLogEntry {
            game_id: game_id.to_string(),
            turn,
            mode: decision.mode,
            safe_moves: decision.safe_moves.clone(),
            chosen_move: decision.chosen,
            fallback: decision.fallback,
            board: board.clone(),
            you: you.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs a move decision asynchronously (fire-and-forget)
    /// Spawns onto the current tokio runtime; outside a runtime the entry is dropped.
    pub fn log_move(&self, entry: DebugLogEntry) {
        if !self.enabled {
            return;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No tokio runtime available, dropping debug log entry for turn {}", entry.turn);
                return;
            }
        };

        let file_handle = self.file.clone();
        handle.spawn(async move {
            Self::log_move_internal(file_handle, entry).await;
        });
    }

    /// Writes one entry and flushes. Awaitable counterpart of `log_move`.
    pub async fn write_entry(&self, entry: DebugLogEntry) {
        if !self.enabled {
            return;
        }
        Self::log_move_internal(self.file.clone(), entry).await;
    }

    /// Internal async function that performs the actual file write
    async fn log_move_internal(file_handle: Arc<Mutex<Option<File>>>, entry: DebugLogEntry) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}
