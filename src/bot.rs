// Welcome to
// __________         __    __  .__                               __
// \______   \_____ _/  |__/  |_|  |   ____   ______ ____ _____  |  | __ ____
//  |    |  _/\__  \\   __\   __\  | _/ __ \ /  ___//    \\__  \ |  |/ // __ \
//  |    |   \ / __ \|  |  |  | |  |_\  ___/ \___ \|   |  \/ __ \|    <\  ___/
//  |________/(______/__|  |__| |____/\_____>______>___|__(______/__|__\\_____>
//
// Endpoint behaviour for the snake. The decision itself lives in `engine`;
// this file wires it to configuration, randomness and logging.

use log::{error, info};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::debug_logger::{DebugLogEntry, DebugLogger};
use crate::engine::{self, Decision, FALLBACK_MOVE};
use crate::types::{GameState, InfoResponse, MoveResponse};

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    rng: Mutex<StdRng>,
    debug_logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        let rng = match config.rng.seed {
            Some(seed) => {
                info!("Using fixed RNG seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_os_rng(),
        };

        Bot {
            config,
            rng: Mutex::new(rng),
            debug_logger: DebugLogger::disabled(),
        }
    }

    /// Attaches a debug logger that records every move decision
    pub fn with_debug_logger(mut self, debug_logger: DebugLogger) -> Self {
        self.debug_logger = debug_logger;
        self
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> InfoResponse {
        info!("INFO");

        let appearance = &self.config.appearance;
        InfoResponse {
            apiversion: appearance.apiversion.clone(),
            author: appearance.author.clone(),
            color: appearance.color.clone(),
            head: appearance.head.clone(),
            tail: appearance.tail.clone(),
        }
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, state: &GameState) {
        info!("{} START", state.game.id);
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, state: &GameState) {
        info!("{} END", state.game.id);
    }

    /// Runs the decision pipeline against the shared random source
    pub fn decide(&self, state: &GameState) -> Result<Decision, String> {
        let mut rng = self.rng.lock();
        engine::decide(state, &mut *rng)
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// Always answers with one of the four direction tokens. Malformed snapshots
    /// are logged and answered with the fallback move.
    pub fn get_move(&self, state: &GameState) -> MoveResponse {
        let decision = match self.decide(state) {
            Ok(decision) => decision,
            Err(e) => {
                error!(
                    "{} MOVE {}: rejected snapshot ({}), moving {}",
                    state.game.id, state.turn, e, FALLBACK_MOVE
                );
                return MoveResponse::new(FALLBACK_MOVE);
            }
        };

        if decision.fallback {
            info!(
                "{} MOVE {}: No safe moves detected! Moving {}",
                state.game.id, state.turn, decision.chosen
            );
        } else {
            info!(
                "{} MODE {} MOVE {}: {}",
                state.game.id, decision.mode, state.turn, decision.chosen
            );
        }

        self.debug_logger.log_move(DebugLogEntry::new(
            &state.game.id,
            state.turn,
            &state.board,
            &state.you,
            &decision,
        ));

        MoveResponse::new(decision.chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Battlesnake, Board, Coord, Direction, Game};
    use std::collections::HashMap;

    fn seeded_config(seed: u64) -> Config {
        let mut config = Config::default_hardcoded();
        config.rng.seed = Some(seed);
        config
    }

    fn game_state(body: Vec<Coord>, health: i32) -> GameState {
        let you = Battlesnake {
            id: "me".to_string(),
            name: "me".to_string(),
            health,
            head: body.first().copied().unwrap_or(Coord::new(0, 0)),
            length: body.len() as i32,
            body,
            latency: "0".to_string(),
            shout: None,
        };
        GameState {
            game: Game {
                id: "bot-test".to_string(),
                ruleset: HashMap::new(),
                timeout: 500,
                source: String::new(),
            },
            turn: 1,
            board: Board {
                height: 11,
                width: 11,
                food: vec![],
                snakes: vec![you.clone()],
                hazards: vec![],
            },
            you,
        }
    }

    #[test]
    fn test_info_uses_appearance_config() {
        let bot = Bot::new(Config::default_hardcoded());
        let info = bot.info();
        assert_eq!(info.apiversion, "1");
        assert_eq!(info.color, "#023047");
        assert_eq!(info.head, "pixel");
        assert_eq!(info.tail, "pixel");
    }

    #[test]
    fn test_same_seed_same_walk() {
        let state = game_state(vec![Coord::new(5, 5), Coord::new(5, 4)], 90);
        let a = Bot::new(seeded_config(9));
        let b = Bot::new(seeded_config(9));
        for _ in 0..10 {
            assert_eq!(a.get_move(&state), b.get_move(&state));
        }
    }

    #[test]
    fn test_empty_body_falls_back() {
        let bot = Bot::new(seeded_config(1));
        let state = game_state(vec![], 90);
        assert_eq!(bot.get_move(&state).chosen, Direction::Down);
    }
}
