// Library exports for the Battlesnake bot
// The server binary, the replay tool and the integration tests all share this core

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod engine;
pub mod replay;
pub mod types;
