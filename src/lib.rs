//! Packet Catcher - catch packets with your router, dodge the viruses
//!
//! Core modules:
//! - `sim`: Pure simulation (spawning, motion, collisions, scoring)
//! - `game`: Start/hit/restart state machine around a session
//! - `platform`: Scheduled tasks, virtual clock, browser driver
//! - `persistence`: Key-value storage (LocalStorage on web)
//! - `tuning`: Data-driven game balance

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::{Game, Phase};
pub use highscores::HighScore;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Playfield width in pixels
    pub const PLAYFIELD_WIDTH: f32 = 500.0;
    /// Playfield height used when no viewport is available (headless runs)
    pub const DEFAULT_PLAYFIELD_HEIGHT: f32 = 640.0;
    /// Fraction of the viewport height taken by the playfield
    pub const PLAYFIELD_VIEWPORT_FRACTION: f64 = 0.8;

    /// Router defaults - sits near the bottom edge
    pub const ROUTER_WIDTH: f32 = 60.0;
    pub const ROUTER_HEIGHT: f32 = 20.0;
    pub const ROUTER_BOTTOM_MARGIN: f32 = 10.0;
    /// Horizontal distance per key press
    pub const ROUTER_STEP: f32 = 20.0;

    /// Packets and viruses are square
    pub const ENTITY_SIZE: f32 = 40.0;
    pub const PACKET_BASE_SPEED: u32 = 3;
    pub const VIRUS_BASE_SPEED: u32 = 4;

    /// Spawn periods (ms)
    pub const PACKET_SPAWN_INTERVAL_MS: u32 = 1500;
    pub const VIRUS_SPAWN_INTERVAL_MS: u32 = 2000;

    /// Population caps per kind
    pub const MAX_PACKETS: usize = 5;
    pub const MAX_VIRUSES: usize = 5;

    /// Score needed per level
    pub const POINTS_PER_LEVEL: u32 = 10;

    /// Nominal display refresh period for headless runs (60 Hz)
    pub const FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;
}

/// Status line shown above the playfield
pub fn status_line(score: u32, level: u32, high_score: u32) -> String {
    format!("Score: {score} | Level: {level} | High Score: {high_score}")
}
