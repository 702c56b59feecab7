//! The player's router and keyboard movement

use super::collision::Rect;
use crate::tuning::Tuning;

/// Horizontal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Map a `KeyboardEvent.key` value to a direction
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// The player-controlled catcher. Only `x` moves; the rest is tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Router {
    /// Left edge, always within `[0, playfield_width - router_width]`
    pub x: f32,
}

impl Router {
    pub fn centered(tuning: &Tuning) -> Self {
        Self {
            x: tuning.router_max_x() / 2.0,
        }
    }

    /// Move one step, clamped to the playfield
    pub fn nudge(&mut self, direction: Direction, tuning: &Tuning) {
        let delta = match direction {
            Direction::Left => -tuning.router_step,
            Direction::Right => tuning.router_step,
        };
        self.x = (self.x + delta).clamp(0.0, tuning.router_max_x());
    }

    pub fn rect(&self, tuning: &Tuning) -> Rect {
        Rect::new(
            self.x,
            tuning.router_top(),
            tuning.router_width,
            tuning.router_height,
        )
    }
}
