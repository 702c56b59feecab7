//! Data-driven game balance
//!
//! Every number the simulation reads comes from a [`Tuning`]. The defaults
//! match `crate::consts`; a JSON document can override any subset of fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::EntityKind;

/// Errors raised while loading a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(&'static str),
}

/// Balance and geometry parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub router_width: f32,
    pub router_height: f32,
    pub router_bottom_margin: f32,
    pub router_step: f32,
    pub entity_size: f32,
    pub packet_base_speed: u32,
    pub virus_base_speed: u32,
    pub packet_spawn_interval_ms: u32,
    pub virus_spawn_interval_ms: u32,
    pub max_packets: usize,
    pub max_viruses: usize,
    pub points_per_level: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: DEFAULT_PLAYFIELD_HEIGHT,
            router_width: ROUTER_WIDTH,
            router_height: ROUTER_HEIGHT,
            router_bottom_margin: ROUTER_BOTTOM_MARGIN,
            router_step: ROUTER_STEP,
            entity_size: ENTITY_SIZE,
            packet_base_speed: PACKET_BASE_SPEED,
            virus_base_speed: VIRUS_BASE_SPEED,
            packet_spawn_interval_ms: PACKET_SPAWN_INTERVAL_MS,
            virus_spawn_interval_ms: VIRUS_SPAWN_INTERVAL_MS,
            max_packets: MAX_PACKETS,
            max_viruses: MAX_VIRUSES,
            points_per_level: POINTS_PER_LEVEL,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Defaults with the playfield height taken from a viewport height
    pub fn for_viewport(viewport_height: f64) -> Self {
        Self {
            playfield_height: (viewport_height * PLAYFIELD_VIEWPORT_FRACTION) as f32,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.playfield_width <= 0.0 || self.playfield_height <= 0.0 {
            return Err(TuningError::Invalid("playfield must have a positive size"));
        }
        if self.router_width <= 0.0 || self.router_width > self.playfield_width {
            return Err(TuningError::Invalid("router must fit inside the playfield"));
        }
        if self.router_height <= 0.0 || self.router_step <= 0.0 {
            return Err(TuningError::Invalid("router height and step must be positive"));
        }
        if self.entity_size <= 0.0 || self.entity_size > self.playfield_width {
            return Err(TuningError::Invalid("entities must fit inside the playfield"));
        }
        if self.packet_spawn_interval_ms == 0 || self.virus_spawn_interval_ms == 0 {
            return Err(TuningError::Invalid("spawn intervals must be non-zero"));
        }
        if self.points_per_level == 0 {
            return Err(TuningError::Invalid("points_per_level must be non-zero"));
        }
        Ok(())
    }

    /// Speed a freshly spawned entity of `kind` starts with at level 0
    pub fn base_speed(&self, kind: EntityKind) -> u32 {
        match kind {
            EntityKind::Packet => self.packet_base_speed,
            EntityKind::Virus => self.virus_base_speed,
        }
    }

    pub fn spawn_interval_ms(&self, kind: EntityKind) -> u32 {
        match kind {
            EntityKind::Packet => self.packet_spawn_interval_ms,
            EntityKind::Virus => self.virus_spawn_interval_ms,
        }
    }

    pub fn max_live(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Packet => self.max_packets,
            EntityKind::Virus => self.max_viruses,
        }
    }

    /// Rightmost x the router may occupy
    #[inline]
    pub fn router_max_x(&self) -> f32 {
        self.playfield_width - self.router_width
    }

    /// Top edge of the router rectangle
    #[inline]
    pub fn router_top(&self) -> f32 {
        self.playfield_height - self.router_bottom_margin - self.router_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.router_max_x(), 440.0);
        assert_eq!(tuning.base_speed(EntityKind::Packet), 3);
        assert_eq!(tuning.base_speed(EntityKind::Virus), 4);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_packets": 2, "playfield_height": 300.0 }"#)
            .expect("valid tuning");
        assert_eq!(tuning.max_packets, 2);
        assert_eq!(tuning.playfield_height, 300.0);
        assert_eq!(tuning.router_width, ROUTER_WIDTH);
    }

    #[test]
    fn test_rejects_oversized_router() {
        let err = Tuning::from_json(r#"{ "router_width": 600.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_viewport_height() {
        let tuning = Tuning::for_viewport(1000.0);
        assert_eq!(tuning.playfield_height, 800.0);
    }
}
