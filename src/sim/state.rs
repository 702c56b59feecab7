//! Per-run game state and the events it produces
//!
//! A [`Session`] is created when a run starts and thrown away on restart.

use rand_pcg::Pcg32;

use super::entity::{Entities, EntityId, EntityKind};
use super::spawner;
use crate::tuning::Tuning;

/// Something that happened during a frame or a spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Spawned { id: EntityId, kind: EntityKind },
    /// Left the bottom of the playfield uncaught
    FellOut { id: EntityId, kind: EntityKind },
    Caught { id: EntityId, score: u32 },
    LevelUp { level: u32 },
    NewHighScore { score: u32 },
    VirusHit { id: EntityId },
    GameOver { final_score: u32 },
}

/// Score, level, and the falling entities of one run
#[derive(Debug, Clone)]
pub struct Session {
    pub score: u32,
    /// Starts at 1, +1 every `points_per_level` catches
    pub level: u32,
    pub packets: Entities,
    pub viruses: Entities,
    /// Frames simulated so far
    pub time_ticks: u64,
    next_id: EntityId,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            packets: Entities::new(),
            viruses: Entities::new(),
            time_ticks: 0,
            next_id: 1,
        }
    }

    pub fn entities(&self, kind: EntityKind) -> &Entities {
        match kind {
            EntityKind::Packet => &self.packets,
            EntityKind::Virus => &self.viruses,
        }
    }

    pub fn entities_mut(&mut self, kind: EntityKind) -> &mut Entities {
        match kind {
            EntityKind::Packet => &mut self.packets,
            EntityKind::Virus => &mut self.viruses,
        }
    }

    /// Spawn one entity of `kind` if below its cap
    pub fn spawn(&mut self, kind: EntityKind, tuning: &Tuning, rng: &mut Pcg32) -> Option<GameEvent> {
        let id = self.next_id;
        let level = self.level;
        spawner::spawn(self.entities_mut(kind), kind, level, id, tuning, rng)?;
        self.next_id += 1;
        Some(GameEvent::Spawned { id, kind })
    }

    /// Remove a caught packet and score it. Unknown ids are ignored.
    pub fn catch(&mut self, id: EntityId, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        if self.packets.remove(id).is_none() {
            return;
        }

        self.score += 1;
        events.push(GameEvent::Caught {
            id,
            score: self.score,
        });

        if self.score % tuning.points_per_level == 0 {
            self.level += 1;
            self.increase_difficulty();
            log::info!("Level up: {}", self.level);
            events.push(GameEvent::LevelUp { level: self.level });
        }
    }

    /// Every live entity of both kinds falls one pixel per frame faster.
    /// Entities spawned later only get `base + level`.
    fn increase_difficulty(&mut self) {
        for entity in self.packets.iter_mut().chain(self.viruses.iter_mut()) {
            entity.speed += 1;
        }
    }

    pub fn live_count(&self) -> usize {
        self.packets.len() + self.viruses.len()
    }
}
