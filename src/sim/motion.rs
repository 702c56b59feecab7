//! Per-frame vertical motion
//!
//! One integer step per frame: speed is pixels per frame, not per second.

use super::entity::{Entities, EntityId};

/// Move every entity down by its speed and drop the ones past the bottom.
///
/// Returns the ids that fell out, in insertion order.
pub fn advance(entities: &mut Entities, playfield_height: f32) -> Vec<EntityId> {
    for entity in entities.iter_mut() {
        entity.pos.y += entity.speed as f32;
    }
    entities.retain_collect(|e| e.pos.y <= playfield_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{EntityKind, FallingEntity};
    use glam::Vec2;

    fn falling(id: EntityId, y: f32, speed: u32) -> FallingEntity {
        FallingEntity {
            id,
            kind: EntityKind::Virus,
            pos: Vec2::new(10.0, y),
            speed,
        }
    }

    #[test]
    fn test_advance_moves_by_speed() {
        let mut entities = Entities::new();
        entities.push(falling(1, -40.0, 4));
        let removed = advance(&mut entities, 100.0);
        assert!(removed.is_empty());
        assert_eq!(entities.get(1).map(|e| e.pos.y), Some(-36.0));
    }

    #[test]
    fn test_advance_removes_past_bottom() {
        let mut entities = Entities::new();
        entities.push(falling(1, 95.0, 5)); // lands exactly on the edge, stays
        entities.push(falling(2, 96.0, 5));
        entities.push(falling(3, 97.0, 5));
        entities.push(falling(4, 0.0, 5));

        let removed = advance(&mut entities, 100.0);
        assert_eq!(removed, vec![2, 3]);
        let ids: Vec<_> = entities.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }
}
