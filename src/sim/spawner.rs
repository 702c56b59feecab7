//! Periodic creation of packets and viruses

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{Entities, EntityId, EntityKind, FallingEntity};
use crate::tuning::Tuning;

/// Add one entity of `kind` unless the collection is at its cap.
///
/// The entity starts just above the visible area at a uniformly random x,
/// moving at `base_speed(kind) + level`.
pub fn spawn<'a>(
    entities: &'a mut Entities,
    kind: EntityKind,
    level: u32,
    id: EntityId,
    tuning: &Tuning,
    rng: &mut Pcg32,
) -> Option<&'a FallingEntity> {
    if entities.len() >= tuning.max_live(kind) {
        return None;
    }

    let max_x = (tuning.playfield_width - tuning.entity_size).max(0.0);
    let x = rng.random_range(0.0..=max_x);

    Some(entities.push(FallingEntity {
        id,
        kind,
        pos: Vec2::new(x, -tuning.entity_size),
        speed: tuning.base_speed(kind) + level,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_position_and_speed() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut packets = Entities::new();

        let packet = spawn(&mut packets, EntityKind::Packet, 3, 1, &tuning, &mut rng)
            .expect("below cap")
            .clone();
        assert_eq!(packet.speed, tuning.packet_base_speed + 3);
        assert_eq!(packet.pos.y, -tuning.entity_size);
        assert!(packet.pos.x >= 0.0 && packet.pos.x <= tuning.playfield_width - tuning.entity_size);
    }

    #[test]
    fn test_spawn_respects_cap() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut viruses = Entities::new();

        for id in 0..10 {
            spawn(&mut viruses, EntityKind::Virus, 1, id, &tuning, &mut rng);
        }
        assert_eq!(viruses.len(), tuning.max_viruses);
    }

    #[test]
    fn test_spawn_is_deterministic() {
        let tuning = Tuning::default();
        let mut rng1 = Pcg32::seed_from_u64(99);
        let mut rng2 = Pcg32::seed_from_u64(99);
        let mut a = Entities::new();
        let mut b = Entities::new();

        for id in 0..5 {
            spawn(&mut a, EntityKind::Packet, 1, id, &tuning, &mut rng1);
            spawn(&mut b, EntityKind::Packet, 1, id, &tuning, &mut rng2);
        }
        let xs_a: Vec<_> = a.iter().map(|e| e.pos.x).collect();
        let xs_b: Vec<_> = b.iter().map(|e| e.pos.x).collect();
        assert_eq!(xs_a, xs_b);
    }
}
