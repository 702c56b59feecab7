//! One display frame of simulation
//!
//! Order within a frame: move packets, move viruses, drop anything past the
//! bottom, then test collisions against what is left.

use super::collision;
use super::entity::{EntityId, EntityKind};
use super::motion;
use super::router::Router;
use super::state::{GameEvent, Session};
use crate::tuning::Tuning;

/// How a frame ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// A virus touched the router; the run is over
    VirusHit(EntityId),
}

/// Advance the session by one frame, appending what happened to `events`
pub fn tick(
    session: &mut Session,
    router: &Router,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> TickOutcome {
    session.time_ticks += 1;

    for kind in EntityKind::ALL {
        let fell = motion::advance(session.entities_mut(kind), tuning.playfield_height);
        events.extend(fell.into_iter().map(|id| GameEvent::FellOut { id, kind }));
    }

    let hits = collision::detect(router, &session.packets, &session.viruses, tuning);

    // Catches still count on the frame a virus lands
    for id in hits.caught {
        session.catch(id, tuning, events);
    }

    match hits.virus {
        Some(id) => {
            events.push(GameEvent::VirusHit { id });
            TickOutcome::VirusHit(id)
        }
        None => TickOutcome::Continue,
    }
}
