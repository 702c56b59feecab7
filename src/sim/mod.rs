//! Pure simulation module
//!
//! All gameplay logic lives here. No timers, no DOM, no storage:
//! - One call to `tick` per display frame
//! - One call to `Session::spawn` per spawn-timer firing
//! - Seeded RNG only, so headless runs replay exactly

pub mod collision;
pub mod entity;
pub mod motion;
pub mod router;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Collisions, Rect, detect};
pub use entity::{Entities, EntityId, EntityKind, FallingEntity};
pub use router::{Direction, Router};
pub use state::{GameEvent, Session};
pub use tick::{TickOutcome, tick};
