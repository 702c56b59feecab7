//! Axis-aligned bounding-box collision between the router and falling entities
//!
//! Edges that merely touch count as overlapping, the same way two DOM
//! bounding rectangles sharing a border do.

use super::entity::{Entities, EntityId};
use super::router::Router;
use crate::tuning::Tuning;

/// Screen-space rectangle (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
        }
    }

    /// True unless one rectangle lies strictly beside the other
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.top > other.bottom
            || self.bottom < other.top
            || self.right < other.left
            || self.left > other.right)
    }
}

/// Everything the router touched this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collisions {
    /// Packets overlapping the router, in insertion order
    pub caught: Vec<EntityId>,
    /// First virus overlapping the router, if any
    pub virus: Option<EntityId>,
}

impl Collisions {
    pub fn is_fatal(&self) -> bool {
        self.virus.is_some()
    }
}

/// Test every packet and virus against the router's current rectangle
pub fn detect(
    router: &Router,
    packets: &Entities,
    viruses: &Entities,
    tuning: &Tuning,
) -> Collisions {
    let router_rect = router.rect(tuning);

    let caught = packets
        .iter()
        .filter(|p| p.rect(tuning.entity_size).overlaps(&router_rect))
        .map(|p| p.id)
        .collect();

    let virus = viruses
        .iter()
        .find(|v| v.rect(tuning.entity_size).overlaps(&router_rect))
        .map(|v| v.id);

    Collisions { caught, virus }
}
