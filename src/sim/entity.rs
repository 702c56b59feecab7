//! Falling entities and the arena that owns them

use glam::Vec2;

use super::collision::Rect;

/// Stable handle linking an entity to its on-screen element
pub type EntityId = u32;

/// What kind of thing is falling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Caught for a point
    Packet,
    /// Touching one ends the run
    Virus,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Packet, EntityKind::Virus];

    /// CSS class used by the browser view
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Packet => "packet",
            EntityKind::Virus => "virus",
        }
    }
}

/// A packet or virus moving down the playfield
#[derive(Debug, Clone, PartialEq)]
pub struct FallingEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Top-left corner
    pub pos: Vec2,
    /// Pixels per frame
    pub speed: u32,
}

impl FallingEntity {
    pub fn rect(&self, size: f32) -> Rect {
        Rect::new(self.pos.x, self.pos.y, size, size)
    }
}

/// Insertion-ordered collection of one kind of entity
#[derive(Debug, Clone, Default)]
pub struct Entities {
    items: Vec<FallingEntity>,
}

impl Entities {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FallingEntity> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, FallingEntity> {
        self.items.iter_mut()
    }

    pub fn get(&self, id: EntityId) -> Option<&FallingEntity> {
        self.items.iter().find(|e| e.id == id)
    }

    pub fn push(&mut self, entity: FallingEntity) -> &FallingEntity {
        self.items.push(entity);
        &self.items[self.items.len() - 1]
    }

    /// Remove one entity by id, preserving the order of the rest
    pub fn remove(&mut self, id: EntityId) -> Option<FallingEntity> {
        let index = self.items.iter().position(|e| e.id == id)?;
        Some(self.items.remove(index))
    }

    /// Keep entities matching `keep`, returning the ids of the ones dropped
    pub fn retain_collect<F>(&mut self, mut keep: F) -> Vec<EntityId>
    where
        F: FnMut(&FallingEntity) -> bool,
    {
        let mut removed = Vec::new();
        self.items.retain(|e| {
            let kept = keep(e);
            if !kept {
                removed.push(e.id);
            }
            kept
        });
        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a Entities {
    type Item = &'a FallingEntity;
    type IntoIter = std::slice::Iter<'a, FallingEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
