//! Entity pool
//!
//! Chain segments and pickups are never allocated one by one; they borrow a
//! handle from a pool and give it back. Released ids are handed out again, so
//! identity is reused across chain rebuilds.

use serde::{Deserialize, Serialize};

/// What a pooled entity is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Head,
    Body,
    Pickup,
}

/// Opaque pooled entity handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    pub id: u32,
    pub kind: EntityKind,
}

/// Acquire/release capability consumed by the chain and the apple spawner
pub trait EntityPool {
    fn acquire(&mut self, kind: EntityKind) -> Handle;
    fn release(&mut self, handle: Handle);

    fn acquire_head(&mut self) -> Handle {
        self.acquire(EntityKind::Head)
    }

    fn acquire_body(&mut self) -> Handle {
        self.acquire(EntityKind::Body)
    }

    fn acquire_pickup(&mut self) -> Handle {
        self.acquire(EntityKind::Pickup)
    }
}

/// Free-list pool that grows on demand
#[derive(Debug, Clone, Default)]
pub struct SlotPool {
    heads: Vec<u32>,
    bodies: Vec<u32>,
    pickups: Vec<u32>,
    live: usize,
    next_id: u32,
}

impl SlotPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate `count` ids of the given kind
    pub fn with_prewarmed(kind: EntityKind, count: usize) -> Self {
        let mut pool = Self::new();
        for _ in 0..count {
            let id = pool.allocate_id();
            pool.free_list(kind).push(id);
        }
        pool
    }

    /// Handles currently checked out
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Handles waiting for reuse
    pub fn free_count(&self) -> usize {
        self.heads.len() + self.bodies.len() + self.pickups.len()
    }

    /// Distinct ids ever created
    pub fn capacity(&self) -> usize {
        self.next_id as usize
    }

    fn free_list(&mut self, kind: EntityKind) -> &mut Vec<u32> {
        match kind {
            EntityKind::Head => &mut self.heads,
            EntityKind::Body => &mut self.bodies,
            EntityKind::Pickup => &mut self.pickups,
        }
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl EntityPool for SlotPool {
    fn acquire(&mut self, kind: EntityKind) -> Handle {
        let id = match self.free_list(kind).pop() {
            Some(id) => id,
            None => {
                let id = self.allocate_id();
                log::debug!("Pool grew to {} ({:?})", self.next_id, kind);
                id
            }
        };
        self.live += 1;
        Handle { id, kind }
    }

    fn release(&mut self, handle: Handle) {
        self.live = self.live.saturating_sub(1);
        self.free_list(handle.kind).push(handle.id);
    }
}
