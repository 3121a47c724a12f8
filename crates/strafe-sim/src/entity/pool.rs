use glam::Vec2;

use crate::entity::entity::{Entity, EntityKind};
use crate::error::SpawnError;

/// Generation-checked handle to a pooled entity.
///
/// The index addresses a slot in the kind's pool; the generation is bumped
/// every time the slot is recycled, so a handle held across a release is
/// detected as stale instead of silently aliasing the new occupant.
///
/// Ordering is `(kind, index, generation)`, which gives collision pairs and
/// event lists a canonical, reproducible order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub index: u16,
    pub generation: u16,
}

impl EntityRef {
    /// Pack generation and index into one word for the render snapshot.
    /// Kind travels as its own field in the wire record.
    pub fn to_bits(self) -> u32 {
        (self.generation as u32) << 16 | self.index as u32
    }
}

struct Slot {
    generation: u16,
    entity: Entity,
}

/// Fixed-capacity arena for one entity kind.
///
/// The free list hands out the lowest free index first, so spawn order after
/// a release is deterministic and round-trip tests are reproducible.
pub struct EntityPool {
    kind: EntityKind,
    slots: Vec<Slot>,
    /// Free slot indices, kept sorted descending so `pop` yields the lowest.
    free: Vec<u16>,
    live: usize,
}

impl Clone for EntityPool {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            slots: self
                .slots
                .iter()
                .map(|s| Slot {
                    generation: s.generation,
                    entity: s.entity.clone(),
                })
                .collect(),
            free: self.free.clone(),
            live: self.live,
        }
    }
}

impl EntityPool {
    pub fn new(kind: EntityKind, capacity: usize) -> Self {
        let capacity = capacity.min(u16::MAX as usize);
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                entity: Entity::empty(kind),
            })
            .collect();
        let free = (0..capacity as u16).rev().collect();
        Self {
            kind,
            slots,
            free,
            live: 0,
        }
    }

    /// Activate the lowest free slot at `pos`. Fails when the pool is full.
    pub fn spawn(&mut self, pos: Vec2) -> Result<EntityRef, SpawnError> {
        let index = self
            .free
            .pop()
            .ok_or(SpawnError::PoolExhausted { kind: self.kind })?;
        let slot = &mut self.slots[index as usize];
        slot.entity.respawn_at(pos);
        self.live += 1;
        Ok(EntityRef {
            kind: self.kind,
            index,
            generation: slot.generation,
        })
    }

    /// Deactivate the slot and bump its generation so `r` (and any copies of
    /// it) stop resolving.
    pub fn release(&mut self, r: EntityRef) -> Result<(), SpawnError> {
        let slot = self
            .slots
            .get_mut(r.index as usize)
            .filter(|s| s.generation == r.generation && s.entity.active)
            .ok_or(SpawnError::StaleReference { reference: r })?;
        slot.entity = Entity::empty(self.kind);
        slot.generation = slot.generation.wrapping_add(1);
        self.live -= 1;
        // Keep the free list sorted descending: lowest index pops first.
        let pos = self
            .free
            .binary_search_by(|probe| r.index.cmp(probe))
            .unwrap_or_else(|p| p);
        self.free.insert(pos, r.index);
        Ok(())
    }

    /// Resolve a reference, rejecting stale generations.
    pub fn get(&self, r: EntityRef) -> Option<&Entity> {
        self.slots
            .get(r.index as usize)
            .filter(|s| s.generation == r.generation && s.entity.active)
            .map(|s| &s.entity)
    }

    pub fn get_mut(&mut self, r: EntityRef) -> Option<&mut Entity> {
        self.slots
            .get_mut(r.index as usize)
            .filter(|s| s.generation == r.generation && s.entity.active)
            .map(|s| &mut s.entity)
    }

    /// Iterate active entities in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = (EntityRef, &Entity)> {
        let kind = self.kind;
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.entity.active)
            .map(move |(i, s)| {
                (
                    EntityRef {
                        kind,
                        index: i as u16,
                        generation: s.generation,
                    },
                    &s.entity,
                )
            })
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (EntityRef, &mut Entity)> {
        let kind = self.kind;
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, s)| s.entity.active)
            .map(move |(i, s)| {
                (
                    EntityRef {
                        kind,
                        index: i as u16,
                        generation: s.generation,
                    },
                    &mut s.entity,
                )
            })
    }

    /// Number of active entities.
    pub fn live(&self) -> usize {
        self.live
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(cap: usize) -> EntityPool {
        EntityPool::new(EntityKind::Enemy, cap)
    }

    #[test]
    fn spawn_until_exhausted() {
        let mut p = pool(2);
        assert!(p.spawn(Vec2::ZERO).is_ok());
        assert!(p.spawn(Vec2::ZERO).is_ok());
        assert_eq!(
            p.spawn(Vec2::ZERO),
            Err(SpawnError::PoolExhausted {
                kind: EntityKind::Enemy
            })
        );
        assert_eq!(p.live(), 2);
    }

    #[test]
    fn release_then_spawn_reuses_lowest_index() {
        let mut p = pool(4);
        let a = p.spawn(Vec2::ZERO).unwrap();
        let b = p.spawn(Vec2::ZERO).unwrap();
        let _c = p.spawn(Vec2::ZERO).unwrap();
        assert_eq!((a.index, b.index), (0, 1));

        p.release(b).unwrap();
        p.release(a).unwrap();
        // Slot 0 comes back first even though slot 1 was freed first.
        let d = p.spawn(Vec2::ZERO).unwrap();
        assert_eq!(d.index, 0);
        let e = p.spawn(Vec2::ZERO).unwrap();
        assert_eq!(e.index, 1);
    }

    #[test]
    fn recycled_slot_has_strictly_greater_generation() {
        let mut p = pool(1);
        let a = p.spawn(Vec2::ZERO).unwrap();
        p.release(a).unwrap();
        let b = p.spawn(Vec2::ZERO).unwrap();
        assert_eq!(a.index, b.index);
        assert!(b.generation > a.generation);
    }

    #[test]
    fn stale_reference_is_rejected_everywhere() {
        let mut p = pool(1);
        let a = p.spawn(Vec2::ZERO).unwrap();
        p.release(a).unwrap();
        let _b = p.spawn(Vec2::ZERO).unwrap();

        assert!(p.get(a).is_none());
        assert!(p.get_mut(a).is_none());
        assert_eq!(
            p.release(a),
            Err(SpawnError::StaleReference { reference: a })
        );
        // The current occupant is untouched by the failed release.
        assert_eq!(p.live(), 1);
    }

    #[test]
    fn double_release_fails() {
        let mut p = pool(2);
        let a = p.spawn(Vec2::ZERO).unwrap();
        p.release(a).unwrap();
        assert!(p.release(a).is_err());
        assert_eq!(p.live(), 0);
    }

    #[test]
    fn no_two_active_entities_share_slot_and_generation() {
        let mut p = pool(3);
        let mut seen = std::collections::HashSet::new();
        let mut refs = Vec::new();
        // Churn the pool through several spawn/release rounds.
        for round in 0..5 {
            for _ in 0..3 {
                refs.push(p.spawn(Vec2::ZERO).unwrap());
            }
            for (r, _) in p.iter_active() {
                assert!(seen.insert((r.index, r.generation)), "round {}", round);
            }
            for r in refs.drain(..) {
                p.release(r).unwrap();
            }
        }
    }
}
