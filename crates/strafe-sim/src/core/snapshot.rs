use glam::Vec2;

use crate::collision::detector::CollisionEvent;
use crate::entity::entity::EntityKind;
use crate::entity::pool::EntityRef;

/// Scalar session state. Owned by the loop, passed around explicitly;
/// there are no ambient globals behind this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimState {
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    /// Ticks run since the session started (faulted ticks excluded).
    pub tick_index: u64,
    pub paused: bool,
    pub game_over: bool,
}

impl SimState {
    pub fn new(lives: u32) -> Self {
        Self {
            score: 0,
            lives,
            level: 1,
            tick_index: 0,
            paused: false,
            game_over: false,
        }
    }

    /// Award points and recompute the level from the running total.
    pub fn add_score(&mut self, points: u32) {
        self.score += points;
        self.level = 1 + self.score / 1000;
    }
}

/// One entity as the renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityView {
    /// Generation and slot index packed into one word; unique per live
    /// entity together with `kind`.
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub rotation: f32,
    pub visual_state: u8,
}

impl EntityView {
    pub fn new(re: EntityRef, pos: Vec2, rotation: f32, visual_state: u8) -> Self {
        Self {
            id: re.to_bits(),
            kind: re.kind,
            pos,
            rotation,
            visual_state,
        }
    }
}

/// Read-only, value-copied view of one completed step, published for the
/// renderer and HUD. Mutating a snapshot cannot touch simulation state, and
/// nothing in here is fed back as simulation input.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub tick_index: u64,
    pub entities: Vec<EntityView>,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub game_over: bool,
    /// Collision events from the last completed tick, for effect triggers.
    pub events: Vec<CollisionEvent>,
}

impl Snapshot {
    /// Refill from current sim state without reallocating where possible.
    pub fn refill(
        &mut self,
        state: &SimState,
        entities: impl Iterator<Item = EntityView>,
        events: &[CollisionEvent],
    ) {
        self.tick_index = state.tick_index;
        self.score = state.score;
        self.lives = state.lives;
        self.level = state.level;
        self.game_over = state.game_over;
        self.entities.clear();
        self.entities.extend(entities);
        self.events.clear();
        self.events.extend_from_slice(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_drives_level() {
        let mut s = SimState::new(3);
        assert_eq!(s.level, 1);
        s.add_score(999);
        assert_eq!(s.level, 1);
        s.add_score(1);
        assert_eq!(s.level, 2);
        s.add_score(2500);
        assert_eq!(s.level, 4);
    }

    #[test]
    fn view_id_distinguishes_generations() {
        let a = EntityRef {
            kind: EntityKind::Enemy,
            index: 3,
            generation: 0,
        };
        let b = EntityRef {
            kind: EntityKind::Enemy,
            index: 3,
            generation: 1,
        };
        assert_ne!(a.to_bits(), b.to_bits());
    }
}
