//! Flat snapshot buffer layout shared with the JavaScript host.
//! Must stay in sync with the TypeScript reader.
//!
//! Layout (all values in f32 / 4 bytes):
//! ```text
//! [Header: 16 floats]
//! [Entities: max_entities × ENTITY_FLOATS]
//! [Events: max_events × EVENT_FLOATS]
//! [Sounds: max_sounds × SOUND_FLOATS]
//! ```
//!
//! Capacities are fixed at init and written into the header; the host reads
//! them once to compute section offsets.

use bytemuck::{Pod, Zeroable};

use crate::config::SimConfig;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_TICK_INDEX: usize = 1;
pub const HEADER_MAX_ENTITIES: usize = 2;
pub const HEADER_ENTITY_COUNT: usize = 3;
pub const HEADER_MAX_EVENTS: usize = 4;
pub const HEADER_EVENT_COUNT: usize = 5;
pub const HEADER_MAX_SOUNDS: usize = 6;
pub const HEADER_SOUND_COUNT: usize = 7;
pub const HEADER_SCORE: usize = 8;
pub const HEADER_LIVES: usize = 9;
pub const HEADER_LEVEL: usize = 10;
pub const HEADER_WORLD_WIDTH: usize = 11;
pub const HEADER_WORLD_HEIGHT: usize = 12;
pub const HEADER_GAME_OVER: usize = 13;
pub const HEADER_TICKS_DROPPED: usize = 14;
pub const HEADER_TICK_FAULTS: usize = 15;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// One entity as it crosses the wire.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct EntityRecord {
    /// Generation-qualified id, folded to stay exactly representable as f32.
    pub id: f32,
    pub kind: f32,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub visual_state: f32,
}

/// One collision event as it crosses the wire.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct EventRecord {
    pub a_id: f32,
    pub a_kind: f32,
    pub b_id: f32,
    pub b_kind: f32,
    pub normal_x: f32,
    pub normal_y: f32,
    pub penetration: f32,
    pub _pad: f32,
}

/// One voice command as it crosses the wire.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct SoundRecord {
    /// 0 = start, 1 = stop.
    pub op: f32,
    pub kind: f32,
    pub slot: f32,
    pub gain: f32,
    pub pan: f32,
    pub _pad: f32,
}

/// Floats per entity record (wire format — never changes).
pub const ENTITY_FLOATS: usize = std::mem::size_of::<EntityRecord>() / 4;

/// Floats per event record (wire format — never changes).
pub const EVENT_FLOATS: usize = std::mem::size_of::<EventRecord>() / 4;

/// Floats per sound record (wire format — never changes).
pub const SOUND_FLOATS: usize = std::mem::size_of::<SoundRecord>() / 4;

/// Fold a 32-bit entity id into the 24 bits an f32 holds exactly:
/// the slot index plus the low 8 generation bits. Collisions would need
/// 256 recycles of one slot between two host reads.
pub fn wire_entity_id(id_bits: u32) -> f32 {
    let index = id_bits & 0xFFFF;
    let generation = (id_bits >> 16) & 0xFF;
    (generation << 16 | index) as f32
}

/// Runtime-computed buffer layout, sized from the configured capacities.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotLayout {
    pub max_entities: usize,
    pub max_events: usize,
    pub max_sounds: usize,

    /// Offset (in floats) where entity records begin.
    pub entity_offset: usize,
    /// Offset (in floats) where event records begin.
    pub event_offset: usize,
    /// Offset (in floats) where sound records begin.
    pub sound_offset: usize,

    /// Total buffer size in floats.
    pub total_floats: usize,
}

impl SnapshotLayout {
    pub fn new(max_entities: usize, max_events: usize, max_sounds: usize) -> Self {
        let entity_offset = HEADER_FLOATS;
        let event_offset = entity_offset + max_entities * ENTITY_FLOATS;
        let sound_offset = event_offset + max_events * EVENT_FLOATS;
        let total_floats = sound_offset + max_sounds * SOUND_FLOATS;
        Self {
            max_entities,
            max_events,
            max_sounds,
            entity_offset,
            event_offset,
            sound_offset,
            total_floats,
        }
    }

    /// Compute the layout from a SimConfig: entity capacity is the summed
    /// pool capacity, so a full world always fits.
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.pools.total(), config.max_events, config.max_sounds)
    }

    pub fn total_bytes(&self) -> usize {
        self.total_floats * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sizes_are_stable() {
        assert_eq!(ENTITY_FLOATS, 6);
        assert_eq!(EVENT_FLOATS, 8);
        assert_eq!(SOUND_FLOATS, 6);
    }

    #[test]
    fn sections_are_contiguous() {
        let layout = SnapshotLayout::new(100, 20, 10);
        assert_eq!(layout.entity_offset, HEADER_FLOATS);
        assert_eq!(layout.event_offset, HEADER_FLOATS + 100 * ENTITY_FLOATS);
        assert_eq!(layout.sound_offset, layout.event_offset + 20 * EVENT_FLOATS);
        assert_eq!(layout.total_floats, layout.sound_offset + 10 * SOUND_FLOATS);
        assert_eq!(layout.total_bytes(), layout.total_floats * 4);
    }

    #[test]
    fn from_default_config_fits_all_pools() {
        let config = SimConfig::default();
        let layout = SnapshotLayout::from_config(&config);
        assert_eq!(layout.max_entities, config.pools.total());
        assert_eq!(layout.max_events, config.max_events);
        assert_eq!(layout.max_sounds, config.max_sounds);
    }

    #[test]
    fn wire_ids_stay_exactly_representable() {
        // Highest foldable id: generation byte 255, index 65535.
        let id = wire_entity_id(255 << 16 | 0xFFFF);
        assert_eq!(id, 16_777_215.0);
        assert_eq!(id as u32 as f32, id);
        // Generation changes the id even after folding.
        assert_ne!(wire_entity_id(1 << 16 | 7), wire_entity_id(2 << 16 | 7));
    }
}
