use crate::audio::manager::VoiceCommand;
use crate::bridge::protocol::{
    self, EntityRecord, EventRecord, SnapshotLayout, SoundRecord, ENTITY_FLOATS, EVENT_FLOATS,
    SOUND_FLOATS,
};
use crate::config::SimConfig;
use crate::core::snapshot::Snapshot;
use crate::metrics::SimMetrics;

/// Flat f32 buffer the host reads zero-copy out of linear memory.
///
/// Rewritten after every `step`; the host treats it as a frame snapshot and
/// never writes back. Overfull sections are truncated to their configured
/// capacities (the header carries the truncated counts).
pub struct SnapshotBuffer {
    layout: SnapshotLayout,
    world_width: f32,
    world_height: f32,
    data: Vec<f32>,
}

impl SnapshotBuffer {
    pub fn new(config: &SimConfig) -> Self {
        let layout = SnapshotLayout::from_config(config);
        let data = vec![0.0; layout.total_floats];
        Self {
            layout,
            world_width: config.world_width,
            world_height: config.world_height,
            data,
        }
    }

    /// Serialize one published snapshot plus this step's voice commands.
    pub fn write(&mut self, snapshot: &Snapshot, sounds: &[VoiceCommand], metrics: &SimMetrics) {
        let entity_count = snapshot.entities.len().min(self.layout.max_entities);
        let event_count = snapshot.events.len().min(self.layout.max_events);
        let sound_count = sounds.len().min(self.layout.max_sounds);

        let h = &mut self.data[..protocol::HEADER_FLOATS];
        h[protocol::HEADER_PROTOCOL_VERSION] = protocol::PROTOCOL_VERSION;
        h[protocol::HEADER_TICK_INDEX] = snapshot.tick_index as f32;
        h[protocol::HEADER_MAX_ENTITIES] = self.layout.max_entities as f32;
        h[protocol::HEADER_ENTITY_COUNT] = entity_count as f32;
        h[protocol::HEADER_MAX_EVENTS] = self.layout.max_events as f32;
        h[protocol::HEADER_EVENT_COUNT] = event_count as f32;
        h[protocol::HEADER_MAX_SOUNDS] = self.layout.max_sounds as f32;
        h[protocol::HEADER_SOUND_COUNT] = sound_count as f32;
        h[protocol::HEADER_SCORE] = snapshot.score as f32;
        h[protocol::HEADER_LIVES] = snapshot.lives as f32;
        h[protocol::HEADER_LEVEL] = snapshot.level as f32;
        h[protocol::HEADER_WORLD_WIDTH] = self.world_width;
        h[protocol::HEADER_WORLD_HEIGHT] = self.world_height;
        h[protocol::HEADER_GAME_OVER] = if snapshot.game_over { 1.0 } else { 0.0 };
        h[protocol::HEADER_TICKS_DROPPED] = metrics.ticks_dropped as f32;
        h[protocol::HEADER_TICK_FAULTS] = metrics.tick_faults as f32;

        for (i, view) in snapshot.entities.iter().take(entity_count).enumerate() {
            let record = EntityRecord {
                id: protocol::wire_entity_id(view.id),
                kind: view.kind as u8 as f32,
                x: view.pos.x,
                y: view.pos.y,
                rotation: view.rotation,
                visual_state: view.visual_state as f32,
            };
            self.put(self.layout.entity_offset + i * ENTITY_FLOATS, &record);
        }

        for (i, ev) in snapshot.events.iter().take(event_count).enumerate() {
            let record = EventRecord {
                a_id: protocol::wire_entity_id(ev.a.to_bits()),
                a_kind: ev.a.kind as u8 as f32,
                b_id: protocol::wire_entity_id(ev.b.to_bits()),
                b_kind: ev.b.kind as u8 as f32,
                normal_x: ev.normal.x,
                normal_y: ev.normal.y,
                penetration: ev.penetration,
                _pad: 0.0,
            };
            self.put(self.layout.event_offset + i * EVENT_FLOATS, &record);
        }

        for (i, cmd) in sounds.iter().take(sound_count).enumerate() {
            let record = match cmd {
                VoiceCommand::Start { kind, slot, gain, pan, .. } => SoundRecord {
                    op: 0.0,
                    kind: *kind as u8 as f32,
                    slot: *slot as f32,
                    gain: *gain,
                    pan: *pan,
                    _pad: 0.0,
                },
                VoiceCommand::Stop { kind, slot } => SoundRecord {
                    op: 1.0,
                    kind: *kind as u8 as f32,
                    slot: *slot as f32,
                    gain: 0.0,
                    pan: 0.0,
                    _pad: 0.0,
                },
            };
            self.put(self.layout.sound_offset + i * SOUND_FLOATS, &record);
        }
    }

    fn put<T: bytemuck::Pod>(&mut self, offset: usize, record: &T) {
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(record));
        self.data[offset..offset + floats.len()].copy_from_slice(floats);
    }

    pub fn layout(&self) -> &SnapshotLayout {
        &self.layout
    }

    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    pub fn len_floats(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::registry::SoundKind;
    use crate::core::snapshot::{EntityView, SimState};
    use crate::entity::entity::EntityKind;
    use crate::entity::pool::EntityRef;
    use glam::Vec2;

    fn snapshot_with_one_entity() -> Snapshot {
        let mut snapshot = Snapshot::default();
        let state = SimState::new(3);
        let re = EntityRef {
            kind: EntityKind::Enemy,
            index: 5,
            generation: 2,
        };
        snapshot.refill(
            &state,
            std::iter::once(EntityView::new(re, Vec2::new(10.0, 20.0), 0.5, 1)),
            &[],
        );
        snapshot
    }

    #[test]
    fn header_carries_counts_and_counters() {
        let config = SimConfig::default();
        let mut buf = SnapshotBuffer::new(&config);
        let metrics = SimMetrics {
            ticks_dropped: 2,
            ..SimMetrics::default()
        };
        buf.write(&snapshot_with_one_entity(), &[], &metrics);

        let d = buf.as_slice();
        assert_eq!(d[protocol::HEADER_PROTOCOL_VERSION], protocol::PROTOCOL_VERSION);
        assert_eq!(d[protocol::HEADER_ENTITY_COUNT], 1.0);
        assert_eq!(d[protocol::HEADER_LIVES], 3.0);
        assert_eq!(d[protocol::HEADER_TICKS_DROPPED], 2.0);
        assert_eq!(d[protocol::HEADER_WORLD_WIDTH], config.world_width);
    }

    #[test]
    fn entity_record_round_trips() {
        let config = SimConfig::default();
        let mut buf = SnapshotBuffer::new(&config);
        buf.write(&snapshot_with_one_entity(), &[], &SimMetrics::default());

        let off = buf.layout().entity_offset;
        let d = buf.as_slice();
        assert_eq!(d[off + 1], EntityKind::Enemy as u8 as f32);
        assert_eq!(d[off + 2], 10.0);
        assert_eq!(d[off + 3], 20.0);
        assert_eq!(d[off + 5], 1.0);
    }

    #[test]
    fn sound_records_follow_commands() {
        let config = SimConfig::default();
        let mut buf = SnapshotBuffer::new(&config);
        let sounds = vec![
            VoiceCommand::Stop {
                kind: SoundKind::Hit,
                slot: 1,
            },
            VoiceCommand::Start {
                kind: SoundKind::Hit,
                source: "hit".to_string(),
                slot: 1,
                gain: 0.5,
                pan: -0.25,
            },
        ];
        buf.write(&Snapshot::default(), &sounds, &SimMetrics::default());

        let d = buf.as_slice();
        assert_eq!(d[protocol::HEADER_SOUND_COUNT], 2.0);
        let off = buf.layout().sound_offset;
        assert_eq!(d[off], 1.0); // stop
        assert_eq!(d[off + SOUND_FLOATS], 0.0); // start
        assert_eq!(d[off + SOUND_FLOATS + 3], 0.5);
        assert_eq!(d[off + SOUND_FLOATS + 4], -0.25);
    }

    #[test]
    fn overfull_sections_truncate_to_capacity() {
        let mut config = SimConfig::default();
        config.max_sounds = 1;
        let mut buf = SnapshotBuffer::new(&config);
        let sounds = vec![
            VoiceCommand::Stop { kind: SoundKind::Hit, slot: 0 },
            VoiceCommand::Stop { kind: SoundKind::Hit, slot: 1 },
        ];
        buf.write(&Snapshot::default(), &sounds, &SimMetrics::default());
        assert_eq!(buf.as_slice()[protocol::HEADER_SOUND_COUNT], 1.0);
    }
}
