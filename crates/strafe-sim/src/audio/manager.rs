use glam::Vec2;

use crate::audio::registry::{AudioRegistry, SoundKind};
use crate::audio::spatial::Listener;

/// Playback state of one pooled voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Playing,
    /// Tail end of playback; still occupies the slot but loses ties.
    Fading,
}

/// One playback slot. Requested by kind + position + priority; callers
/// never hold a voice directly.
#[derive(Debug, Clone)]
struct Voice {
    state: VoiceState,
    priority: u8,
    remaining_ms: f32,
}

impl Voice {
    fn idle() -> Self {
        Self {
            state: VoiceState::Idle,
            priority: 0,
            remaining_ms: 0.0,
        }
    }

    fn busy(&self) -> bool {
        self.state != VoiceState::Idle
    }
}

/// Instruction for the host's sound player, drained after each tick.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceCommand {
    Start {
        kind: SoundKind,
        /// Host asset identifier from the registry.
        source: String,
        /// Slot within the kind's voice bank; reusing a slot implies the
        /// previous sound on it is replaced.
        slot: u8,
        gain: f32,
        pan: f32,
    },
    Stop {
        kind: SoundKind,
        slot: u8,
    },
}

/// Milliseconds before the end of playback during which a voice counts as
/// fading.
const FADE_TAIL_MS: f32 = 40.0;

/// Triggers and recycles sound playback without ever stalling the tick.
///
/// `play` is fire-and-forget: it claims an idle voice of the requested
/// kind, preempts a strictly-lower-priority one, or drops the request.
/// Playback trouble is logged and counted, never surfaced to the caller —
/// gameplay must not depend on a sound firing.
#[derive(Debug, Clone)]
pub struct AudioManager {
    registry: AudioRegistry,
    listener: Listener,
    banks: std::collections::HashMap<SoundKind, Vec<Voice>>,
    commands: Vec<VoiceCommand>,
    max_commands: usize,
    dropped: u64,
}

impl AudioManager {
    pub fn new(registry: AudioRegistry, listener: Listener, max_commands: usize) -> Self {
        Self {
            registry,
            listener,
            banks: std::collections::HashMap::new(),
            commands: Vec::new(),
            max_commands,
            dropped: 0,
        }
    }

    /// Keep the attenuation model centered on the player.
    pub fn set_listener_position(&mut self, position: Vec2) {
        self.listener.position = position;
    }

    /// Request playback. Never blocks and never errors into the tick.
    pub fn play(&mut self, kind: SoundKind, position: Option<Vec2>, priority: Option<u8>) {
        let Some(def) = self.registry.get(kind) else {
            log::debug!("no registry entry for {:?}, request dropped", kind);
            self.dropped += 1;
            return;
        };

        let (gain, pan) = match position {
            Some(p) => (def.base_gain * self.listener.attenuation(p), self.listener.pan(p)),
            None => (def.base_gain, 0.0),
        };
        if gain <= 0.0 {
            // Out of earshot; not a drop, just culled.
            return;
        }

        let priority = priority.unwrap_or(def.priority);
        let duration_ms = def.duration_ms;
        let source = def.source.clone();
        let voices = def.voices;

        if self.commands.len() >= self.max_commands {
            self.dropped += 1;
            return;
        }

        let bank = self
            .banks
            .entry(kind)
            .or_insert_with(|| vec![Voice::idle(); voices]);

        let slot = match bank.iter().position(|v| !v.busy()) {
            Some(i) => i,
            None => {
                // All voices of this kind are busy: preempt the weakest
                // strictly-lower-priority voice, else drop the request.
                let weakest = bank.iter().enumerate().min_by_key(|(_, v)| v.priority);
                match weakest {
                    Some((i, v)) if v.priority < priority => {
                        self.commands.push(VoiceCommand::Stop {
                            kind,
                            slot: i as u8,
                        });
                        i
                    }
                    _ => {
                        log::debug!("all {:?} voices busy at >= priority {}", kind, priority);
                        self.dropped += 1;
                        return;
                    }
                }
            }
        };

        bank[slot] = Voice {
            state: VoiceState::Playing,
            priority,
            remaining_ms: duration_ms,
        };
        self.commands.push(VoiceCommand::Start {
            kind,
            source,
            slot: slot as u8,
            gain,
            pan,
        });
    }

    /// Advance voice timers: `Playing → Fading → Idle`.
    pub fn tick(&mut self, dt_ms: f32) {
        for bank in self.banks.values_mut() {
            for v in bank.iter_mut() {
                if !v.busy() {
                    continue;
                }
                v.remaining_ms -= dt_ms;
                if v.remaining_ms <= 0.0 {
                    *v = Voice::idle();
                } else if v.remaining_ms <= FADE_TAIL_MS {
                    v.state = VoiceState::Fading;
                }
            }
        }
    }

    /// Drain the commands accumulated since the last call. The host plays
    /// them after the step; an ignored batch only costs sound, not state.
    pub fn take_commands(&mut self) -> Vec<VoiceCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Requests dropped because no voice could be claimed.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Busy voices for a kind, for diagnostics and tests.
    pub fn active_count(&self, kind: SoundKind) -> usize {
        self.banks
            .get(&kind)
            .map(|b| b.iter().filter(|v| v.busy()).count())
            .unwrap_or(0)
    }
}
