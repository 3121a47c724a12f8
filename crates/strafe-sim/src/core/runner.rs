use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec2;

use crate::audio::manager::{AudioManager, VoiceCommand};
use crate::audio::registry::{AudioRegistry, SoundKind};
use crate::audio::spatial::Listener;
use crate::collision::detector::{CollisionDetector, CollisionEvent};
use crate::config::SimConfig;
use crate::core::snapshot::{EntityView, SimState, Snapshot};
use crate::core::time::FixedTimestep;
use crate::entity::entity::EntityKind;
use crate::entity::response::ResponseTable;
use crate::entity::spawner::{EntitySpawner, SimEvent, SimEventKind, SpawnPattern};
use crate::error::{LoopError, TickError};
use crate::input::bindings::ActionMap;
use crate::input::handler::InputHandler;
use crate::input::queue::RawEvent;
use crate::input::state::Action;
use crate::metrics::SimMetrics;

/// Process-wide guard: at most one loop may be running at a time.
static LOOP_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Everything a tick mutates, cloned before each tick so a faulted tick can
/// be rolled back wholesale. Input and audio sit outside the boundary: a
/// discarded tick may lose that tick's drained input and sounds, which is
/// the accepted degradation.
#[derive(Clone)]
struct World {
    spawner: EntitySpawner,
    detector: CollisionDetector,
    responses: ResponseTable,
    state: SimState,
    /// Last completed tick's collision events, republished in the snapshot.
    events: Vec<CollisionEvent>,
    /// Fail point for exercising the rollback path.
    #[cfg(test)]
    poison: bool,
}

impl World {
    fn new(config: &SimConfig) -> Self {
        let mut spawner = EntitySpawner::new(config);
        let center = Vec2::new(config.world_width, config.world_height) * 0.5;
        if let Err(e) = spawner.spawn(EntityKind::Player, center) {
            log::warn!("no player spawned: {}", e);
        }
        Self {
            spawner,
            detector: CollisionDetector::new(config.cell_size_factor, config.min_cell_size),
            responses: ResponseTable::default(),
            state: SimState::new(config.starting_lives),
            events: Vec::new(),
            #[cfg(test)]
            poison: false,
        }
    }
}

/// Drives the fixed-timestep update cycle, decoupled from the host's
/// variable render framerate.
///
/// The host calls `step(elapsed_ms)` once per animation callback; the loop
/// runs zero or more fixed ticks to catch up, then publishes a value-copied
/// snapshot for the renderer. Within a tick the stage order is contractual:
/// input → entity update and spawning → collision rebuild and query →
/// response resolution → audio. Later stages read what earlier ones wrote.
pub struct GameLoop {
    config: SimConfig,
    timestep: FixedTimestep,
    world: World,
    input: InputHandler,
    audio: AudioManager,
    snapshot: Snapshot,
    running: bool,
    ticks_run: u64,
    ticks_dropped: u64,
    tick_faults: u64,
}

impl GameLoop {
    pub fn new(config: SimConfig) -> Self {
        let world = World::new(&config);
        let input = InputHandler::new(
            config.input_queue_capacity,
            ActionMap::with_defaults(config.dead_zone),
        );
        let listener = Listener::new(
            Vec2::new(config.world_width, config.world_height) * 0.5,
            config.audio_reference_distance,
            config.audio_max_distance,
        );
        let audio = AudioManager::new(AudioRegistry::with_defaults(), listener, config.max_sounds);
        let timestep = FixedTimestep::new(config.tick_ms, config.max_ticks_per_step);
        Self {
            config,
            timestep,
            world,
            input,
            audio,
            snapshot: Snapshot::default(),
            running: false,
            ticks_run: 0,
            ticks_dropped: 0,
            tick_faults: 0,
        }
    }

    /// Claim the process-wide loop slot and begin accepting `step` calls.
    pub fn start(&mut self) -> Result<(), LoopError> {
        if self.running {
            return Err(LoopError::AlreadyRunning);
        }
        LOOP_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LoopError::AlreadyRunning)?;
        self.running = true;
        log::info!("simulation loop started ({} ms tick)", self.config.tick_ms);
        Ok(())
    }

    /// Halt the loop and release the slot. Safe to call from within a tick
    /// (a game-over detected mid-tick, for instance): the current tick
    /// finishes, remaining ticks of the step are skipped, and no tick runs
    /// on any later callback.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            LOOP_ACTIVE.store(false, Ordering::Release);
            log::info!("simulation loop stopped at tick {}", self.world.state.tick_index);
        }
    }

    pub fn running(&self) -> bool {
        self.running
    }

    /// Advance by one host animation callback's worth of wall time.
    ///
    /// Runs up to `max_ticks_per_step` fixed ticks; ticks owed beyond the
    /// cap are dropped and counted instead of fast-forwarded. The fractional
    /// remainder carries to the next call.
    pub fn step(&mut self, elapsed_ms: f32) {
        if !self.running {
            return;
        }
        let plan = self.timestep.advance(elapsed_ms);
        if plan.dropped > 0 {
            self.ticks_dropped += plan.dropped as u64;
            log::warn!("host stalled: dropped {} ticks", plan.dropped);
        }
        for _ in 0..plan.run {
            if !self.running {
                break;
            }
            self.run_tick();
        }
        self.publish_snapshot();
    }

    /// Run one tick against a pre-tick backup; any fault restores it.
    fn run_tick(&mut self) {
        let backup = self.world.clone();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.tick_inner()))
            .unwrap_or_else(|payload| {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(TickError::Panicked(msg))
            });
        match outcome {
            Ok(()) => self.ticks_run += 1,
            Err(e) => {
                log::warn!(
                    "tick {} faulted, rolling back: {}",
                    backup.state.tick_index,
                    e
                );
                self.world = backup;
                self.tick_faults += 1;
            }
        }
    }

    fn tick_inner(&mut self) -> Result<(), TickError> {
        #[cfg(test)]
        if self.world.poison {
            return Err(TickError::Injected);
        }

        let dt = self.timestep.tick_ms();
        let input = self.input.drain();

        if input.just_pressed(Action::Pause) {
            self.world.state.paused = !self.world.state.paused;
        }
        if self.world.state.paused || self.world.state.game_over {
            self.audio.tick(dt);
            return Ok(());
        }

        let mut events = self.world.spawner.tick(dt, &input, &self.world.state);

        self.world
            .detector
            .rebuild(self.world.spawner.iter_active());
        self.world.events = self.world.detector.query_pairs();

        events.extend(self.world.spawner.resolve_collisions(
            &self.world.events,
            &self.world.responses,
            &mut self.world.state,
        ));

        if let Some((_, player)) = self.world.spawner.player() {
            self.audio.set_listener_position(player.pos);
        }
        for event in &events {
            self.trigger_audio(event);
        }
        self.audio.tick(dt);

        self.world.state.tick_index += 1;
        if self.world.state.game_over {
            self.stop();
        }
        Ok(())
    }

    /// Map a gameplay outcome to a sound request. Priorities come from the
    /// registry; gameplay never depends on whether the sound actually fires.
    fn trigger_audio(&mut self, event: &SimEvent) {
        let kind = match event.kind {
            SimEventKind::Spawned(EntityKind::Projectile) => Some(SoundKind::Shoot),
            SimEventKind::Spawned(EntityKind::Enemy) => Some(SoundKind::Spawn),
            SimEventKind::Spawned(_) => None,
            SimEventKind::Destroyed(EntityKind::Enemy) => Some(SoundKind::Explosion),
            SimEventKind::Destroyed(EntityKind::Pickup) => Some(SoundKind::Pickup),
            SimEventKind::Destroyed(_) => None,
            SimEventKind::PlayerHit => Some(SoundKind::Hit),
            SimEventKind::GameOver => Some(SoundKind::GameOver),
        };
        if let Some(kind) = kind {
            self.audio.play(kind, Some(event.pos), None);
        }
    }

    fn publish_snapshot(&mut self) {
        let views = self
            .world
            .spawner
            .iter_active()
            .map(|(r, e)| EntityView::new(r, e.pos, e.rotation, e.visual_state));
        self.snapshot
            .refill(&self.world.state, views, &self.world.events);
    }

    /// The last published snapshot. A value copy: the renderer can clone and
    /// mutate it freely without touching simulation state.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Enqueue a raw device event; drained at the next tick.
    pub fn push_input(&mut self, event: RawEvent) {
        self.input.push(event);
    }

    /// Runtime rebinding and device toggles.
    pub fn action_map_mut(&mut self) -> &mut ActionMap {
        self.input.map_mut()
    }

    pub fn add_pattern(&mut self, pattern: SpawnPattern) {
        self.world.spawner.add_pattern(pattern);
    }

    /// Override the collision response for a kind pair.
    pub fn set_response(
        &mut self,
        a: EntityKind,
        b: EntityKind,
        response: crate::entity::response::CollisionResponse,
    ) {
        self.world.responses.set(a, b, response);
    }

    /// Direct access to entity storage, for host-driven setup.
    pub fn spawner_mut(&mut self) -> &mut EntitySpawner {
        &mut self.world.spawner
    }

    pub fn spawner(&self) -> &EntitySpawner {
        &self.world.spawner
    }

    /// Voice commands accumulated since the last call; the host's sound
    /// player consumes these after each step.
    pub fn take_voice_commands(&mut self) -> Vec<VoiceCommand> {
        self.audio.take_commands()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn metrics(&self) -> SimMetrics {
        SimMetrics {
            ticks_run: self.ticks_run,
            ticks_dropped: self.ticks_dropped,
            tick_faults: self.tick_faults,
            input_overflow: self.input.overflow_count(),
            sounds_dropped: self.audio.dropped_count(),
            spawns_skipped: self.world.spawner.spawns_skipped(),
        }
    }

    #[cfg(test)]
    fn set_poison(&mut self, poison: bool) {
        self.world.poison = poison;
    }
}

impl Drop for GameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
