use strafe_sim::{
    EntityKind, GameLoop, RawEvent, RawInput, SimConfig, SnapshotBuffer, SpawnPattern,
    SpawnTrigger,
};

/// Wires the simulation loop to the browser: raw DOM events go in, one flat
/// snapshot buffer comes out per animation frame.
///
/// Lives in a `thread_local!` behind the `#[wasm_bindgen]` exports in
/// `lib.rs`; JavaScript drives `frame()` from `requestAnimationFrame` and
/// reads the buffer through `snapshot_ptr()` without copying.
pub struct WebRunner {
    game: GameLoop,
    buffer: SnapshotBuffer,
}

impl WebRunner {
    pub fn new(config: SimConfig) -> Self {
        let buffer = SnapshotBuffer::new(&config);
        let mut game = GameLoop::new(config);

        // Stock session: a steady enemy wave, denser from level 2, plus the
        // occasional pickup. Hosts can layer more patterns before start().
        game.add_pattern(SpawnPattern::new(EntityKind::Enemy, 1200.0, 12));
        game.add_pattern(
            SpawnPattern::new(EntityKind::Enemy, 700.0, 24)
                .with_trigger(SpawnTrigger::LevelAtLeast(2)),
        );
        game.add_pattern(
            SpawnPattern::new(EntityKind::Pickup, 9000.0, 2)
                .with_trigger(SpawnTrigger::ScoreAtLeast(200)),
        );

        Self { game, buffer }
    }

    pub fn start(&mut self) -> bool {
        match self.game.start() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("start rejected: {}", e);
                false
            }
        }
    }

    pub fn stop(&mut self) {
        self.game.stop();
    }

    pub fn running(&self) -> bool {
        self.game.running()
    }

    /// One animation callback: advance the sim, then refresh the buffer.
    pub fn frame(&mut self, elapsed_ms: f32) {
        self.game.step(elapsed_ms);
        let sounds = self.game.take_voice_commands();
        let metrics = self.game.metrics();
        self.buffer.write(self.game.snapshot(), &sounds, &metrics);
    }

    pub fn push_input(&mut self, timestamp_ms: f64, input: RawInput) {
        self.game.push_input(RawEvent {
            timestamp_ms,
            input,
        });
    }

    pub fn apply_bindings(&mut self, json: &str) -> bool {
        match self.game.action_map_mut().apply_json(json) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("bindings rejected: {}", e);
                false
            }
        }
    }

    pub fn game(&self) -> &GameLoop {
        &self.game
    }

    pub fn buffer(&self) -> &SnapshotBuffer {
        &self.buffer
    }
}
