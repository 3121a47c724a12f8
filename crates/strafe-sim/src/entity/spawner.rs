use glam::Vec2;

use crate::collision::detector::CollisionEvent;
use crate::config::SimConfig;
use crate::core::rng::Rng;
use crate::core::snapshot::SimState;
use crate::entity::entity::{Entity, EntityKind};
use crate::entity::pool::{EntityPool, EntityRef};
use crate::entity::response::{Effect, ResponseTable};
use crate::error::SpawnError;
use crate::input::state::{Action, InputState};

/// When a pattern is allowed to fire at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnTrigger {
    Always,
    ScoreAtLeast(u32),
    LevelAtLeast(u32),
}

impl SpawnTrigger {
    fn passes(self, state: &SimState) -> bool {
        match self {
            SpawnTrigger::Always => true,
            SpawnTrigger::ScoreAtLeast(s) => state.score >= s,
            SpawnTrigger::LevelAtLeast(l) => state.level >= l,
        }
    }
}

/// Where a pattern places new entities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnOrigin {
    Point(Vec2),
    /// Random x along the top edge, jittered by the deterministic RNG.
    TopEdge,
}

/// Cadence-driven population descriptor. Stateless apart from its timer:
/// every `cadence_ms` the pattern attempts one spawn, gated by its trigger
/// and `max_concurrent`. A blocked attempt is skipped (never queued) and
/// retried on the next tick.
#[derive(Debug, Clone)]
pub struct SpawnPattern {
    pub kind: EntityKind,
    pub cadence_ms: f32,
    pub trigger: SpawnTrigger,
    pub max_concurrent: usize,
    pub origin: SpawnOrigin,
    timer_ms: f32,
}

impl SpawnPattern {
    pub fn new(kind: EntityKind, cadence_ms: f32, max_concurrent: usize) -> Self {
        Self {
            kind,
            cadence_ms,
            trigger: SpawnTrigger::Always,
            max_concurrent,
            origin: SpawnOrigin::TopEdge,
            timer_ms: 0.0,
        }
    }

    pub fn with_trigger(mut self, trigger: SpawnTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_origin(mut self, origin: SpawnOrigin) -> Self {
        self.origin = origin;
        self
    }
}

/// Discrete gameplay outcomes of one tick, consumed by the audio stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEventKind {
    Spawned(EntityKind),
    Destroyed(EntityKind),
    PlayerHit,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimEvent {
    pub kind: SimEventKind,
    pub pos: Vec2,
}

/// Owns all entity storage and controls population growth and decay.
///
/// Everything that creates or destroys an entity goes through here: pattern
/// timers, player fire, lifetime expiry, bounds culling, and collision
/// resolution. Other components only ever hold `EntityRef`s.
#[derive(Clone)]
pub struct EntitySpawner {
    pools: Vec<EntityPool>,
    patterns: Vec<SpawnPattern>,
    bounds: Vec2,
    rng: Rng,
    player_speed: f32,
    projectile_speed: f32,
    fire_cooldown_ms: f32,
    enemy_speed: f32,
    fire_timer_ms: f32,
    spawns_skipped: u64,
}

impl EntitySpawner {
    pub fn new(config: &SimConfig) -> Self {
        let caps = [
            config.pools.player,
            config.pools.enemy,
            config.pools.projectile,
            config.pools.pickup,
        ];
        let pools = EntityKind::ALL
            .iter()
            .map(|&k| EntityPool::new(k, caps[k.index()]))
            .collect();
        Self {
            pools,
            patterns: Vec::new(),
            bounds: Vec2::new(config.world_width, config.world_height),
            rng: Rng::new(config.rng_seed),
            player_speed: config.player_speed,
            projectile_speed: config.projectile_speed,
            fire_cooldown_ms: config.fire_cooldown_ms,
            enemy_speed: config.enemy_speed,
            fire_timer_ms: 0.0,
            spawns_skipped: 0,
        }
    }

    pub fn add_pattern(&mut self, pattern: SpawnPattern) {
        self.patterns.push(pattern);
    }

    /// Activate a fresh entity of `kind` at `pos`.
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec2) -> Result<EntityRef, SpawnError> {
        self.pools[kind.index()].spawn(pos)
    }

    /// Recycle an entity. The slot's generation is bumped, so `r` and any
    /// copies of it stop resolving.
    pub fn release(&mut self, r: EntityRef) -> Result<(), SpawnError> {
        self.pools[r.kind.index()].release(r)
    }

    pub fn get(&self, r: EntityRef) -> Option<&Entity> {
        self.pools[r.kind.index()].get(r)
    }

    pub fn get_mut(&mut self, r: EntityRef) -> Option<&mut Entity> {
        self.pools[r.kind.index()].get_mut(r)
    }

    /// Number of live entities of a kind.
    pub fn live(&self, kind: EntityKind) -> usize {
        self.pools[kind.index()].live()
    }

    /// All active entities in canonical (kind, slot) order.
    pub fn iter_active(&self) -> impl Iterator<Item = (EntityRef, &Entity)> {
        self.pools.iter().flat_map(|p| p.iter_active())
    }

    pub fn player(&self) -> Option<(EntityRef, &Entity)> {
        self.pools[EntityKind::Player.index()].iter_active().next()
    }

    /// Pattern attempts blocked by `max_concurrent` or pool exhaustion.
    pub fn spawns_skipped(&self) -> u64 {
        self.spawns_skipped
    }

    /// Advance every active entity and evaluate spawn patterns.
    pub fn tick(&mut self, dt_ms: f32, input: &InputState, state: &SimState) -> Vec<SimEvent> {
        let mut events = Vec::new();
        let dt_s = dt_ms / 1000.0;

        self.steer_player(input);
        self.fire_if_requested(dt_ms, input, &mut events);
        self.steer_enemies();
        self.integrate(dt_s);
        self.expire_and_cull(dt_ms);
        self.run_patterns(dt_ms, state, &mut events);

        events
    }

    fn steer_player(&mut self, input: &InputState) {
        let dir = Vec2::new(
            input.axis(Action::MoveLeft, Action::MoveRight),
            input.axis(Action::MoveUp, Action::MoveDown),
        );
        let dir = dir.clamp_length_max(1.0);
        let speed = self.player_speed;
        if let Some((_, e)) = self.pools[EntityKind::Player.index()]
            .iter_active_mut()
            .next()
        {
            e.vel = dir * speed;
        }
    }

    fn fire_if_requested(&mut self, dt_ms: f32, input: &InputState, events: &mut Vec<SimEvent>) {
        self.fire_timer_ms = (self.fire_timer_ms - dt_ms).max(0.0);
        if !input.pressed(Action::Fire) || self.fire_timer_ms > 0.0 {
            return;
        }
        let Some((_, player)) = self.player() else {
            return;
        };
        let muzzle = player.pos - Vec2::new(0.0, player.shape.extents().y + 4.0);
        match self.spawn(EntityKind::Projectile, muzzle) {
            Ok(r) => {
                let speed = self.projectile_speed;
                if let Some(p) = self.get_mut(r) {
                    // Straight up; the world is y-down.
                    p.vel = Vec2::new(0.0, -speed);
                }
                self.fire_timer_ms = self.fire_cooldown_ms;
                events.push(SimEvent {
                    kind: SimEventKind::Spawned(EntityKind::Projectile),
                    pos: muzzle,
                });
            }
            Err(e) => {
                log::debug!("fire skipped: {}", e);
                self.spawns_skipped += 1;
            }
        }
    }

    fn steer_enemies(&mut self) {
        let target = self.player().map(|(_, p)| p.pos);
        let speed = self.enemy_speed;
        if let Some(target) = target {
            for (_, e) in self.pools[EntityKind::Enemy.index()].iter_active_mut() {
                e.vel = (target - e.pos).normalize_or_zero() * speed;
            }
        }
    }

    fn integrate(&mut self, dt_s: f32) {
        let bounds = self.bounds;
        for pool in &mut self.pools {
            for (_, e) in pool.iter_active_mut() {
                e.pos += e.vel * dt_s;
                if e.vel.length_squared() > f32::EPSILON {
                    e.rotation = e.vel.to_angle();
                }
                if e.visual_state > 0 {
                    e.visual_state -= 1;
                }
                if e.kind == EntityKind::Player {
                    let margin = e.shape.extents();
                    e.pos = e.pos.clamp(margin, bounds - margin);
                }
            }
        }
    }

    /// Lifetime expiry plus culling of entities that left the world.
    fn expire_and_cull(&mut self, dt_ms: f32) {
        let bounds = self.bounds;
        let mut dead: Vec<EntityRef> = Vec::new();
        for pool in &mut self.pools {
            for (r, e) in pool.iter_active_mut() {
                if let Some(life) = e.lifetime_ms.as_mut() {
                    *life -= dt_ms;
                    if *life <= 0.0 {
                        dead.push(r);
                        continue;
                    }
                }
                let escape = e.shape.extents() * 2.0;
                let out = e.pos.x < -escape.x
                    || e.pos.y < -escape.y
                    || e.pos.x > bounds.x + escape.x
                    || e.pos.y > bounds.y + escape.y;
                if out && e.kind != EntityKind::Player {
                    dead.push(r);
                }
            }
        }
        for r in dead {
            // Expiry is silent: no score, no death event.
            if let Err(e) = self.release(r) {
                log::warn!("cull failed: {}", e);
            }
        }
    }

    fn run_patterns(&mut self, dt_ms: f32, state: &SimState, events: &mut Vec<SimEvent>) {
        let mut patterns = std::mem::take(&mut self.patterns);
        for pattern in &mut patterns {
            pattern.timer_ms += dt_ms;
            while pattern.timer_ms >= pattern.cadence_ms {
                if !pattern.trigger.passes(state)
                    || self.live(pattern.kind) >= pattern.max_concurrent
                {
                    // Hold one pending attempt at the threshold so it is
                    // retried next tick without bursting when unblocked.
                    pattern.timer_ms = pattern.cadence_ms;
                    self.spawns_skipped += 1;
                    break;
                }
                let pos = match pattern.origin {
                    SpawnOrigin::Point(p) => p,
                    SpawnOrigin::TopEdge => {
                        Vec2::new(self.rng.range_f32(0.0, self.bounds.x), 0.0)
                    }
                };
                match self.spawn(pattern.kind, pos) {
                    Ok(r) => {
                        pattern.timer_ms -= pattern.cadence_ms;
                        if pattern.kind == EntityKind::Enemy {
                            let speed = self.enemy_speed;
                            if let Some(e) = self.get_mut(r) {
                                e.vel = Vec2::new(0.0, speed);
                            }
                        }
                        events.push(SimEvent {
                            kind: SimEventKind::Spawned(pattern.kind),
                            pos,
                        });
                    }
                    Err(e) => {
                        log::debug!("pattern spawn skipped: {}", e);
                        pattern.timer_ms = pattern.cadence_ms;
                        self.spawns_skipped += 1;
                        break;
                    }
                }
            }
        }
        self.patterns = patterns;
    }

    /// Apply the response table to this tick's collision events.
    ///
    /// Events reference the positions tested this tick; an entity already
    /// destroyed by an earlier event in the same batch simply no longer
    /// resolves and its remaining pairs are skipped.
    pub fn resolve_collisions(
        &mut self,
        collisions: &[CollisionEvent],
        table: &ResponseTable,
        state: &mut SimState,
    ) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for ev in collisions {
            let response = table.get(ev.a.kind, ev.b.kind);
            self.apply_effect(ev.a, response.first, state, &mut events);
            self.apply_effect(ev.b, response.second, state, &mut events);
        }
        events
    }

    fn apply_effect(
        &mut self,
        r: EntityRef,
        effect: Effect,
        state: &mut SimState,
        events: &mut Vec<SimEvent>,
    ) {
        let dies = match effect {
            Effect::None => return,
            Effect::Damage(amount) => {
                let Some(e) = self.get_mut(r) else {
                    return;
                };
                e.health -= amount;
                e.visual_state = 6;
                if r.kind == EntityKind::Player && e.health > 0 {
                    events.push(SimEvent {
                        kind: SimEventKind::PlayerHit,
                        pos: e.pos,
                    });
                }
                e.health <= 0
            }
            Effect::Destroy => self.get(r).is_some(),
        };
        if dies {
            self.kill(r, state, events);
        }
    }

    fn kill(&mut self, r: EntityRef, state: &mut SimState, events: &mut Vec<SimEvent>) {
        let Some(pos) = self.get(r).map(|e| e.pos) else {
            return;
        };
        if r.kind == EntityKind::Player {
            state.lives = state.lives.saturating_sub(1);
            if state.lives == 0 {
                state.game_over = true;
                if let Err(e) = self.release(r) {
                    log::warn!("player release failed: {}", e);
                }
                events.push(SimEvent {
                    kind: SimEventKind::GameOver,
                    pos,
                });
            } else {
                // Lose a life, keep the slot: respawn at the world center.
                let center = self.bounds * 0.5;
                if let Some(e) = self.get_mut(r) {
                    e.respawn_at(center);
                }
                events.push(SimEvent {
                    kind: SimEventKind::PlayerHit,
                    pos,
                });
            }
            return;
        }
        state.add_score(r.kind.score_value());
        if let Err(e) = self.release(r) {
            log::warn!("release failed: {}", e);
            return;
        }
        events.push(SimEvent {
            kind: SimEventKind::Destroyed(r.kind),
            pos,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::detector::CollisionEvent;

    fn config() -> SimConfig {
        SimConfig::default()
    }

    fn spawner() -> EntitySpawner {
        EntitySpawner::new(&config())
    }

    fn idle_input() -> InputState {
        InputState::default()
    }

    const TICK: f32 = 1000.0 / 60.0;

    #[test]
    fn pattern_cadence_spawns_exactly_three_in_three_seconds() {
        let mut s = spawner();
        let mut state = SimState::new(3);
        s.add_pattern(
            SpawnPattern::new(EntityKind::Enemy, 1000.0, 3)
                .with_origin(SpawnOrigin::Point(Vec2::new(100.0, 100.0))),
        );
        let input = idle_input();
        let mut spawned = 0;
        // 180 ticks of 16.67ms ≈ 3000ms.
        for _ in 0..180 {
            for ev in s.tick(16.67, &input, &state) {
                if matches!(ev.kind, SimEventKind::Spawned(EntityKind::Enemy)) {
                    spawned += 1;
                }
            }
            state.tick_index += 1;
        }
        assert_eq!(spawned, 3);
        assert_eq!(s.live(EntityKind::Enemy), 3);
    }

    #[test]
    fn pattern_respects_max_concurrent_and_retries() {
        let mut s = spawner();
        let state = SimState::new(3);
        s.add_pattern(
            SpawnPattern::new(EntityKind::Enemy, 100.0, 1)
                .with_origin(SpawnOrigin::Point(Vec2::new(400.0, 300.0))),
        );
        let input = idle_input();

        // First firing spawns; later firings are capped at one concurrent.
        let mut total = 0;
        for _ in 0..60 {
            total += s.tick(TICK, &input, &state).len();
        }
        assert_eq!(total, 1);
        assert!(s.spawns_skipped() > 0);

        // Free the slot: the held attempt fires on the next tick.
        let victim = s.iter_active().next().unwrap().0;
        s.release(victim).unwrap();
        let events = s.tick(TICK, &input, &state);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn blocked_pattern_does_not_burst_when_unblocked() {
        let mut s = spawner();
        let state = SimState::new(3);
        s.add_pattern(
            SpawnPattern::new(EntityKind::Enemy, 50.0, 1)
                .with_origin(SpawnOrigin::Point(Vec2::new(400.0, 300.0))),
        );
        let input = idle_input();
        // Block for a long time: many cadences elapse.
        for _ in 0..120 {
            s.tick(TICK, &input, &state);
        }
        let victim = s.iter_active().next().unwrap().0;
        s.release(victim).unwrap();
        // Only the single held attempt fires, not the backlog.
        let events = s.tick(TICK, &input, &state);
        assert_eq!(events.len(), 1);
        let events = s.tick(TICK, &input, &state);
        assert!(events.is_empty());
    }

    #[test]
    fn trigger_gates_spawning() {
        let mut s = spawner();
        let mut state = SimState::new(3);
        s.add_pattern(
            SpawnPattern::new(EntityKind::Pickup, 100.0, 8)
                .with_trigger(SpawnTrigger::ScoreAtLeast(500))
                .with_origin(SpawnOrigin::Point(Vec2::new(10.0, 10.0))),
        );
        let input = idle_input();
        for _ in 0..30 {
            assert!(s.tick(TICK, &input, &state).is_empty());
        }
        state.add_score(500);
        let mut spawned = 0;
        for _ in 0..30 {
            spawned += s.tick(TICK, &input, &state).len();
        }
        assert!(spawned > 0);
    }

    #[test]
    fn player_moves_with_input_and_stays_in_bounds() {
        let mut s = spawner();
        let state = SimState::new(3);
        s.spawn(EntityKind::Player, Vec2::new(20.0, 300.0)).unwrap();

        let mut input = InputState::default();
        input.apply_press(Action::MoveLeft, 1.0);
        for _ in 0..120 {
            s.tick(TICK, &input, &state);
        }
        let (_, p) = s.player().unwrap();
        // Clamped at the left margin, not pushed out of the world.
        assert!(p.pos.x > 0.0);
        assert!(p.pos.x < 20.0);
    }

    #[test]
    fn fire_spawns_projectile_with_cooldown() {
        let mut s = spawner();
        let state = SimState::new(3);
        s.spawn(EntityKind::Player, Vec2::new(400.0, 300.0)).unwrap();

        let mut input = InputState::default();
        input.apply_press(Action::Fire, 1.0);
        let mut shots = 0;
        // Held fire for ~0.5s: cooldown (180ms) allows 3 shots.
        for _ in 0..30 {
            for ev in s.tick(TICK, &input, &state) {
                if matches!(ev.kind, SimEventKind::Spawned(EntityKind::Projectile)) {
                    shots += 1;
                }
            }
        }
        assert_eq!(shots, 3);
        let (_, proj) = s
            .iter_active()
            .find(|(r, _)| r.kind == EntityKind::Projectile)
            .unwrap();
        assert!(proj.vel.y < 0.0);
    }

    #[test]
    fn projectile_lifetime_expires() {
        let mut s = spawner();
        let state = SimState::new(3);
        let r = s
            .spawn(EntityKind::Projectile, Vec2::new(400.0, 300.0))
            .unwrap();
        // Park it so bounds culling does not interfere.
        s.get_mut(r).unwrap().vel = Vec2::ZERO;
        let input = idle_input();
        for _ in 0..130 {
            s.tick(TICK, &input, &state);
        }
        assert_eq!(s.live(EntityKind::Projectile), 0);
    }

    #[test]
    fn projectile_leaving_world_is_culled() {
        let mut s = spawner();
        let state = SimState::new(3);
        let r = s.spawn(EntityKind::Projectile, Vec2::new(400.0, 20.0)).unwrap();
        s.get_mut(r).unwrap().vel = Vec2::new(0.0, -2000.0);
        let input = idle_input();
        for _ in 0..5 {
            s.tick(TICK, &input, &state);
        }
        assert_eq!(s.live(EntityKind::Projectile), 0);
    }

    fn event_between(s: &EntitySpawner, a: EntityRef, b: EntityRef) -> CollisionEvent {
        let pa = s.get(a).unwrap().pos;
        let pb = s.get(b).unwrap().pos;
        let (a, b, dir) = if a <= b { (a, b, pb - pa) } else { (b, a, pa - pb) };
        CollisionEvent {
            a,
            b,
            normal: dir.normalize_or_zero(),
            penetration: 1.0,
        }
    }

    #[test]
    fn projectile_kills_enemy_and_scores() {
        let mut s = spawner();
        let mut state = SimState::new(3);
        let enemy = s.spawn(EntityKind::Enemy, Vec2::new(100.0, 100.0)).unwrap();
        let shot = s
            .spawn(EntityKind::Projectile, Vec2::new(100.0, 104.0))
            .unwrap();
        let table = ResponseTable::default();

        // Enemy has 2 health: first hit damages, second kills.
        let ev = event_between(&s, enemy, shot);
        let out = s.resolve_collisions(&[ev], &table, &mut state);
        assert!(out
            .iter()
            .any(|e| e.kind == SimEventKind::Destroyed(EntityKind::Projectile)));
        assert_eq!(s.get(enemy).unwrap().health, 1);
        assert_eq!(state.score, 0);

        let shot2 = s
            .spawn(EntityKind::Projectile, Vec2::new(100.0, 104.0))
            .unwrap();
        let ev = event_between(&s, enemy, shot2);
        let out = s.resolve_collisions(&[ev], &table, &mut state);
        assert!(out
            .iter()
            .any(|e| e.kind == SimEventKind::Destroyed(EntityKind::Enemy)));
        assert!(s.get(enemy).is_none());
        assert_eq!(state.score, EntityKind::Enemy.score_value());
    }

    #[test]
    fn player_death_consumes_life_and_respawns() {
        let mut s = spawner();
        let mut state = SimState::new(2);
        let player = s.spawn(EntityKind::Player, Vec2::new(50.0, 50.0)).unwrap();
        let table = ResponseTable::default();

        // Three hits at 1 damage each exhaust the player's 3 health.
        for _ in 0..3 {
            let enemy = s.spawn(EntityKind::Enemy, Vec2::new(50.0, 52.0)).unwrap();
            let ev = event_between(&s, player, enemy);
            s.resolve_collisions(&[ev], &table, &mut state);
        }
        assert_eq!(state.lives, 1);
        assert!(!state.game_over);
        let (_, p) = s.player().unwrap();
        assert_eq!(p.pos, Vec2::new(400.0, 300.0));
        assert_eq!(p.health, EntityKind::Player.base_health());
    }

    #[test]
    fn last_life_sets_game_over() {
        let mut s = spawner();
        let mut state = SimState::new(1);
        let player = s.spawn(EntityKind::Player, Vec2::new(50.0, 50.0)).unwrap();
        let table = ResponseTable::default();
        for _ in 0..3 {
            let enemy = s.spawn(EntityKind::Enemy, Vec2::new(50.0, 52.0)).unwrap();
            let ev = event_between(&s, player, enemy);
            let out = s.resolve_collisions(&[ev], &table, &mut state);
            if state.game_over {
                assert!(out.iter().any(|e| e.kind == SimEventKind::GameOver));
            }
        }
        assert!(state.game_over);
        assert!(s.player().is_none());
    }

    #[test]
    fn stale_event_reference_is_skipped() {
        let mut s = spawner();
        let mut state = SimState::new(3);
        let enemy = s.spawn(EntityKind::Enemy, Vec2::new(100.0, 100.0)).unwrap();
        let shot = s
            .spawn(EntityKind::Projectile, Vec2::new(100.0, 104.0))
            .unwrap();
        let ev = event_between(&s, enemy, shot);
        s.release(enemy).unwrap();
        // The event's enemy ref is stale; resolution must not touch the
        // slot's next occupant.
        let replacement = s.spawn(EntityKind::Enemy, Vec2::new(0.0, 0.0)).unwrap();
        let table = ResponseTable::default();
        s.resolve_collisions(&[ev], &table, &mut state);
        assert_eq!(
            s.get(replacement).unwrap().health,
            EntityKind::Enemy.base_health()
        );
    }
}
