use serde::Deserialize;

/// Per-kind entity pool capacities. Pools never grow after construction,
/// bounding worst-case memory and avoiding allocation jitter mid-frame.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PoolCapacities {
    pub player: usize,
    pub enemy: usize,
    pub projectile: usize,
    pub pickup: usize,
}

impl Default for PoolCapacities {
    fn default() -> Self {
        Self {
            player: 1,
            enemy: 64,
            projectile: 128,
            pickup: 16,
        }
    }
}

impl PoolCapacities {
    /// Total slots across all pools (sizes the snapshot wire buffer).
    pub fn total(&self) -> usize {
        self.player + self.enemy + self.projectile + self.pickup
    }
}

/// Configuration for the simulation core, provided by the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed tick duration in milliseconds (default: 1000/60).
    pub tick_ms: f32,
    /// Maximum ticks run per `step` call before dropping (default: 5).
    pub max_ticks_per_step: u32,
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,
    /// Entity pool capacities per kind.
    pub pools: PoolCapacities,
    /// Raw input ring-buffer capacity (default: 256).
    pub input_queue_capacity: usize,
    /// Grid cell size as a multiple of the median bounding radius.
    pub cell_size_factor: f32,
    /// Lower bound on the grid cell size, in game units.
    pub min_cell_size: f32,
    /// Analog stick dead zone, in [0, 1).
    pub dead_zone: f32,
    /// Maximum collision events carried in one snapshot.
    pub max_events: usize,
    /// Maximum voice commands emitted per tick.
    pub max_sounds: usize,
    /// Distance at which positional sounds start attenuating.
    pub audio_reference_distance: f32,
    /// Distance beyond which positional sounds are inaudible.
    pub audio_max_distance: f32,
    /// Player movement speed, units per second.
    pub player_speed: f32,
    /// Projectile speed, units per second.
    pub projectile_speed: f32,
    /// Minimum milliseconds between player shots.
    pub fire_cooldown_ms: f32,
    /// Enemy movement speed, units per second.
    pub enemy_speed: f32,
    /// Player lives at the start of a session.
    pub starting_lives: u32,
    /// Seed for the deterministic spawn-jitter RNG.
    pub rng_seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000.0 / 60.0,
            max_ticks_per_step: 5,
            world_width: 800.0,
            world_height: 600.0,
            pools: PoolCapacities::default(),
            input_queue_capacity: 256,
            cell_size_factor: 2.0,
            min_cell_size: 8.0,
            dead_zone: 0.2,
            max_events: 64,
            max_sounds: 32,
            audio_reference_distance: 100.0,
            audio_max_distance: 800.0,
            player_speed: 240.0,
            projectile_speed: 480.0,
            fire_cooldown_ms: 180.0,
            enemy_speed: 60.0,
            starting_lives: 3,
            rng_seed: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = SimConfig::default();
        assert!((cfg.tick_ms - 16.666_668).abs() < 1e-3);
        assert_eq!(cfg.max_ticks_per_step, 5);
        assert_eq!(cfg.pools.total(), 1 + 64 + 128 + 16);
    }

    #[test]
    fn partial_json_overrides() {
        let cfg: SimConfig =
            serde_json::from_str(r#"{ "tick_ms": 33.0, "pools": { "enemy": 8 } }"#).unwrap();
        assert_eq!(cfg.tick_ms, 33.0);
        assert_eq!(cfg.pools.enemy, 8);
        // Untouched fields keep their defaults.
        assert_eq!(cfg.pools.projectile, 128);
        assert_eq!(cfg.input_queue_capacity, 256);
    }
}
