use glam::Vec2;

/// Listener model for positional playback: distance-based gain attenuation
/// plus a stereo pan from the horizontal offset. No propagation delay is
/// modeled; a sound fires the tick it is requested.
#[derive(Debug, Clone)]
pub struct Listener {
    pub position: Vec2,
    /// Within this distance there is no falloff.
    pub reference_distance: f32,
    /// Beyond this distance the sound is inaudible.
    pub max_distance: f32,
}

impl Listener {
    pub fn new(position: Vec2, reference_distance: f32, max_distance: f32) -> Self {
        Self {
            position,
            reference_distance,
            max_distance,
        }
    }

    /// Linear falloff from 1.0 at the reference distance to 0.0 at the
    /// maximum distance.
    pub fn attenuation(&self, source: Vec2) -> f32 {
        let distance = (source - self.position).length();
        if distance >= self.max_distance {
            return 0.0;
        }
        if distance <= self.reference_distance {
            return 1.0;
        }
        1.0 - (distance - self.reference_distance) / (self.max_distance - self.reference_distance)
    }

    /// Stereo pan in [-1, 1] from the horizontal offset to the listener.
    pub fn pan(&self, source: Vec2) -> f32 {
        if self.max_distance <= 0.0 {
            return 0.0;
        }
        ((source.x - self.position.x) / self.max_distance).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listener() -> Listener {
        Listener::new(Vec2::new(0.0, 0.0), 100.0, 500.0)
    }

    #[test]
    fn no_falloff_inside_reference_distance() {
        assert_eq!(listener().attenuation(Vec2::new(50.0, 0.0)), 1.0);
    }

    #[test]
    fn inaudible_beyond_max_distance() {
        assert_eq!(listener().attenuation(Vec2::new(900.0, 0.0)), 0.0);
    }

    #[test]
    fn falloff_is_linear_between_reference_and_max() {
        let a = listener().attenuation(Vec2::new(300.0, 0.0));
        assert!((a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn pan_follows_horizontal_offset() {
        let l = listener();
        assert!(l.pan(Vec2::new(250.0, 0.0)) > 0.0);
        assert!(l.pan(Vec2::new(-250.0, 0.0)) < 0.0);
        assert_eq!(l.pan(Vec2::new(9999.0, 0.0)), 1.0);
    }
}
