use glam::Vec2;

/// What an entity is, gameplay-wise. Selects its pool, its default stats,
/// and which collision responses apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Player,
    Enemy,
    Projectile,
    Pickup,
}

impl EntityKind {
    pub const COUNT: usize = 4;
    pub const ALL: [EntityKind; Self::COUNT] = [
        EntityKind::Player,
        EntityKind::Enemy,
        EntityKind::Projectile,
        EntityKind::Pickup,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Starting health for a freshly spawned entity of this kind.
    pub fn base_health(self) -> i32 {
        match self {
            EntityKind::Player => 3,
            EntityKind::Enemy => 2,
            EntityKind::Projectile => 1,
            EntityKind::Pickup => 1,
        }
    }

    /// Score awarded when an entity of this kind is destroyed by the player.
    pub fn score_value(self) -> u32 {
        match self {
            EntityKind::Enemy => 100,
            EntityKind::Pickup => 25,
            _ => 0,
        }
    }

    /// Default lifetime in milliseconds, if this kind expires on its own.
    pub fn base_lifetime_ms(self) -> Option<f32> {
        match self {
            EntityKind::Projectile => Some(2_000.0),
            EntityKind::Pickup => Some(10_000.0),
            _ => None,
        }
    }

    /// Default bounding shape for this kind.
    pub fn base_shape(self) -> Shape {
        match self {
            EntityKind::Player => Shape::Circle { radius: 14.0 },
            EntityKind::Enemy => Shape::Circle { radius: 12.0 },
            EntityKind::Projectile => Shape::Circle { radius: 4.0 },
            EntityKind::Pickup => Shape::Aabb {
                half_extents: Vec2::splat(8.0),
            },
        }
    }
}

/// Bounding shape used by the collision broad and narrow phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Aabb { half_extents: Vec2 },
}

impl Shape {
    /// Radius of the smallest circle containing the shape. Drives the grid
    /// cell sizing heuristic.
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Aabb { half_extents } => half_extents.length(),
        }
    }

    /// Axis-aligned extents for cell coverage (half width, half height).
    pub fn extents(&self) -> Vec2 {
        match *self {
            Shape::Circle { radius } => Vec2::splat(radius),
            Shape::Aabb { half_extents } => half_extents,
        }
    }
}

/// One simulated actor. Owned exclusively by its pool; everything outside
/// the spawner sees only `EntityRef` handles.
#[derive(Debug, Clone)]
pub struct Entity {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub shape: Shape,
    pub health: i32,
    /// Remaining lifetime in milliseconds; `None` means no expiry.
    pub lifetime_ms: Option<f32>,
    /// Opaque render hint (0 = normal; nonzero = damage-flash ticks left).
    pub visual_state: u8,
    /// Dead entities are skipped by updates and excluded from collision.
    pub active: bool,
}

impl Entity {
    /// Create an inactive placeholder slot for the given kind.
    pub fn empty(kind: EntityKind) -> Self {
        Self {
            kind,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            shape: kind.base_shape(),
            health: 0,
            lifetime_ms: None,
            visual_state: 0,
            active: false,
        }
    }

    /// Reset a slot to freshly-spawned state at the given position.
    pub fn respawn_at(&mut self, pos: Vec2) {
        let kind = self.kind;
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.rotation = 0.0;
        self.shape = kind.base_shape();
        self.health = kind.base_health();
        self.lifetime_ms = kind.base_lifetime_ms();
        self.visual_state = 0;
        self.active = true;
    }
}
