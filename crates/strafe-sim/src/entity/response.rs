use std::collections::HashMap;

use crate::entity::entity::EntityKind;

/// What happens to one side of a colliding pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Subtract health; the entity dies when health reaches zero.
    Damage(i32),
    /// Unconditional death, regardless of health.
    Destroy,
}

/// Resolution policy for one ordered kind pair. `first` applies to the
/// lower-ordered kind of the canonical pair, `second` to the higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionResponse {
    pub first: Effect,
    pub second: Effect,
}

impl CollisionResponse {
    pub const IGNORE: CollisionResponse = CollisionResponse {
        first: Effect::None,
        second: Effect::None,
    };
}

/// Pluggable table mapping canonical `(kindA, kindB)` pairs to a response.
///
/// Detection never decides outcomes; this table does, and hosts can override
/// any entry at runtime.
#[derive(Debug, Clone)]
pub struct ResponseTable {
    entries: HashMap<(EntityKind, EntityKind), CollisionResponse>,
}

impl ResponseTable {
    /// Empty table: every pair is ignored until configured.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Set the response for a kind pair. Order of arguments does not matter;
    /// the pair is stored canonically and `first`/`second` are swapped to
    /// match when needed.
    pub fn set(&mut self, a: EntityKind, b: EntityKind, response: CollisionResponse) {
        if a <= b {
            self.entries.insert((a, b), response);
        } else {
            self.entries.insert(
                (b, a),
                CollisionResponse {
                    first: response.second,
                    second: response.first,
                },
            );
        }
    }

    /// Response for a canonical pair (`a <= b`). Unlisted pairs are ignored.
    pub fn get(&self, a: EntityKind, b: EntityKind) -> CollisionResponse {
        debug_assert!(a <= b);
        self.entries
            .get(&(a, b))
            .copied()
            .unwrap_or(CollisionResponse::IGNORE)
    }
}

impl Default for ResponseTable {
    /// The stock arcade rules: enemies hurt the player and die on contact,
    /// projectiles damage enemies, the player consumes pickups.
    fn default() -> Self {
        use EntityKind::*;
        let mut t = Self::empty();
        t.set(
            Player,
            Enemy,
            CollisionResponse {
                first: Effect::Damage(1),
                second: Effect::Destroy,
            },
        );
        t.set(
            Enemy,
            Projectile,
            CollisionResponse {
                first: Effect::Damage(1),
                second: Effect::Destroy,
            },
        );
        t.set(
            Player,
            Pickup,
            CollisionResponse {
                first: Effect::None,
                second: Effect::Destroy,
            },
        );
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use EntityKind::*;

    #[test]
    fn unlisted_pairs_are_ignored() {
        let t = ResponseTable::default();
        assert_eq!(t.get(Enemy, Enemy), CollisionResponse::IGNORE);
        assert_eq!(t.get(Projectile, Pickup), CollisionResponse::IGNORE);
    }

    #[test]
    fn reversed_set_swaps_sides() {
        let mut t = ResponseTable::empty();
        // Configure with the higher-ordered kind first.
        t.set(
            Projectile,
            Enemy,
            CollisionResponse {
                first: Effect::Destroy,
                second: Effect::Damage(2),
            },
        );
        let r = t.get(Enemy, Projectile);
        assert_eq!(r.first, Effect::Damage(2));
        assert_eq!(r.second, Effect::Destroy);
    }

    #[test]
    fn default_rules_cover_the_core_pairs() {
        let t = ResponseTable::default();
        assert_eq!(t.get(Player, Enemy).first, Effect::Damage(1));
        assert_eq!(t.get(Enemy, Projectile).second, Effect::Destroy);
        assert_eq!(t.get(Player, Pickup).second, Effect::Destroy);
    }
}
