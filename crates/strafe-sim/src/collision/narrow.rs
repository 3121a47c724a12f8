use glam::Vec2;

use crate::entity::entity::Shape;

/// Contact estimate for an overlapping pair. The normal points from the
/// first shape toward the second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub normal: Vec2,
    pub penetration: f32,
}

/// Precise overlap test for a broad-phase candidate pair.
/// Boundary-inclusive: shapes exactly touching count as overlapping.
pub fn overlap(pos_a: Vec2, shape_a: Shape, pos_b: Vec2, shape_b: Shape) -> Option<Contact> {
    match (shape_a, shape_b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(pos_a, ra, pos_b, rb)
        }
        (Shape::Aabb { half_extents: ha }, Shape::Aabb { half_extents: hb }) => {
            aabb_aabb(pos_a, ha, pos_b, hb)
        }
        (Shape::Circle { radius }, Shape::Aabb { half_extents }) => {
            circle_aabb(pos_a, radius, pos_b, half_extents)
        }
        (Shape::Aabb { half_extents }, Shape::Circle { radius }) => {
            circle_aabb(pos_b, radius, pos_a, half_extents).map(|c| Contact {
                normal: -c.normal,
                penetration: c.penetration,
            })
        }
    }
}

/// Squared-distance vs summed-radius test; no square root on the miss path.
fn circle_circle(pa: Vec2, ra: f32, pb: Vec2, rb: f32) -> Option<Contact> {
    let delta = pb - pa;
    let r = ra + rb;
    let d2 = delta.length_squared();
    if d2 > r * r {
        return None;
    }
    let d = d2.sqrt();
    let normal = if d > f32::EPSILON {
        delta / d
    } else {
        // Coincident centers: pick a stable axis.
        Vec2::X
    };
    Some(Contact {
        normal,
        penetration: r - d,
    })
}

/// Separating-axis test on the two world axes.
fn aabb_aabb(pa: Vec2, ha: Vec2, pb: Vec2, hb: Vec2) -> Option<Contact> {
    let delta = pb - pa;
    let overlap_x = ha.x + hb.x - delta.x.abs();
    if overlap_x < 0.0 {
        return None;
    }
    let overlap_y = ha.y + hb.y - delta.y.abs();
    if overlap_y < 0.0 {
        return None;
    }
    // Push out along the axis of least penetration.
    if overlap_x <= overlap_y {
        Some(Contact {
            normal: Vec2::new(delta.x.signum(), 0.0),
            penetration: overlap_x,
        })
    } else {
        Some(Contact {
            normal: Vec2::new(0.0, delta.y.signum()),
            penetration: overlap_y,
        })
    }
}

/// Closest-point clamp of the circle center against the box.
fn circle_aabb(pc: Vec2, r: f32, pb: Vec2, hb: Vec2) -> Option<Contact> {
    let closest = pc.clamp(pb - hb, pb + hb);
    let delta = closest - pc;
    let d2 = delta.length_squared();
    if d2 > r * r {
        return None;
    }
    if d2 > f32::EPSILON {
        let d = d2.sqrt();
        Some(Contact {
            normal: delta / d,
            penetration: r - d,
        })
    } else {
        // Center inside the box: fall back to per-axis overlap.
        let off = pb - pc;
        let overlap_x = hb.x + r - off.x.abs();
        let overlap_y = hb.y + r - off.y.abs();
        if overlap_x <= overlap_y {
            Some(Contact {
                normal: Vec2::new(off.x.signum(), 0.0),
                penetration: overlap_x,
            })
        } else {
            Some(Contact {
                normal: Vec2::new(0.0, off.y.signum()),
                penetration: overlap_y,
            })
        }
    }
}
