use std::collections::{HashMap, HashSet};

use glam::Vec2;

use crate::collision::narrow;
use crate::entity::entity::{Entity, Shape};
use crate::entity::pool::EntityRef;

/// An overlapping pair reported for one tick. `a < b` canonically, so the
/// same unordered pair always surfaces in the same orientation. The normal
/// points from `a` toward `b`.
///
/// Events are produced fresh each tick and consumed immediately; nothing
/// here survives a rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub a: EntityRef,
    pub b: EntityRef,
    pub normal: Vec2,
    pub penetration: f32,
}

#[derive(Debug, Clone)]
struct GridEntry {
    re: EntityRef,
    pos: Vec2,
    shape: Shape,
}

/// Broad-phase spatial index over the active entity set.
///
/// A uniform grid rebuilt once per tick. Cell size adapts to the population:
/// a configurable multiple of the median bounding radius, floored so a swarm
/// of tiny entities cannot explode the cell count. Entities spanning several
/// cells are inserted into each; the pair set is de-duplicated at query time,
/// so oversized entities cost candidates, not correctness.
#[derive(Debug, Clone)]
pub struct CollisionDetector {
    cell_size_factor: f32,
    min_cell_size: f32,
    cell_size: f32,
    entries: Vec<GridEntry>,
    cells: HashMap<(i32, i32), Vec<u32>>,
}

impl CollisionDetector {
    pub fn new(cell_size_factor: f32, min_cell_size: f32) -> Self {
        Self {
            cell_size_factor,
            min_cell_size,
            cell_size: min_cell_size,
            entries: Vec::new(),
            cells: HashMap::new(),
        }
    }

    /// Rebuild the grid from the current active set. Dead or non-colliding
    /// entities must already be filtered out by the caller's iterator.
    pub fn rebuild<'a>(&mut self, entities: impl Iterator<Item = (EntityRef, &'a Entity)>) {
        self.entries.clear();
        for cell in self.cells.values_mut() {
            cell.clear();
        }

        for (re, e) in entities {
            self.entries.push(GridEntry {
                re,
                pos: e.pos,
                shape: e.shape,
            });
        }

        self.cell_size = self.pick_cell_size();

        for (i, entry) in self.entries.iter().enumerate() {
            let ext = entry.shape.extents();
            let min = entry.pos - ext;
            let max = entry.pos + ext;
            let (cx0, cy0) = self.cell_of(min);
            let (cx1, cy1) = self.cell_of(max);
            for cx in cx0..=cx1 {
                for cy in cy0..=cy1 {
                    self.cells.entry((cx, cy)).or_default().push(i as u32);
                }
            }
        }
    }

    /// Broad-phase candidates from shared cells, narrowed to true overlaps.
    ///
    /// The result is sorted by `(a, b)` and free of duplicates, so consumers
    /// see the same order regardless of entity insertion order or hash-map
    /// iteration order.
    pub fn query_pairs(&self) -> Vec<CollisionEvent> {
        let mut seen: HashSet<(EntityRef, EntityRef)> = HashSet::new();
        let mut events = Vec::new();

        for bucket in self.cells.values() {
            for (n, &i) in bucket.iter().enumerate() {
                for &j in &bucket[n + 1..] {
                    let (ea, eb) = {
                        let (ei, ej) = (&self.entries[i as usize], &self.entries[j as usize]);
                        if ei.re <= ej.re {
                            (ei, ej)
                        } else {
                            (ej, ei)
                        }
                    };
                    if ea.re == eb.re || !seen.insert((ea.re, eb.re)) {
                        continue;
                    }
                    if let Some(contact) = narrow::overlap(ea.pos, ea.shape, eb.pos, eb.shape) {
                        events.push(CollisionEvent {
                            a: ea.re,
                            b: eb.re,
                            normal: contact.normal,
                            penetration: contact.penetration,
                        });
                    }
                }
            }
        }

        events.sort_by(|x, y| (x.a, x.b).cmp(&(y.a, y.b)));
        events
    }

    /// Current cell size, exposed for diagnostics.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn pick_cell_size(&self) -> f32 {
        if self.entries.is_empty() {
            return self.min_cell_size;
        }
        let mut radii: Vec<f32> = self
            .entries
            .iter()
            .map(|e| e.shape.bounding_radius())
            .collect();
        radii.sort_unstable_by(|a, b| a.total_cmp(b));
        let median = radii[radii.len() / 2];
        (median * self.cell_size_factor).max(self.min_cell_size)
    }

    fn cell_of(&self, p: Vec2) -> (i32, i32) {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }
}
