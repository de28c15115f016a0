//! Minimum-separation rejection for accepted placements.
use std::collections::HashMap;

use glam::{IVec3, Vec3};

/// Accepted positions of one item, with a hash grid over them.
///
/// Positions live in a plain append-only `Vec`. The grid uses cells of side
/// `min_distance`, so any conflicting position sits in one of the 27 cells around a
/// candidate. The distance test itself is exact.
#[derive(Debug, Clone, Default)]
pub struct OverlapGuard {
    min_distance: f32,
    min_distance_squared: f32,
    accepted: Vec<Vec3>,
    cells: HashMap<IVec3, Vec<usize>>,
}

impl OverlapGuard {
    /// A guard rejecting candidates closer than `min_distance`. Zero disables rejection.
    pub fn new(min_distance: f32) -> Self {
        let min_distance = if min_distance.is_finite() {
            min_distance.max(0.0)
        } else {
            0.0
        };
        Self {
            min_distance,
            min_distance_squared: min_distance * min_distance,
            accepted: Vec::new(),
            cells: HashMap::new(),
        }
    }

    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    pub fn accepted(&self) -> &[Vec3] {
        &self.accepted
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Cell coordinates saturate at the `i32` range, which keeps neighbours of
    /// saturated cells adjacent.
    #[inline]
    fn cell_of(&self, p: Vec3) -> IVec3 {
        (p / self.min_distance).floor().as_ivec3()
    }

    /// Whether `p` is at least `min_distance` away from every accepted position.
    pub fn is_clear(&self, p: Vec3) -> bool {
        if self.min_distance <= 0.0 || self.accepted.is_empty() {
            return true;
        }

        let cell = self.cell_of(p);
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let neighbor = cell.saturating_add(IVec3::new(dx, dy, dz));
                    let Some(bucket) = self.cells.get(&neighbor) else {
                        continue;
                    };
                    if bucket
                        .iter()
                        .any(|&i| self.accepted[i].distance_squared(p) < self.min_distance_squared)
                    {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Records an accepted position.
    pub fn insert(&mut self, p: Vec3) {
        let index = self.accepted.len();
        self.accepted.push(p);
        if self.min_distance > 0.0 {
            let cell = self.cell_of(p);
            self.cells.entry(cell).or_default().push(index);
        }
    }

    /// Records `p` if it is clear and reports whether it was accepted.
    pub fn try_insert(&mut self, p: Vec3) -> bool {
        if self.is_clear(p) {
            self.insert(p);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::sampling::rand01;

    fn brute_force_clear(accepted: &[Vec3], p: Vec3, d: f32) -> bool {
        accepted.iter().all(|q| q.distance(p) >= d)
    }

    #[test]
    fn rejects_close_neighbors() {
        let mut guard = OverlapGuard::new(1.0);
        assert!(guard.try_insert(Vec3::ZERO));
        assert!(!guard.is_clear(Vec3::new(0.5, 0.0, 0.0)));
        assert!(!guard.is_clear(Vec3::new(-0.3, 0.6, 0.2)));
        assert!(guard.is_clear(Vec3::new(1.0, 0.0, 0.0)));
        assert!(guard.is_clear(Vec3::new(0.8, 0.8, 0.0)));
    }

    #[test]
    fn zero_distance_accepts_everything() {
        let mut guard = OverlapGuard::new(0.0);
        assert!(guard.try_insert(Vec3::ONE));
        assert!(guard.try_insert(Vec3::ONE));
        assert_eq!(guard.len(), 2);
    }

    #[test]
    fn tiny_distance_with_saturated_cells() {
        let mut guard = OverlapGuard::new(1e-9);
        assert!(guard.try_insert(Vec3::new(5.0, 5.0, 0.0)));
        assert!(!guard.try_insert(Vec3::new(5.0, 5.0, 0.0)));
        assert!(guard.try_insert(Vec3::new(4.0, 5.0, 0.0)));
        assert!(guard.try_insert(Vec3::new(-5.0, -5.0, 1e12)));
        assert!(!guard.is_clear(Vec3::new(-5.0, -5.0, 1e12)));
        assert_eq!(guard.len(), 3);
    }

    #[test]
    fn matches_brute_force_across_cell_borders() {
        let mut rng = StdRng::seed_from_u64(99);
        let d = 0.7;
        let mut guard = OverlapGuard::new(d);
        for _ in 0..3000 {
            let p = Vec3::new(
                rand01(&mut rng) * 10.0 - 5.0,
                rand01(&mut rng) * 10.0 - 5.0,
                rand01(&mut rng) * 2.0 - 1.0,
            );
            let expected = brute_force_clear(guard.accepted(), p, d);
            assert_eq!(guard.try_insert(p), expected, "mismatch at {p:?}");
        }
        assert!(!guard.is_empty());
    }
}
