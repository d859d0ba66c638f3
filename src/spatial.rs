//! Uniform-grid spatial hashing for proximity queries.
//!
//! Entities are bucketed on the xy plane into square cells whose edge equals
//! the link radius, so every neighbor within the radius lies in the 3×3
//! block of cells around an entity. Distances are measured in full 3D; since
//! a 3D distance is never shorter than its xy projection, the 3×3 scan still
//! finds every pair.
//!
//! # Example
//!
//! ```ignore
//! use morphe::spatial::SpatialGrid;
//!
//! let mut grid = SpatialGrid::new(100.0);
//! grid.rebuild(&positions);
//! for pair in grid.pairs_within(&positions) {
//!     // pair.a < pair.b, pair.distance < 100.0
//! }
//! ```

use std::collections::HashMap;

use glam::Vec3;

/// The 3×3 block of cell offsets scanned around an entity.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0), (0,  0), (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

/// An unordered pair within range, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pair {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
}

/// Bucketed index of entity positions.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    /// A grid whose cell edge (and link radius) is `cell_size`.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: HashMap::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell coordinates of a position.
    #[inline]
    pub fn cell_of(&self, p: Vec3) -> (i32, i32) {
        ((p.x / self.cell_size).floor() as i32, (p.y / self.cell_size).floor() as i32)
    }

    /// Number of occupied cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Re-bucket every position. Cell vectors are reused between frames.
    pub fn rebuild(&mut self, positions: &[Vec3]) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        for (i, &p) in positions.iter().enumerate() {
            let cell = self.cell_of(p);
            self.cells.entry(cell).or_default().push(i);
        }
        self.cells.retain(|_, bucket| !bucket.is_empty());
    }

    /// All pairs closer than the cell size. `positions` must be the slice the
    /// grid was last rebuilt from.
    pub fn pairs_within(&self, positions: &[Vec3]) -> Vec<Pair> {
        let radius_sq = self.cell_size * self.cell_size;
        let mut pairs = Vec::new();
        for (i, &p) in positions.iter().enumerate() {
            let (cx, cy) = self.cell_of(p);
            for (dx, dy) in NEIGHBOR_OFFSETS {
                let Some(bucket) = self.cells.get(&(cx.saturating_add(dx), cy.saturating_add(dy))) else {
                    continue;
                };
                for &j in bucket {
                    if j <= i {
                        continue;
                    }
                    let d_sq = p.distance_squared(positions[j]);
                    if d_sq < radius_sq {
                        pairs.push(Pair { a: i, b: j, distance: d_sq.sqrt() });
                    }
                }
            }
        }
        pairs
    }
}

/// O(n²) reference for [`SpatialGrid::pairs_within`], in `(a, b)` order.
pub fn brute_force_pairs(positions: &[Vec3], radius: f32) -> Vec<Pair> {
    let radius_sq = radius * radius;
    let mut pairs = Vec::new();
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let d_sq = positions[i].distance_squared(positions[j]);
            if d_sq < radius_sq {
                pairs.push(Pair { a: i, b: j, distance: d_sq.sqrt() });
            }
        }
    }
    pairs
}
