//! Uniform hash grid broad phase
//!
//! Space is cut into cubes of `cell_size`; a body is registered in every cell
//! its box touches, keyed by `floor(coord / cell_size)`. Updates are a plain
//! remove + insert, which is cheap at habitat scale (a handful of cells per
//! module).

use std::any::Any;
use std::collections::{HashMap, HashSet};

use super::spatial_query::SpatialQuery;
use crate::core::config::SpatialConfig;
use crate::scene::{BodyKey, AABB};

/// Integer grid coordinates of one cell
pub type CellKey = (i32, i32, i32);

/// Inclusive cell range covered by a box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    min: CellKey,
    max: CellKey,
}

impl CellRange {
    /// `None` when the count does not fit in a `u64`
    fn cell_count(&self) -> Option<u64> {
        let span = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1).max(0).unsigned_abs();
        span(self.min.0, self.max.0)
            .checked_mul(span(self.min.1, self.max.1))?
            .checked_mul(span(self.min.2, self.max.2))
    }

    fn contains(&self, cell: &CellKey) -> bool {
        (self.min.0..=self.max.0).contains(&cell.0)
            && (self.min.1..=self.max.1).contains(&cell.1)
            && (self.min.2..=self.max.2).contains(&cell.2)
    }

    fn cells(&self) -> impl Iterator<Item = CellKey> + '_ {
        (self.min.0..=self.max.0).flat_map(move |x| {
            (self.min.1..=self.max.1)
                .flat_map(move |y| (self.min.2..=self.max.2).map(move |z| (x, y, z)))
        })
    }
}

/// Where a body is currently registered
#[derive(Debug, Clone)]
enum Membership {
    /// Regular body: the exact cells its box touched at last insert/update
    Cells(Vec<CellKey>),
    /// Box too large (or non-finite) to rasterize; returned by every query
    Oversize,
}

/// Uniform grid spatial index
#[derive(Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    max_cells_per_body: u64,
    cells: HashMap<CellKey, HashSet<BodyKey>>,
    memberships: HashMap<BodyKey, Membership>,
    oversize: HashSet<BodyKey>,
}

impl SpatialGrid {
    /// Create an empty grid; non-positive cell sizes fall back to the default
    pub fn new(config: &SpatialConfig) -> Self {
        let cell_size = if config.cell_size > 0.0 && config.cell_size.is_finite() {
            config.cell_size
        } else {
            log::warn!(
                "Invalid spatial cell size {}, using {}",
                config.cell_size,
                SpatialConfig::default().cell_size
            );
            SpatialConfig::default().cell_size
        };
        Self {
            cell_size,
            max_cells_per_body: config.max_cells_per_body.max(1),
            cells: HashMap::new(),
            memberships: HashMap::new(),
            oversize: HashSet::new(),
        }
    }

    /// Cell edge length in world units
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing a world coordinate
    pub fn cell_of(&self, x: f32, y: f32, z: f32) -> CellKey {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
            (z / self.cell_size).floor() as i32,
        )
    }

    /// Cells a body is registered in (empty for unknown or oversize bodies)
    pub fn cells_of(&self, key: BodyKey) -> Vec<CellKey> {
        match self.memberships.get(&key) {
            Some(Membership::Cells(cells)) => cells.clone(),
            _ => Vec::new(),
        }
    }

    /// Number of non-empty cells
    pub fn occupied_cell_count(&self) -> usize {
        self.cells.len()
    }

    fn cell_range(&self, bounds: &AABB) -> Option<CellRange> {
        let finite = bounds.min.iter().chain(bounds.max.iter()).all(|v| v.is_finite());
        if !finite {
            return None;
        }
        Some(CellRange {
            min: self.cell_of(bounds.min.x, bounds.min.y, bounds.min.z),
            max: self.cell_of(bounds.max.x, bounds.max.y, bounds.max.z),
        })
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(&SpatialConfig::default())
    }
}

impl SpatialQuery for SpatialGrid {
    fn insert(&mut self, key: BodyKey, bounds: &AABB) {
        // Re-inserting without a remove would leave stale cells behind
        self.remove(key);

        let range = self
            .cell_range(bounds)
            .filter(|range| range.cell_count().is_some_and(|count| count <= self.max_cells_per_body));

        match range {
            Some(range) => {
                let cells: Vec<CellKey> = range.cells().collect();
                for cell in &cells {
                    self.cells.entry(*cell).or_default().insert(key);
                }
                log::trace!("Grid insert {:?} into {} cells", key, cells.len());
                self.memberships.insert(key, Membership::Cells(cells));
            }
            None => {
                log::warn!(
                    "Body {:?} bounds {:?}..{:?} span too many grid cells, tracking as oversize",
                    key,
                    bounds.min,
                    bounds.max
                );
                self.oversize.insert(key);
                self.memberships.insert(key, Membership::Oversize);
            }
        }
    }

    fn remove(&mut self, key: BodyKey) {
        match self.memberships.remove(&key) {
            Some(Membership::Cells(cells)) => {
                for cell in cells {
                    if let Some(bucket) = self.cells.get_mut(&cell) {
                        bucket.remove(&key);
                        if bucket.is_empty() {
                            self.cells.remove(&cell);
                        }
                    }
                }
            }
            Some(Membership::Oversize) => {
                self.oversize.remove(&key);
            }
            None => {}
        }
    }

    fn update(&mut self, key: BodyKey, bounds: &AABB) {
        self.remove(key);
        self.insert(key, bounds);
    }

    fn query_aabb(&self, bounds: &AABB, exclude: Option<BodyKey>) -> Vec<BodyKey> {
        let mut found: HashSet<BodyKey> = self.oversize.iter().copied().collect();

        match self.cell_range(bounds) {
            // Walk the query range, or the occupied cells when that is smaller
            Some(range) if range.cell_count().is_some_and(|count| count <= self.cells.len() as u64) => {
                for cell in range.cells() {
                    if let Some(bucket) = self.cells.get(&cell) {
                        found.extend(bucket.iter().copied());
                    }
                }
            }
            Some(range) => {
                for (cell, bucket) in &self.cells {
                    if range.contains(cell) {
                        found.extend(bucket.iter().copied());
                    }
                }
            }
            None => {
                found.extend(self.memberships.keys().copied());
            }
        }

        if let Some(excluded) = exclude {
            found.remove(&excluded);
        }

        let mut result: Vec<BodyKey> = found.into_iter().collect();
        result.sort_unstable();
        result
    }

    fn contains(&self, key: BodyKey) -> bool {
        self.memberships.contains_key(&key)
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.memberships.clear();
        self.oversize.clear();
    }

    fn entity_count(&self) -> usize {
        self.memberships.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
