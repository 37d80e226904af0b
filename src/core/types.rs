//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Temperature in Kelvin
pub type Kelvin = f64;

/// Simulation tick counter (one host game tick)
pub type Tick = u64;

/// Unique identifier for a reactor instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReactorId(pub Uuid);

impl ReactorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReactorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable identifier of a component inside one reactor grid
///
/// Assigned at placement and never reused by the same grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u32);

/// Integer cell coordinate inside a reactor grid
///
/// Ordering is lexicographic on (x, y, z), which matches the grid's storage
/// order. Every stage that accumulates floating point sums walks cells in this
/// order so results are reproducible.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Orthogonal neighbor offsets in the fixed order used by every traversal
    pub const DIRECTIONS: [(i32, i32, i32); 6] = [
        (-1, 0, 0),
        (1, 0, 0),
        (0, -1, 0),
        (0, 1, 0),
        (0, 0, -1),
        (0, 0, 1),
    ];

    #[inline]
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// All six orthogonal neighbors, bounds not checked
    pub fn orthogonal(&self) -> impl Iterator<Item = GridCoord> + '_ {
        Self::DIRECTIONS
            .iter()
            .map(move |&(dx, dy, dz)| self.offset(dx, dy, dz))
    }

    pub fn manhattan(&self, other: &Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }
}

impl From<[i32; 3]> for GridCoord {
    fn from(v: [i32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Extent of a reactor grid along each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl GridDimensions {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub const fn cube(side: u32) -> Self {
        Self::new(side, side, side)
    }

    /// Largest grid a reactor may occupy
    ///
    /// Keeps per-tick buffers bounded and every coordinate inside `i32`.
    pub const MAX_CELLS: usize = 1 << 24;

    /// Cell count, saturating for dimensions that failed [`validate`](Self::validate)
    pub fn cell_count(&self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(self.depth as usize)
    }

    /// Check the dimensions describe a usable grid; returns the cell count
    pub fn validate(&self) -> std::result::Result<usize, String> {
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(format!("{} has a zero axis", self));
        }
        if [self.width, self.height, self.depth]
            .iter()
            .any(|&axis| axis > i32::MAX as u32)
        {
            return Err(format!("{} has an axis beyond i32::MAX", self));
        }
        let cells = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|c| c.checked_mul(self.depth as usize))
            .filter(|&c| c <= Self::MAX_CELLS)
            .ok_or_else(|| format!("{} exceeds {} cells", self, Self::MAX_CELLS))?;
        Ok(cells)
    }

    #[inline]
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && coord.z >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
            && (coord.z as u32) < self.depth
    }

    /// Linear storage index; ascending index is ascending coordinate order
    #[inline]
    pub fn index_of(&self, coord: GridCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let (x, y, z) = (coord.x as usize, coord.y as usize, coord.z as usize);
        Some((x * self.height as usize + y) * self.depth as usize + z)
    }

    #[inline]
    pub fn coord_of(&self, index: usize) -> GridCoord {
        let depth = self.depth as usize;
        let height = self.height as usize;
        let z = index % depth;
        let y = (index / depth) % height;
        let x = index / (depth * height);
        GridCoord::new(x as i32, y as i32, z as i32)
    }

    /// Longest orthogonal path between any two cells
    pub fn max_span(&self) -> u32 {
        self.width
            .saturating_sub(1)
            .saturating_add(self.height.saturating_sub(1))
            .saturating_add(self.depth.saturating_sub(1))
    }
}

impl std::fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}
