//! Terrain height queries and line-versus-heightfield intersection.
//!
//! The map is a grid of height samples, one per tile corner. Heights between
//! corners are interpolated bilinearly so that every peer sees the same
//! ground under a moving shell.

use barrage_common::{Vec3i, TILE_SHIFT, TILE_UNITS};
use serde::{Deserialize, Serialize};

use crate::collision::FRACTION_ONE;

/// Ground height lookup used by the ballistic and collision code.
pub trait Terrain {
    /// Ground height at a world position.
    fn height_at(&self, x: i32, y: i32) -> i32;

    /// Whether `pos` lies strictly below the ground. A point resting on
    /// the surface is not underground.
    fn is_underground(&self, pos: Vec3i) -> bool {
        pos.z < self.height_at(pos.x, pos.y)
    }
}

/// Terrain of uniform height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlatTerrain {
    /// Ground height everywhere
    pub height: i32,
}

impl FlatTerrain {
    /// Creates flat ground at `height`.
    #[must_use]
    pub const fn new(height: i32) -> Self {
        Self { height }
    }
}

impl Terrain for FlatTerrain {
    fn height_at(&self, _x: i32, _y: i32) -> i32 {
        self.height
    }
}

/// Height samples at tile corners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightMap {
    width: u32,
    depth: u32,
    samples: Vec<i32>,
}

impl HeightMap {
    /// Creates a map of `width x depth` corner samples, all zero.
    #[must_use]
    pub fn new(width: u32, depth: u32) -> Self {
        let width = width.max(1);
        let depth = depth.max(1);
        Self {
            width,
            depth,
            samples: vec![0; (width * depth) as usize],
        }
    }

    /// Creates a map by evaluating `f(corner_x, corner_y)`.
    #[must_use]
    pub fn from_fn(width: u32, depth: u32, mut f: impl FnMut(u32, u32) -> i32) -> Self {
        let mut map = Self::new(width, depth);
        for y in 0..map.depth {
            for x in 0..map.width {
                map.samples[(y * map.width + x) as usize] = f(x, y);
            }
        }
        map
    }

    /// Number of corner samples along x.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of corner samples along y.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Sets one corner sample; out-of-range corners are ignored.
    pub fn set(&mut self, x: u32, y: u32, height: i32) {
        if x < self.width && y < self.depth {
            self.samples[(y * self.width + x) as usize] = height;
        }
    }

    /// Corner sample, clamped to the map edge.
    #[must_use]
    pub fn sample(&self, x: i32, y: i32) -> i32 {
        let x = x.clamp(0, self.width as i32 - 1) as u32;
        let y = y.clamp(0, self.depth as i32 - 1) as u32;
        self.samples[(y * self.width + x) as usize]
    }
}

impl Terrain for HeightMap {
    fn height_at(&self, x: i32, y: i32) -> i32 {
        let (tx, ty) = (x >> TILE_SHIFT, y >> TILE_SHIFT);
        let fx = i64::from(x & (TILE_UNITS - 1));
        let fy = i64::from(y & (TILE_UNITS - 1));
        let tile = i64::from(TILE_UNITS);

        let h00 = i64::from(self.sample(tx, ty));
        let h10 = i64::from(self.sample(tx + 1, ty));
        let h01 = i64::from(self.sample(tx, ty + 1));
        let h11 = i64::from(self.sample(tx + 1, ty + 1));

        let near = h00 * (tile - fx) + h10 * fx;
        let far = h01 * (tile - fx) + h11 * fx;
        ((near * (tile - fy) + far * fy) / (tile * tile)) as i32
    }
}

/// Earliest fraction of the segment `from -> to` at which it dips below the
/// ground, or `None` if it stays on or above it.
///
/// The segment is sampled every `step` world units, and a crossing is then
/// narrowed down by bisection.
pub fn terrain_intersection(terrain: &dyn Terrain, from: Vec3i, to: Vec3i, step: i32) -> Option<i32> {
    if terrain.is_underground(from) {
        return Some(0);
    }
    let length = (to - from).length();
    let samples = (length / step.max(1)).max(1);

    let mut above = 0;
    for i in 1..=samples {
        let fraction = (i64::from(i) * i64::from(FRACTION_ONE) / i64::from(samples)) as i32;
        if terrain.is_underground(point_at(from, to, fraction)) {
            return Some(refine(terrain, from, to, above, fraction));
        }
        above = fraction;
    }
    None
}

fn point_at(from: Vec3i, to: Vec3i, fraction: i32) -> Vec3i {
    from.lerp(to, i64::from(fraction), i64::from(FRACTION_ONE))
}

fn refine(terrain: &dyn Terrain, from: Vec3i, to: Vec3i, mut above: i32, mut below: i32) -> i32 {
    while below - above > 1 {
        let mid = (above + below) / 2;
        if terrain.is_underground(point_at(from, to, mid)) {
            below = mid;
        } else {
            above = mid;
        }
    }
    below
}
