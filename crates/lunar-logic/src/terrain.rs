//! Crater layout owned by the caller and threaded into map generation.
//!
//! A `TerrainSeed` is created once per session. Regenerating the map for a
//! new mission day reuses the same seed, so craters never relocate between
//! turns while solar values keep cycling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::map;

/// A circular depression with a slightly raised rim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crater {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    /// Roughness removed at the exact centre.
    pub depth: f64,
}

impl Crater {
    /// Signed roughness contribution at `(x, y)`.
    ///
    /// Negative inside the bowl (quadratic falloff to zero at the radius),
    /// positive in the rim band (linear falloff to zero at 1.5× radius),
    /// zero elsewhere.
    pub fn influence_at(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.x;
        let dy = y - self.y;
        let dist = (dx * dx + dy * dy).sqrt();

        if dist < self.radius {
            let normalized = dist / self.radius;
            -self.depth * (1.0 - normalized * normalized)
        } else if dist < self.radius * map::CRATER_RIM_EXTENT {
            let band = self.radius * (map::CRATER_RIM_EXTENT - 1.0);
            let normalized = (dist - self.radius) / band;
            map::CRATER_RIM_LIFT * (1.0 - normalized)
        } else {
            0.0
        }
    }
}

/// Seeded crater layout for a `width × height` grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSeed {
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub craters: Vec<Crater>,
}

impl TerrainSeed {
    /// Crater layout for the reference map size.
    pub fn new(seed: u64) -> Self {
        Self::with_dimensions(seed, map::WIDTH, map::HEIGHT)
    }

    /// Crater layout for an arbitrary grid size.
    ///
    /// One crater per 400 cells, centres uniform over the grid, radius in
    /// `[2, 10)`, depth in `[0.3, 1.0)`.
    pub fn with_dimensions(seed: u64, width: u32, height: u32) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let count = crater_count(width, height);

        let craters = (0..count)
            .map(|_| Crater {
                x: rng.gen::<f64>() * width as f64,
                y: rng.gen::<f64>() * height as f64,
                radius: map::CRATER_MIN_RADIUS + rng.gen::<f64>() * map::CRATER_RADIUS_SPAN,
                depth: map::CRATER_MIN_DEPTH + rng.gen::<f64>() * map::CRATER_DEPTH_SPAN,
            })
            .collect();

        log::debug!(
            "Generated {} craters for {}x{} map (seed {})",
            count,
            width,
            height,
            seed
        );

        Self {
            seed,
            width,
            height,
            craters,
        }
    }

    /// A crater-free layout, mainly for tests that need noise-only terrain.
    pub fn flat(width: u32, height: u32) -> Self {
        Self {
            seed: 0,
            width,
            height,
            craters: Vec::new(),
        }
    }

    /// Sum of every crater's influence at `(x, y)`.
    pub fn crater_influence(&self, x: f64, y: f64) -> f64 {
        self.craters.iter().map(|c| c.influence_at(x, y)).sum()
    }

    /// Number of grid cells, computed without `u32` overflow.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

fn crater_count(width: u32, height: u32) -> u64 {
    (u64::from(width) * u64::from(height)) / u64::from(map::CELLS_PER_CRATER)
}
