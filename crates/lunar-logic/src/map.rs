//! Lunar surface grid: terrain, solar, and resource evaluation per cell.
//!
//! `generate` rebuilds the whole grid for a mission day. Terrain and
//! resources depend only on position and the caller's [`TerrainSeed`];
//! solar output also depends on where the day falls in the 14-day cycle.

use serde::{Deserialize, Serialize};

use crate::constants::{noise_seeds, solar};
use crate::noise::octave_noise;
use crate::terrain::TerrainSeed;

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two grid positions.
pub fn distance(a: Position, b: Position) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Ground conditions at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainEvaluation {
    /// Multiplier on an outpost's base cost, in `[1, 3]`.
    pub build_cost: f64,
    /// 0 = smooth regolith, 1 = boulder field.
    pub roughness: f64,
    pub slope: f64,
}

/// Solar panel output at a cell for the generated day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarEvaluation {
    pub current_power: f64,
    pub average_power: f64,
    pub min_power: f64,
    /// Fraction of the sky visible from the cell, in `[0, 1]`.
    pub visibility: f64,
}

/// Prospecting estimate at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceEvaluation {
    pub expected_value: f64,
    /// Confidence gap on `expected_value`, in `[0.5, 1]` before any survey.
    pub uncertainty: f64,
}

/// One grid cell. Computed once per generation, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub position: Position,
    pub terrain: TerrainEvaluation,
    pub solar: SolarEvaluation,
    pub resource: ResourceEvaluation,
}

/// The full grid for one mission day, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunarMap {
    pub width: u32,
    pub height: u32,
    pub day: u32,
    cells: Vec<Cell>,
}

impl LunarMap {
    /// Build the grid for `day` using the crater layout in `terrain`.
    pub fn generate(day: u32, terrain: &TerrainSeed) -> Self {
        let width = terrain.width;
        let height = terrain.height;
        let mut cells = Vec::with_capacity(terrain.cell_count());

        for y in 0..height {
            for x in 0..width {
                let u = x as f64 / width as f64;
                let v = y as f64 / height as f64;
                cells.push(Cell {
                    position: Position::new(x as i32, y as i32),
                    terrain: terrain_at(x as f64, y as f64, u, v, terrain),
                    solar: solar_at(u, v, day),
                    resource: resource_at(u, v),
                });
            }
        }

        log::debug!(
            "Generated {}x{} lunar map for day {} ({})",
            width,
            height,
            day,
            if is_daytime(day) { "day" } else { "night" }
        );

        Self {
            width,
            height,
            day,
            cells,
        }
    }

    /// The cell at `position`, or `None` outside `[0, width) × [0, height)`.
    pub fn cell(&self, position: Position) -> Option<&Cell> {
        if position.x < 0
            || position.y < 0
            || position.x as u32 >= self.width
            || position.y as u32 >= self.height
        {
            return None;
        }
        let index = position.y as usize * self.width as usize + position.x as usize;
        self.cells.get(index)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn contains(&self, position: Position) -> bool {
        self.cell(position).is_some()
    }
}

/// Free-function form of [`LunarMap::generate`].
pub fn generate(day: u32, terrain: &TerrainSeed) -> LunarMap {
    LunarMap::generate(day, terrain)
}

/// Free-function form of [`LunarMap::cell`].
pub fn get_cell(map: &LunarMap, position: Position) -> Option<&Cell> {
    map.cell(position)
}

/// True during the first half of each 14-day lunar cycle.
pub fn is_daytime(day: u32) -> bool {
    let phase = (day % solar::CYCLE_DAYS) as f64 / solar::CYCLE_DAYS as f64;
    phase < 0.5
}

fn terrain_at(x: f64, y: f64, u: f64, v: f64, terrain: &TerrainSeed) -> TerrainEvaluation {
    let base_roughness = octave_noise(u, v, 4, noise_seeds::ROUGHNESS);
    let slope = (octave_noise(u, v, 2, noise_seeds::SLOPE) * 0.8).clamp(0.0, 1.0);

    let influence = terrain.crater_influence(x, y);
    let roughness = (base_roughness + influence.abs() * 0.5).clamp(0.0, 1.0);

    TerrainEvaluation {
        build_cost: 1.0 + roughness * 1.5 + slope * 0.5,
        roughness,
        slope,
    }
}

fn solar_at(u: f64, v: f64, day: u32) -> SolarEvaluation {
    let base_visibility = octave_noise(u, v, 3, noise_seeds::VISIBILITY);
    // Poles sit lower on the horizon
    let latitude_factor = 1.0 - (v - 0.5).abs() * solar::LATITUDE_PENALTY;
    let visibility = (base_visibility * latitude_factor).clamp(0.0, 1.0);

    let day_factor = if is_daytime(day) {
        1.0
    } else {
        solar::NIGHT_FACTOR
    };

    SolarEvaluation {
        current_power: visibility * day_factor * solar::PEAK_POWER,
        average_power: visibility * solar::AVERAGE_POWER,
        min_power: visibility * solar::MIN_POWER,
        visibility,
    }
}

fn resource_at(u: f64, v: f64) -> ResourceEvaluation {
    ResourceEvaluation {
        expected_value: octave_noise(u, v, 3, noise_seeds::RESOURCE) * 100.0,
        uncertainty: (0.5 + octave_noise(u, v, 2, noise_seeds::UNCERTAINTY) * 0.5).clamp(0.0, 1.0),
    }
}
