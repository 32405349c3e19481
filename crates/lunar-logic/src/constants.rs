//! Fixed tuning values: map size, lunar cycle, comm range, score weights.
//!
//! Plain constants with no runtime dependency. The engine, the session
//! layer, and the headless harness all read these.

// ============================================================================
// MAP
// ============================================================================

pub mod map {
    /// Grid width of the reference mission map (cells).
    pub const WIDTH: u32 = 80;
    /// Grid height of the reference mission map (cells).
    pub const HEIGHT: u32 = 60;
    /// One crater per this many cells.
    pub const CELLS_PER_CRATER: u32 = 400;
    pub const CRATER_MIN_RADIUS: f64 = 2.0;
    pub const CRATER_RADIUS_SPAN: f64 = 8.0;
    pub const CRATER_MIN_DEPTH: f64 = 0.3;
    pub const CRATER_DEPTH_SPAN: f64 = 0.7;
    /// Rim band extends to this multiple of the crater radius.
    pub const CRATER_RIM_EXTENT: f64 = 1.5;
    /// Peak roughness added at the inner edge of the rim.
    pub const CRATER_RIM_LIFT: f64 = 0.2;
}

// ============================================================================
// NOISE SEEDS (one per derived field)
// ============================================================================

pub mod noise_seeds {
    pub const VISIBILITY: f64 = 100.0;
    pub const ROUGHNESS: f64 = 200.0;
    pub const SLOPE: f64 = 300.0;
    pub const RESOURCE: f64 = 400.0;
    pub const UNCERTAINTY: f64 = 500.0;
}

// ============================================================================
// SOLAR
// ============================================================================

pub mod solar {
    /// Length of one lunar day/night cycle, in mission days.
    pub const CYCLE_DAYS: u32 = 14;
    /// Output multiplier during the lunar night.
    pub const NIGHT_FACTOR: f64 = 0.1;
    /// Peak panel output at full visibility (kW).
    pub const PEAK_POWER: f64 = 100.0;
    /// Cycle-averaged output at full visibility (kW).
    pub const AVERAGE_POWER: f64 = 55.0;
    /// Night-time floor at full visibility (kW).
    pub const MIN_POWER: f64 = 10.0;
    /// Visibility lost per unit of distance from the equator row.
    pub const LATITUDE_PENALTY: f64 = 0.5;
}

// ============================================================================
// COMMUNICATION
// ============================================================================

pub mod comm {
    /// Baseline link range (grid units).
    pub const MAX_DISTANCE: f64 = 150.0;
    /// Range multiplier when either endpoint is a relay.
    pub const RELAY_MULTIPLIER: f64 = 1.5;
    /// Links below this quality are flagged unstable.
    pub const STABLE_QUALITY: f64 = 0.5;
}

// ============================================================================
// CONSTRAINTS
// ============================================================================

pub mod thresholds {
    /// Terrain above this roughness or slope cannot be built on.
    pub const MAX_BUILDABLE_ROUGHNESS: f64 = 0.9;
    pub const MAX_BUILDABLE_SLOPE: f64 = 0.9;
    /// A surplus below this is reported as a thin margin.
    pub const POWER_MARGIN: f64 = 50.0;

    // Stability deductions
    pub const PENALTY_POWER_DEFICIT: f64 = 0.4;
    pub const PENALTY_LOW_MARGIN: f64 = 0.2;
    pub const PENALTY_DISCONNECTED: f64 = 0.5;
    pub const PENALTY_UNSTABLE_LINK: f64 = 0.1;
    pub const PENALTY_UNBUILDABLE: f64 = 0.3;
}

// ============================================================================
// SCORING
// ============================================================================

pub mod weights {
    pub const COST: f64 = 0.2;
    pub const SURVIVAL: f64 = 0.3;
    pub const SCIENCE: f64 = 0.3;
    pub const STABILITY: f64 = 0.2;

    pub const SCIENCE_PER_RESEARCH: f64 = 30.0;
    pub const SCIENCE_PER_MINING: f64 = 20.0;
}

// ============================================================================
// TURN STATE
// ============================================================================

/// Undo snapshots retained before the oldest is evicted.
pub const HISTORY_CAPACITY: usize = 64;

/// Fraction of the base cost returned when an outpost is removed.
pub const REMOVAL_REFUND: f64 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_weights_sum_to_one() {
        let sum = weights::COST + weights::SURVIVAL + weights::SCIENCE + weights::STABILITY;
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
