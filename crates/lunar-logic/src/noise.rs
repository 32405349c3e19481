//! Sine-hash value noise and its octave (fractal) sum.
//!
//! Not a registered RNG: the same `(x, y, seed)` always hashes to the same
//! value, which is what makes map regeneration reproducible.

/// Hash a coordinate into `[0, 1)`.
///
/// `frac(sin(x·12.9898 + y·78.233 + seed) · 43758.5453)`
pub fn simple_noise(x: f64, y: f64, seed: f64) -> f64 {
    let n = (x * 12.9898 + y * 78.233 + seed).sin() * 43758.5453;
    n - n.floor()
}

/// Sum `octaves` layers of [`simple_noise`], doubling frequency and halving
/// amplitude each layer, normalised by the total amplitude.
///
/// Layer `i` is sampled with seed `seed + i`. Returns a value in `[0, 1)`.
pub fn octave_noise(x: f64, y: f64, octaves: u32, seed: f64) -> f64 {
    let mut value = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for i in 0..octaves {
        value += simple_noise(x * frequency, y * frequency, seed + i as f64) * amplitude;
        max_value += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }

    if max_value == 0.0 {
        return 0.0;
    }
    value / max_value
}
