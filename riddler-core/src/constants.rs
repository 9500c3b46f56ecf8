use std::f64::consts::TAU;

pub const DEFAULT_TRIALS: u64 = 100_000;
pub const DEFAULT_BATCH_SIZE: u64 = 10_000;

pub const DEFAULT_MIN_RATIO: f64 = 1.0;
pub const DEFAULT_MAX_RATIO: f64 = 20.0;
pub const DEFAULT_RATIO_STEP: f64 = 1.0;
// Coordinates are drawn as `u * span`.
pub const DEFAULT_ANGLE_SPAN: f64 = TAU;

pub const DEFAULT_MAX_KG_STEP: f64 = 0.1;
pub const DEFAULT_MAX_KG_STOP: f64 = 1.0;
pub const MAX_THRESHOLD_KG: f64 = 1.0;
pub const DEFAULT_HISTOGRAM_THRESHOLDS: [f64; 2] = [1.0, 0.5];
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;
pub const DEFAULT_HISTOGRAM_MAX: f64 = 2.0;

pub const GRID_EPSILON: f64 = 1e-9;
// Upper bound on the intervals in one sweep axis.
pub const MAX_SWEEP_STEPS: u64 = 10_000;
