use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::batch::TrialPlan;
use crate::constants::*;
use crate::error::SimError;
use crate::foraging::GridFilter;
use crate::rendezvous::{validate_ratio, LatitudeSampling};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimConfig {
    pub trials: u64,
    pub batch_size: u64,
    pub seed: Option<u64>,
    pub rendezvous: RendezvousConfig,
    pub foraging: ForagingConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
            rendezvous: RendezvousConfig::default(),
            foraging: ForagingConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let data = fs::read(path)?;
        let cfg = serde_json::from_slice(&data)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.trials == 0 {
            return Err(SimError::invalid_config("trials must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(SimError::invalid_config("batchSize must be > 0"));
        }
        self.rendezvous.validate()?;
        self.foraging.validate()
    }

    pub fn plan(&self, fallback_seed: u64) -> TrialPlan {
        TrialPlan::new(self.trials, self.batch_size, self.seed.unwrap_or(fallback_seed))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RendezvousConfig {
    pub min_ratio: f64,
    pub max_ratio: f64,
    pub ratio_step: f64,
    pub angle_span: f64,
    pub latitude_sampling: LatitudeSampling,
}

impl Default for RendezvousConfig {
    fn default() -> Self {
        Self {
            min_ratio: DEFAULT_MIN_RATIO,
            max_ratio: DEFAULT_MAX_RATIO,
            ratio_step: DEFAULT_RATIO_STEP,
            angle_span: DEFAULT_ANGLE_SPAN,
            latitude_sampling: LatitudeSampling::default(),
        }
    }
}

impl RendezvousConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        validate_ratio(self.min_ratio)?;
        validate_ratio(self.max_ratio)?;
        if self.max_ratio < self.min_ratio {
            return Err(SimError::invalid_config("maxRatio must be >= minRatio"));
        }
        if !self.ratio_step.is_finite() || self.ratio_step <= 0.0 {
            return Err(SimError::invalid_config("ratioStep must be > 0"));
        }
        if !self.angle_span.is_finite() || self.angle_span <= 0.0 {
            return Err(SimError::invalid_config("angleSpan must be > 0"));
        }
        check_axis_steps("ratio", (self.max_ratio - self.min_ratio) / self.ratio_step)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForagingConfig {
    pub max_kg_step: f64,
    pub max_kg_stop: f64,
    pub histogram_thresholds: Vec<f64>,
    pub histogram_bins: usize,
    pub histogram_max: f64,
    pub grid_filter: GridFilter,
}

impl Default for ForagingConfig {
    fn default() -> Self {
        Self {
            max_kg_step: DEFAULT_MAX_KG_STEP,
            max_kg_stop: DEFAULT_MAX_KG_STOP,
            histogram_thresholds: DEFAULT_HISTOGRAM_THRESHOLDS.to_vec(),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            histogram_max: DEFAULT_HISTOGRAM_MAX,
            grid_filter: GridFilter::default(),
        }
    }
}

impl ForagingConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.max_kg_step.is_finite() || self.max_kg_step <= 0.0 {
            return Err(SimError::invalid_config("maxKgStep must be > 0"));
        }
        if !(0.0..=MAX_THRESHOLD_KG).contains(&self.max_kg_stop) {
            return Err(SimError::invalid_config(format!(
                "maxKgStop must be within [0, {}]",
                MAX_THRESHOLD_KG
            )));
        }
        check_axis_steps("maxKg", self.max_kg_stop / self.max_kg_step)?;
        if self.histogram_bins == 0 {
            return Err(SimError::invalid_config("histogramBins must be > 0"));
        }
        if !self.histogram_max.is_finite() || self.histogram_max <= 0.0 {
            return Err(SimError::invalid_config("histogramMax must be > 0"));
        }
        for &t in &self.histogram_thresholds {
            if !(0.0..=self.max_kg_stop).contains(&t) || !self.on_grid(t) {
                return Err(SimError::invalid_config(format!(
                    "histogram threshold {} is not a sweep threshold",
                    t
                )));
            }
        }
        Ok(())
    }

    pub fn retains(&self, max_kg: f64) -> bool {
        self.retained_rank(max_kg).is_some()
    }

    // Position of `max_kg` in `histogram_thresholds`.
    pub fn retained_rank(&self, max_kg: f64) -> Option<usize> {
        self.histogram_thresholds
            .iter()
            .position(|t| (t - max_kg).abs() < GRID_EPSILON)
    }

    fn on_grid(&self, value: f64) -> bool {
        let k = (value / self.max_kg_step).round();
        (k * self.max_kg_step - value).abs() < GRID_EPSILON
    }
}

fn check_axis_steps(axis: &str, steps: f64) -> Result<(), SimError> {
    if steps.is_finite() && steps <= MAX_SWEEP_STEPS as f64 {
        return Ok(());
    }
    Err(SimError::invalid_config(format!(
        "{} axis has {} steps, at most {} are allowed",
        axis, steps, MAX_SWEEP_STEPS
    )))
}
