use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::batch::TrialPlan;
use crate::config::RendezvousConfig;
use crate::constants::GRID_EPSILON;
use crate::error::SimError;
use crate::geo::GeoPoint;
use crate::random::UniformSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LatitudeSampling {
    /// `lat = u * span`, the same as longitude. Uniform in angle, not in area,
    /// so the poles are oversampled. The published numbers were drawn this way.
    #[default]
    UniformAngle,
    /// `lat = asin(2u - 1)`, uniform over the sphere's surface.
    AreaPreserving,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSampler {
    pub span: f64,
    pub latitude: LatitudeSampling,
}

impl PointSampler {
    pub fn new(span: f64, latitude: LatitudeSampling) -> Self {
        Self { span, latitude }
    }

    pub fn from_config(cfg: &RendezvousConfig) -> Self {
        Self::new(cfg.angle_span, cfg.latitude_sampling)
    }

    pub fn point(&self, u: f64, v: f64) -> GeoPoint {
        let lat = match self.latitude {
            LatitudeSampling::UniformAngle => u * self.span,
            LatitudeSampling::AreaPreserving => (2.0 * u - 1.0).asin(),
        };
        GeoPoint::new(lat, v * self.span)
    }
}

// Draws alien A, alien B, then the patrol, each as (lat, lon).
pub fn trial<S: UniformSource + ?Sized>(source: &mut S, ratio: f64, sampler: &PointSampler) -> bool {
    debug_assert!(ratio > 0.0, "ratio must be > 0");
    let mut draws = [0.0; 6];
    source.fill_unit(&mut draws);
    let alien_a = sampler.point(draws[0], draws[1]);
    let alien_b = sampler.point(draws[2], draws[3]);
    let patrol = sampler.point(draws[4], draws[5]);

    let midpoint = alien_a.midpoint(&alien_b);
    let alien_distance = alien_a.central_angle_to(&midpoint);
    let patrol_distance = patrol.central_angle_to(&midpoint);
    patrol_distance / ratio < alien_distance
}

pub fn validate_ratio(ratio: f64) -> Result<(), SimError> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(SimError::InvalidRatio(ratio));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioResult {
    pub ratio: f64,
    pub wins: u64,
    pub trials: u64,
    pub win_rate: f64,
}

impl RatioResult {
    pub fn percentage(&self) -> f64 {
        self.win_rate * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RendezvousTable {
    pub rows: Vec<RatioResult>,
}

impl RendezvousTable {
    pub fn ratios(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.ratio).collect()
    }

    pub fn percentages(&self) -> Vec<f64> {
        self.rows.iter().map(RatioResult::percentage).collect()
    }
}

pub fn ratio_axis(cfg: &RendezvousConfig) -> Vec<f64> {
    if cfg.ratio_step <= 0.0 || cfg.max_ratio < cfg.min_ratio {
        return Vec::new();
    }
    let steps = ((cfg.max_ratio - cfg.min_ratio) / cfg.ratio_step + GRID_EPSILON).floor() as u64;
    (0..=steps)
        .map(|i| cfg.min_ratio + cfg.ratio_step * i as f64)
        .collect()
}

pub fn sweep<F>(cfg: &RendezvousConfig, plan: &TrialPlan, mut on_step: F) -> Result<RendezvousTable, SimError>
where
    F: FnMut(&RatioResult),
{
    cfg.validate()?;
    plan.validate()?;

    let sampler = PointSampler::from_config(cfg);
    let ratios = ratio_axis(cfg);
    let started = Instant::now();
    let mut rows = Vec::with_capacity(ratios.len());
    for (idx, &ratio) in ratios.iter().enumerate() {
        let wins: u64 = plan
            .run(idx as u64, |rng, n| {
                (0..n).filter(|_| trial(rng, ratio, &sampler)).count() as u64
            })
            .into_iter()
            .sum();
        let row = RatioResult {
            ratio,
            wins,
            trials: plan.trials,
            win_rate: wins as f64 / plan.trials as f64,
        };
        on_step(&row);
        rows.push(row);
    }
    log::info!(
        "rendezvous sweep: {} ratios x {} trials in {:.2?}",
        rows.len(),
        plan.trials,
        started.elapsed()
    );
    Ok(RendezvousTable { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::CyclicSource;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::PI;

    const TEST_SEED: u64 = 2016;
    const TEST_TRIALS: u64 = 20_000;
    const TEST_BATCH: u64 = 2_500;
    const TEST_RATE_TOLERANCE: f64 = 0.01;

    fn small_config(max_ratio: f64) -> RendezvousConfig {
        RendezvousConfig {
            max_ratio,
            ..RendezvousConfig::default()
        }
    }

    #[test]
    fn default_axis_is_one_to_twenty() {
        let axis = ratio_axis(&RendezvousConfig::default());
        assert_eq!(axis.len(), 20);
        assert_eq!(axis[0], 1.0);
        assert_eq!(axis[19], 20.0);
    }

    #[test]
    fn fractional_axis_includes_end() {
        let cfg = RendezvousConfig {
            min_ratio: 0.5,
            max_ratio: 1.5,
            ratio_step: 0.1,
            ..RendezvousConfig::default()
        };
        let axis = ratio_axis(&cfg);
        assert_eq!(axis.len(), 11);
        assert!((axis[10] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn patrol_on_the_midpoint_always_wins() {
        // A at (0,0), B at (0, π/2): midpoint (0, π/4). Patrol sits on it.
        let sampler = PointSampler::new(PI, LatitudeSampling::UniformAngle);
        let mut src = CyclicSource::new(vec![0.0, 0.0, 0.0, 0.5, 0.0, 0.25]);
        assert!(trial(&mut src, 1.0, &sampler));
    }

    #[test]
    fn distant_patrol_loses_at_equal_speed() {
        // Patrol starts on the far side of the sphere from the midpoint.
        let sampler = PointSampler::new(PI, LatitudeSampling::UniformAngle);
        let mut src = CyclicSource::new(vec![0.0, 0.0, 0.0, 0.5, 0.0, 0.25 + 1.0]);
        assert!(!trial(&mut src, 1.0, &sampler));
        // Fast enough, the same patrol wins.
        let mut src = CyclicSource::new(vec![0.0, 0.0, 0.0, 0.5, 0.0, 0.25 + 1.0]);
        assert!(trial(&mut src, 5.0, &sampler));
    }

    #[test]
    fn trial_is_deterministic_for_a_seed() {
        let sampler = PointSampler::from_config(&RendezvousConfig::default());
        let mut a = ChaCha8Rng::seed_from_u64(TEST_SEED);
        let mut b = ChaCha8Rng::seed_from_u64(TEST_SEED);
        let xs: Vec<bool> = (0..500).map(|_| trial(&mut a, 2.0, &sampler)).collect();
        let ys: Vec<bool> = (0..500).map(|_| trial(&mut b, 2.0, &sampler)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn same_draws_never_lose_at_a_higher_ratio() {
        let sampler = PointSampler::from_config(&RendezvousConfig::default());
        let mut prev = 0usize;
        for ratio in 1..=10 {
            let mut rng = ChaCha8Rng::seed_from_u64(TEST_SEED);
            let wins = (0..2_000).filter(|_| trial(&mut rng, ratio as f64, &sampler)).count();
            assert!(wins >= prev);
            prev = wins;
        }
    }

    #[test]
    fn sweep_is_reproducible_and_monotone() {
        let cfg = small_config(6.0);
        let plan = TrialPlan::new(TEST_TRIALS, TEST_BATCH, TEST_SEED);
        let mut seen = Vec::new();
        let table = sweep(&cfg, &plan, |row| seen.push(row.ratio)).unwrap();
        assert_eq!(seen, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let again = sweep(&cfg, &plan, |_| {}).unwrap();
        assert_eq!(table, again);

        for pair in table.rows.windows(2) {
            assert!(pair[1].win_rate + TEST_RATE_TOLERANCE >= pair[0].win_rate);
            assert_eq!(pair[0].trials, TEST_TRIALS);
        }
        let pct = table.percentages();
        assert!(pct.iter().all(|p| (0.0..=100.0).contains(p)));
        assert!(pct[5] > pct[0]);
    }

    #[test]
    fn zero_ratio_aborts_before_running() {
        let cfg = RendezvousConfig {
            min_ratio: 0.0,
            ..RendezvousConfig::default()
        };
        let plan = TrialPlan::new(TEST_TRIALS, TEST_BATCH, TEST_SEED);
        let mut steps = 0;
        let err = sweep(&cfg, &plan, |_| steps += 1).unwrap_err();
        assert!(matches!(err, SimError::InvalidRatio(r) if r == 0.0));
        assert_eq!(steps, 0);
    }

    #[test]
    fn area_preserving_latitudes_stay_on_the_sphere() {
        let sampler = PointSampler::new(2.0 * PI, LatitudeSampling::AreaPreserving);
        for u in [0.0, 0.25, 0.5, 0.75, 0.999] {
            let p = sampler.point(u, 0.5);
            assert!(p.lat.abs() <= PI / 2.0);
            assert!((p.lon - PI).abs() < 1e-12);
        }
    }
}
