use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::batch::TrialPlan;
use crate::config::ForagingConfig;
use crate::constants::GRID_EPSILON;
use crate::error::SimError;
use crate::random::UniformSource;
use crate::stats::{Histogram, Summary};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GridFilter {
    // Includes `second < first`, where the second rule can never fire once
    // the first fish was eaten.
    #[default]
    All,
    Ordered,
}

impl GridFilter {
    pub fn keeps(&self, first_max_kg: f64, second_max_kg: f64) -> bool {
        match self {
            GridFilter::All => true,
            GridFilter::Ordered => second_max_kg >= first_max_kg,
        }
    }
}

pub fn trial_two<S: UniformSource + ?Sized>(source: &mut S, max_kg: f64) -> f64 {
    let mut sizes = [0.0; 2];
    source.fill_unit(&mut sizes);
    let mut kg_eaten = 0.0;
    if sizes[0] <= max_kg {
        kg_eaten += sizes[0];
    }
    if sizes[1] >= kg_eaten {
        kg_eaten += sizes[1];
    }
    kg_eaten
}

pub fn trial_three<S: UniformSource + ?Sized>(
    source: &mut S,
    first_max_kg: f64,
    second_max_kg: f64,
) -> f64 {
    let mut sizes = [0.0; 3];
    source.fill_unit(&mut sizes);
    let mut kg_eaten = 0.0;
    let mut last_eaten = 0.0;
    if sizes[0] <= first_max_kg {
        last_eaten = sizes[0];
        kg_eaten += last_eaten;
    }
    if sizes[1] >= last_eaten && sizes[1] <= second_max_kg {
        last_eaten = sizes[1];
        kg_eaten += last_eaten;
    }
    if sizes[2] >= last_eaten {
        kg_eaten += sizes[2];
    }
    kg_eaten
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdResult {
    pub max_kg: f64,
    pub mean: f64,
    pub stdev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdPairResult {
    pub first_max_kg: f64,
    pub second_max_kg: f64,
    pub mean: f64,
    pub stdev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetainedSamples {
    pub max_kg: f64,
    #[serde(skip)]
    pub samples: Vec<f64>,
    pub histogram: Histogram,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForagingTwoTable {
    pub rows: Vec<ThresholdResult>,
    pub retained: Vec<RetainedSamples>,
}

impl ForagingTwoTable {
    pub fn thresholds(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.max_kg).collect()
    }

    pub fn means(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.mean).collect()
    }

    pub fn stdevs(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.stdev).collect()
    }

    // Ties go to the lower threshold.
    pub fn best(&self) -> Option<&ThresholdResult> {
        self.rows.iter().fold(None, |best, row| match best {
            Some(b) if b.mean >= row.mean => Some(b),
            _ => Some(row),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForagingThreeTable {
    pub rows: Vec<ThresholdPairResult>,
}

impl ForagingThreeTable {
    pub fn best(&self) -> Option<&ThresholdPairResult> {
        self.rows.iter().fold(None, |best, row| match best {
            Some(b) if b.mean >= row.mean => Some(b),
            _ => Some(row),
        })
    }
}

pub fn threshold_axis(cfg: &ForagingConfig) -> Vec<f64> {
    if cfg.max_kg_step <= 0.0 || cfg.max_kg_stop < 0.0 {
        return Vec::new();
    }
    let steps = (cfg.max_kg_stop / cfg.max_kg_step + GRID_EPSILON).floor() as u64;
    (0..=steps).map(|i| cfg.max_kg_step * i as f64).collect()
}

pub fn sweep_two<F>(cfg: &ForagingConfig, plan: &TrialPlan, mut on_step: F) -> Result<ForagingTwoTable, SimError>
where
    F: FnMut(&ThresholdResult),
{
    cfg.validate()?;
    plan.validate()?;

    let axis = threshold_axis(cfg);
    let started = Instant::now();
    let mut table = ForagingTwoTable::default();
    for (idx, &max_kg) in axis.iter().enumerate() {
        let samples: Vec<f64> = plan
            .run(idx as u64, |rng, n| (0..n).map(|_| trial_two(rng, max_kg)).collect::<Vec<f64>>())
            .concat();
        let summary = Summary::of(&samples);
        let row = ThresholdResult {
            max_kg,
            mean: summary.mean,
            stdev: summary.stdev,
        };
        on_step(&row);
        table.rows.push(row);

        if cfg.retains(max_kg) {
            let histogram = Histogram::of(&samples, cfg.histogram_bins, 0.0, cfg.histogram_max);
            table.retained.push(RetainedSamples {
                max_kg,
                samples,
                histogram,
            });
        }
    }
    table.retained.sort_by_key(|r| cfg.retained_rank(r.max_kg));
    log::info!(
        "foraging sweep (2 fish): {} thresholds x {} trials in {:.2?}",
        table.rows.len(),
        plan.trials,
        started.elapsed()
    );
    Ok(table)
}

pub fn sweep_three<F>(cfg: &ForagingConfig, plan: &TrialPlan, mut on_step: F) -> Result<ForagingThreeTable, SimError>
where
    F: FnMut(&ThresholdPairResult),
{
    cfg.validate()?;
    plan.validate()?;

    let axis = threshold_axis(cfg);
    let started = Instant::now();
    let mut table = ForagingThreeTable::default();
    for (i, &first_max_kg) in axis.iter().enumerate() {
        for (j, &second_max_kg) in axis.iter().enumerate() {
            if !cfg.grid_filter.keeps(first_max_kg, second_max_kg) {
                continue;
            }
            let param_index = (i * axis.len() + j) as u64;
            let samples: Vec<f64> = plan
                .run(param_index, |rng, n| {
                    (0..n)
                        .map(|_| trial_three(rng, first_max_kg, second_max_kg))
                        .collect::<Vec<f64>>()
                })
                .concat();
            let summary = Summary::of(&samples);
            let row = ThresholdPairResult {
                first_max_kg,
                second_max_kg,
                mean: summary.mean,
                stdev: summary.stdev,
            };
            on_step(&row);
            table.rows.push(row);
        }
    }
    log::info!(
        "foraging sweep (3 fish): {} cells x {} trials in {:.2?}",
        table.rows.len(),
        plan.trials,
        started.elapsed()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::CyclicSource;
    use proptest::prelude::*;

    const TEST_EPSILON: f64 = 1e-12;
    const TEST_SEED: u64 = 538;
    const TEST_TRIALS: u64 = 20_000;
    const TEST_BATCH: u64 = 4_000;
    const TEST_MEAN_TOLERANCE: f64 = 0.02;

    fn plan(trials: u64) -> TrialPlan {
        TrialPlan::new(trials, TEST_BATCH.min(trials), TEST_SEED)
    }

    #[test]
    fn equal_fish_are_both_eaten() {
        let mut src = CyclicSource::new(vec![0.5, 0.5]);
        assert!((trial_two(&mut src, 0.5) - 1.0).abs() < TEST_EPSILON);
    }

    #[test]
    fn heavy_first_fish_is_skipped() {
        let mut src = CyclicSource::new(vec![0.9, 0.9]);
        assert!((trial_two(&mut src, 0.5) - 0.9).abs() < TEST_EPSILON);
    }

    #[test]
    fn smaller_second_fish_is_skipped() {
        let mut src = CyclicSource::new(vec![0.4, 0.2]);
        assert!((trial_two(&mut src, 0.5) - 0.4).abs() < TEST_EPSILON);
    }

    #[test]
    fn three_hours_follow_last_eaten() {
        let mut src = CyclicSource::new(vec![0.3, 0.6, 0.5]);
        assert!((trial_three(&mut src, 0.5, 1.0) - 0.9).abs() < TEST_EPSILON);

        // Second fish over its threshold: the third only has to beat the first.
        let mut src = CyclicSource::new(vec![0.3, 0.6, 0.7]);
        assert!((trial_three(&mut src, 0.5, 0.5) - 1.0).abs() < TEST_EPSILON);

        // Nothing eaten early: the last fish is always eaten.
        let mut src = CyclicSource::new(vec![0.8, 0.9, 0.1]);
        assert!((trial_three(&mut src, 0.0, 0.0) - 0.1).abs() < TEST_EPSILON);
    }

    #[test]
    fn default_axis_has_eleven_thresholds() {
        let axis = threshold_axis(&ForagingConfig::default());
        assert_eq!(axis.len(), 11);
        assert_eq!(axis[0], 0.0);
        assert!((axis[10] - 1.0).abs() < TEST_EPSILON);
    }

    #[test]
    fn boundary_policies_differ() {
        let table = sweep_two(&ForagingConfig::default(), &plan(TEST_TRIALS), |_| {}).unwrap();
        let never = table.rows.first().unwrap();
        let always = table.rows.last().unwrap();
        // Never eating the first fish leaves only the second: E = 1/2.
        assert!((never.mean - 0.5).abs() < TEST_MEAN_TOLERANCE);
        // Always eating it: E = 1/2 + E[x2; x2 >= x1] = 1/2 + 1/3.
        assert!((always.mean - 5.0 / 6.0).abs() < TEST_MEAN_TOLERANCE);
        assert!(always.mean - never.mean > 0.25);

        let best = table.best().unwrap();
        assert!(table.rows.iter().all(|r| r.mean <= best.mean));
    }

    #[test]
    fn sweep_two_retains_histogram_thresholds() {
        let trials = 1_000;
        let mut trace = Vec::new();
        let table = sweep_two(&ForagingConfig::default(), &plan(trials), |row| trace.push(row.max_kg)).unwrap();
        assert_eq!(trace.len(), 11);
        assert_eq!(table.thresholds(), trace);
        assert_eq!(table.means().len(), table.stdevs().len());

        let kept: Vec<f64> = table.retained.iter().map(|r| r.max_kg).collect();
        assert_eq!(kept.len(), 2);
        // Configured order, not axis order.
        assert!((kept[0] - 1.0).abs() < TEST_EPSILON);
        assert!((kept[1] - 0.5).abs() < TEST_EPSILON);
        for r in &table.retained {
            assert_eq!(r.samples.len() as u64, trials);
            assert_eq!(r.histogram.total(), trials);
            assert_eq!(r.histogram.counts.len(), 20);
        }
    }

    #[test]
    fn retained_follow_configured_order() {
        let cfg = ForagingConfig {
            histogram_thresholds: vec![0.3, 0.9, 0.0],
            ..ForagingConfig::default()
        };
        let table = sweep_two(&cfg, &plan(200), |_| {}).unwrap();
        let kept: Vec<f64> = table.retained.iter().map(|r| r.max_kg).collect();
        assert_eq!(kept.len(), 3);
        for (k, t) in kept.iter().zip(&cfg.histogram_thresholds) {
            assert!((k - t).abs() < TEST_EPSILON);
        }
    }

    #[test]
    fn sweeps_are_reproducible() {
        let cfg = ForagingConfig::default();
        let a = sweep_two(&cfg, &plan(500), |_| {}).unwrap();
        let b = sweep_two(&cfg, &plan(500), |_| {}).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn full_grid_keeps_unordered_cells() {
        let cfg = ForagingConfig::default();
        let table = sweep_three(&cfg, &plan(200), |_| {}).unwrap();
        assert_eq!(table.rows.len(), 121);
        assert!(table.rows.iter().any(|r| r.second_max_kg < r.first_max_kg));
        assert_eq!(table.rows[1].first_max_kg, 0.0);
        assert!((table.rows[1].second_max_kg - 0.1).abs() < TEST_EPSILON);
        assert!(table.best().is_some());
    }

    #[test]
    fn ordered_grid_drops_unordered_cells() {
        let cfg = ForagingConfig {
            grid_filter: GridFilter::Ordered,
            ..ForagingConfig::default()
        };
        let table = sweep_three(&cfg, &plan(200), |_| {}).unwrap();
        assert_eq!(table.rows.len(), 66);
        assert!(table.rows.iter().all(|r| r.second_max_kg >= r.first_max_kg));
    }

    #[test]
    fn bad_step_aborts_sweep() {
        let cfg = ForagingConfig {
            max_kg_step: 0.0,
            ..ForagingConfig::default()
        };
        let mut steps = 0;
        let err = sweep_three(&cfg, &plan(200), |_| steps += 1).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
        assert_eq!(steps, 0);
    }

    proptest! {
        #[test]
        fn prop_three_hour_total_is_bounded(
            a in 0.0..1.0f64,
            b in 0.0..1.0f64,
            c in 0.0..1.0f64,
            first in 0.0..=1.0f64,
            second in 0.0..=1.0f64
        ) {
            let mut src = CyclicSource::new(vec![a, b, c]);
            let total = trial_three(&mut src, first, second);
            prop_assert!((0.0..=3.0).contains(&total));
            // Either the last fish is eaten or something heavier already was.
            prop_assert!(total >= c);
        }

        #[test]
        fn prop_two_hour_total_is_bounded(
            a in 0.0..1.0f64,
            b in 0.0..1.0f64,
            max_kg in 0.0..=1.0f64
        ) {
            let mut src = CyclicSource::new(vec![a, b]);
            let total = trial_two(&mut src, max_kg);
            prop_assert!((0.0..=2.0).contains(&total));
        }
    }
}
