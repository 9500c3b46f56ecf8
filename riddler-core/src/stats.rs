use serde::Serialize;

// Population standard deviation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub stdev: f64,
}

impl Summary {
    pub fn of(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let count = samples.len();
        let n = count as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self {
            count,
            mean,
            stdev: var.sqrt(),
        }
    }
}

// The last bin includes `hi`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Histogram {
    pub lo: f64,
    pub hi: f64,
    pub counts: Vec<u64>,
}

impl Histogram {
    // Values outside `[lo, hi]` and NaN are dropped.
    pub fn of(samples: &[f64], bins: usize, lo: f64, hi: f64) -> Self {
        let mut counts = vec![0u64; bins];
        let width = hi - lo;
        if bins == 0 || width <= 0.0 {
            return Self { lo, hi, counts };
        }
        for &v in samples {
            if !(lo..=hi).contains(&v) {
                continue;
            }
            let idx = (((v - lo) / width) * bins as f64).floor() as usize;
            counts[idx.min(bins - 1)] += 1;
        }
        Self { lo, hi, counts }
    }

    pub fn bin_width(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        (self.hi - self.lo) / self.counts.len() as f64
    }

    pub fn edges(&self) -> Vec<f64> {
        let w = self.bin_width();
        (0..self.counts.len()).map(|i| self.lo + w * i as f64).collect()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}
