use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialPlan {
    pub trials: u64,
    pub batch_size: u64,
    pub seed: u64,
}

impl TrialPlan {
    pub fn new(trials: u64, batch_size: u64, seed: u64) -> Self {
        Self {
            trials,
            batch_size,
            seed,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.trials == 0 {
            return Err(SimError::invalid_config("trials must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(SimError::invalid_config("batchSize must be > 0"));
        }
        // Batch indices fill the low 32 bits of the stream id.
        if self.batch_count() > u32::MAX as u64 {
            return Err(SimError::invalid_config(format!(
                "{} batches exceed the {} streams per parameter",
                self.batch_count(),
                u32::MAX
            )));
        }
        Ok(())
    }

    pub fn batch_count(&self) -> u64 {
        self.trials.div_ceil(self.batch_size)
    }

    // One stream per (param, batch), independent of rayon's scheduling.
    pub fn batch_rng(&self, param_index: u64, batch_index: u64) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream((param_index << 32) | (batch_index & 0xffff_ffff));
        rng
    }

    pub fn run<T, F>(&self, param_index: u64, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&mut ChaCha8Rng, u64) -> T + Sync,
    {
        (0..self.batch_count())
            .into_par_iter()
            .map(|batch| {
                let start = batch * self.batch_size;
                let n = self.batch_size.min(self.trials - start);
                let mut rng = self.batch_rng(param_index, batch);
                f(&mut rng, n)
            })
            .collect()
    }
}
