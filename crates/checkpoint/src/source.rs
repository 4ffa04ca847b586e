use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use slalink_config::CheckpointConfig;
use slalink_core_types::RequestUsage;

use crate::CheckpointError;

/// Where the usage of served requests comes from.
pub trait UsageSource: Send {
    /// The usage of the next `count` requests, in the order they were served.
    fn next_batch(&mut self, count: usize) -> Vec<RequestUsage>;
}

/// Randomised usage, for load generation and tests.
///
/// Each request is accepted with probability `accept_rate`, uses a uniform
/// number of units in `min_units_used..=max_units_used`, and takes
/// `floor(units * micros_per_unit)` microseconds, with the time per unit drawn
/// uniformly from `min_micros_per_unit..=max_micros_per_unit`.
pub struct SampledUsage {
    rng: Box<dyn RngCore + Send>,
    config: CheckpointConfig,
}

impl SampledUsage {
    pub fn new(rng: Box<dyn RngCore + Send>, config: CheckpointConfig) -> Result<Self, CheckpointError> {
        if config.min_units_used > config.max_units_used {
            return Err(CheckpointError::InvalidSource(
                "units used range is empty",
            ));
        }

        let (min, max) = (config.min_micros_per_unit, config.max_micros_per_unit);
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(CheckpointError::InvalidSource(
                "microseconds per unit must be a non-negative, non-empty range",
            ));
        }

        Ok(Self { rng, config })
    }

    /// A reproducible source.
    pub fn seeded(seed: u64, config: CheckpointConfig) -> Result<Self, CheckpointError> {
        Self::new(Box::new(StdRng::seed_from_u64(seed)), config)
    }

    fn sample(&mut self) -> RequestUsage {
        let accepted = self.rng.gen::<f64>() < self.config.accept_rate;

        let units = self
            .rng
            .gen_range(self.config.min_units_used..=self.config.max_units_used);

        let micros_per_unit = self
            .rng
            .gen_range(self.config.min_micros_per_unit..=self.config.max_micros_per_unit);

        // Saturates instead of wrapping; the codec rejects what does not fit.
        let elapsed_micros = (units as f64 * micros_per_unit) as u64;

        RequestUsage {
            accepted,
            units_used: u128::from(units),
            elapsed_micros,
        }
    }
}

impl UsageSource for SampledUsage {
    fn next_batch(&mut self, count: usize) -> Vec<RequestUsage> {
        (0..count).map(|_| self.sample()).collect()
    }
}

/// Replays a predetermined sequence of usages, starting over once it is
/// exhausted.
#[derive(Clone, Debug)]
pub struct FixedUsage {
    usages: Vec<RequestUsage>,
    next: usize,
}

impl FixedUsage {
    /// Fails if there is nothing to replay, since every batch would then
    /// come up short of the requested count.
    pub fn new(usages: Vec<RequestUsage>) -> Result<Self, CheckpointError> {
        if usages.is_empty() {
            return Err(CheckpointError::InvalidSource("no usages to replay"));
        }

        Ok(Self { usages, next: 0 })
    }
}

impl UsageSource for FixedUsage {
    fn next_batch(&mut self, count: usize) -> Vec<RequestUsage> {
        let batch = self
            .usages
            .iter()
            .cycle()
            .skip(self.next)
            .take(count)
            .copied()
            .collect();

        self.next = (self.next + count) % self.usages.len();
        batch
    }
}
