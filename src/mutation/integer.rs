use rand::{Rng, RngCore};
use tracing::debug;

use super::{Mutation, SuccessWindow};
use crate::{
    error::{OptimizerError, Result},
    representation::Representation,
};

/// Generations per success window of the 1/5 rule.
const SUCCESS_RULE_INTERVAL: usize = 5;

/// How the expected step size of [`IntegerMutation`] changes over a run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepSizeAdaptation {
    /// 1/5 success rule, evaluated every five generations: a success rate above 1/5
    /// multiplies the expected step size by `alpha`, one below 1/5 divides it.
    SuccessRule { alpha: f64 },
    /// Deterministic decay `15000 * a^t + t * (1 - 15000 * a^t) / (T - 1)` for
    /// generation `t` of `generation_limit` (`T`).
    Decay {
        parameter: f64,
        generation_limit: usize,
    },
}

/// Rudolph's integer mutation (PPSN III) for bounded integer scalars.
///
/// With probability `probability` the value moves by `g * step_size`, where `g` is
/// the difference of two geometrically distributed variables whose spread is set by
/// the expected step size. The result is clamped to the gene bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerMutation {
    probability: f64,
    step_size: f64,
    adaptation: StepSizeAdaptation,
    expected_step_size: Option<f64>,
    window: SuccessWindow,
}

impl IntegerMutation {
    /// Creates a new integer mutation.
    ///
    /// # Arguments
    ///
    /// * `probability` - The chance that a gene is mutated at all, in `[0, 1]`.
    /// * `step_size` - The distance of one geometric step.
    /// * `adaptation` - How the expected step size changes between generations.
    ///
    /// The expected step size starts at half the range of the first mutated gene.
    pub fn new(probability: f64, step_size: f64, adaptation: StepSizeAdaptation) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(OptimizerError::Configuration(format!(
                "mutation probability must lie in [0, 1], got {}",
                probability
            )));
        }
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(OptimizerError::Configuration(format!(
                "step size must be positive, got {}",
                step_size
            )));
        }
        match adaptation {
            StepSizeAdaptation::SuccessRule { alpha } if !(alpha.is_finite() && alpha > 0.0) => {
                return Err(OptimizerError::Configuration(format!(
                    "alpha must be positive, got {}",
                    alpha
                )));
            }
            StepSizeAdaptation::Decay {
                generation_limit, ..
            } if generation_limit < 2 => {
                return Err(OptimizerError::Configuration(
                    "step size decay needs a generation limit of at least 2".to_string(),
                ));
            }
            _ => {}
        }

        Ok(Self {
            probability,
            step_size,
            adaptation,
            expected_step_size: None,
            window: SuccessWindow::new(SUCCESS_RULE_INTERVAL),
        })
    }

    /// The expected step size, once the first gene has been mutated.
    pub fn expected_step_size(&self) -> Option<f64> {
        self.expected_step_size
    }

    /// Sets the expected step size, e.g. when a run is resumed.
    pub fn set_expected_step_size(&mut self, value: f64) {
        self.expected_step_size = Some(value);
    }

    fn decayed(parameter: f64, generation: usize, generation_limit: usize) -> f64 {
        let t = generation as f64;
        let head = 15000.0 * parameter.powf(t);
        head + t * (1.0 - head) / (generation_limit as f64 - 1.0)
    }
}

/// Draws the signed number of steps for expected step size `s`.
///
/// Zero steps become one step in a random direction; any other step count is
/// pushed one step further away from zero.
pub fn geometric_steps(s: f64, rng: &mut dyn RngCore) -> i64 {
    let p = 1.0 - s / ((1.0 + s * s).sqrt() + 1.0);
    let denominator = (1.0 - p).ln();
    let mut draw = || ((1.0 - rng.gen::<f64>()).ln() / denominator).floor() as i64;
    let g = draw().saturating_sub(draw());
    match g {
        0 if rng.gen_bool(0.5) => 1,
        0 => -1,
        g => g.saturating_add(g.signum()),
    }
}

impl Mutation for IntegerMutation {
    fn name(&self) -> &'static str {
        "IntegerMutation"
    }

    fn mutate(&mut self, gene: &mut Representation, rng: &mut dyn RngCore) -> Result<()> {
        let (value, min, max) = match gene {
            Representation::IntegerScalar { value, min, max } => (value, *min, *max),
            other => {
                return Err(OptimizerError::ShapeMismatch(format!(
                    "IntegerMutation expects IntegerScalar, got {}",
                    other.kind()
                )))
            }
        };
        let expected = *self
            .expected_step_size
            .get_or_insert(((i128::from(max) - i128::from(min)) / 2) as f64);

        if rng.gen::<f64>() >= self.probability {
            return Ok(());
        }

        let expected = match self.adaptation {
            StepSizeAdaptation::Decay {
                parameter,
                generation_limit,
            } => {
                let decayed = Self::decayed(parameter, self.window.generation(), generation_limit);
                self.expected_step_size = Some(decayed);
                decayed
            }
            StepSizeAdaptation::SuccessRule { .. } => expected,
        };

        let steps = geometric_steps(expected, rng);
        let target = *value as f64 + steps as f64 * self.step_size;
        let mutated = if target > max as f64 {
            max
        } else if target < min as f64 {
            min
        } else {
            target as i64
        };
        debug!(
            operator = self.name(),
            expected_step_size = expected,
            steps,
            from = *value,
            to = mutated,
            "Integer mutation"
        );
        *value = mutated;
        Ok(())
    }

    fn record_generation(&mut self, success_count: usize, offspring_size: usize) {
        let rate = self.window.record(success_count, offspring_size);
        if let (StepSizeAdaptation::SuccessRule { alpha }, Some(rate), Some(expected)) =
            (self.adaptation, rate, self.expected_step_size)
        {
            let adapted = if rate > 0.2 {
                expected * alpha
            } else if rate < 0.2 {
                expected / alpha
            } else {
                expected
            };
            debug!(operator = "IntegerMutation", rate, expected, adapted, "Adapted expected step size");
            self.expected_step_size = Some(adapted);
        }
    }
}
