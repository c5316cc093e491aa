use rand::{seq::SliceRandom, Rng, RngCore};
use tracing::debug;

use super::{Mutation, SuccessWindow};
use crate::{
    error::{OptimizerError, Result},
    representation::{repair_empty_mask, Representation},
};

/// Success-rate driven adaptation of a bit flip probability factor.
///
/// Every `interval` generations the success rate is compared with `boundary`. If
/// `increase_for_higher_success_rate` is set, a higher rate multiplies the factor by
/// `alpha` and a lower one divides it; otherwise the directions are swapped.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SelfAdaptation {
    pub alpha: f64,
    pub boundary: f64,
    pub increase_for_higher_success_rate: bool,
    pub interval: usize,
}

impl SelfAdaptation {
    fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(OptimizerError::Configuration(format!(
                "self-adaptation alpha must be positive, got {}",
                self.alpha
            )));
        }
        if self.interval == 0 {
            return Err(OptimizerError::Configuration(
                "self-adaptation interval cannot be zero".to_string(),
            ));
        }
        Ok(())
    }

    fn adapt(&self, factor: f64, success_rate: f64) -> f64 {
        let higher = success_rate > self.boundary;
        let lower = success_rate < self.boundary;
        match (higher, lower, self.increase_for_higher_success_rate) {
            (true, _, true) | (_, true, false) => factor * self.alpha,
            (true, _, false) | (_, true, true) => factor / self.alpha,
            _ => factor,
        }
    }
}

/// Probability factor shared by the bit flip operators.
#[derive(Debug, Clone, PartialEq)]
struct FlipFactor {
    value: f64,
    adaptation: Option<(SelfAdaptation, SuccessWindow)>,
}

impl FlipFactor {
    fn fixed() -> Self {
        Self {
            value: 1.0,
            adaptation: None,
        }
    }

    fn adaptive(adaptation: SelfAdaptation) -> Result<Self> {
        adaptation.validate()?;
        let window = SuccessWindow::new(adaptation.interval);
        Ok(Self {
            value: 1.0,
            adaptation: Some((adaptation, window)),
        })
    }

    fn record(&mut self, operator: &str, success_count: usize, offspring_size: usize) {
        if let Some((adaptation, window)) = &mut self.adaptation {
            if let Some(rate) = window.record(success_count, offspring_size) {
                let previous = self.value;
                self.value = adaptation.adapt(self.value, rate);
                debug!(operator, rate, previous, factor = self.value, "Adapted flip factor");
            }
        }
    }
}

fn check_gamma(gamma: f64) -> Result<()> {
    if gamma.is_finite() && gamma >= 0.0 {
        Ok(())
    } else {
        Err(OptimizerError::Configuration(format!(
            "gamma must be a non-negative number, got {}",
            gamma
        )))
    }
}

/// Flips every bit independently with probability `factor * gamma / N`.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomBitFlip {
    gamma: f64,
    factor: FlipFactor,
}

impl RandomBitFlip {
    /// Creates the operator with a fixed factor of 1.
    pub fn new(gamma: f64) -> Result<Self> {
        check_gamma(gamma)?;
        Ok(Self {
            gamma,
            factor: FlipFactor::fixed(),
        })
    }

    /// Creates the operator with a self-adapting factor, starting at 1.
    ///
    /// # Errors
    ///
    /// A `Configuration` error for a non-positive `gamma` or invalid adaptation settings.
    pub fn with_self_adaptation(gamma: f64, adaptation: SelfAdaptation) -> Result<Self> {
        check_gamma(gamma)?;
        Ok(Self {
            gamma,
            factor: FlipFactor::adaptive(adaptation)?,
        })
    }

    /// The current self-adaptation factor.
    pub fn factor(&self) -> f64 {
        self.factor.value
    }
}

impl Mutation for RandomBitFlip {
    fn name(&self) -> &'static str {
        "RandomBitFlip"
    }

    fn mutate(&mut self, gene: &mut Representation, rng: &mut dyn RngCore) -> Result<()> {
        let bits = gene.as_bits_mut()?;
        if bits.is_empty() {
            return Ok(());
        }
        let probability = self.factor.value * self.gamma / bits.len() as f64;
        debug!(operator = self.name(), probability, "Bit flip mutation started");

        for bit in bits.iter_mut() {
            if rng.gen::<f64>() < probability {
                *bit = !*bit;
            }
        }
        repair_empty_mask(bits, rng);
        debug!(operator = self.name(), value = %gene, "Bit flip mutation finished");
        Ok(())
    }

    fn record_generation(&mut self, success_count: usize, offspring_size: usize) {
        self.factor.record("RandomBitFlip", success_count, offspring_size);
    }
}

/// Bit flip with separate probabilities for adding and removing a set bit.
///
/// A cleared bit is set with probability `p_01 * gamma * factor / N` and a set bit
/// cleared with `p_10 * gamma * factor / N`. At most `floor(N * max_rate_of_selected_features)`
/// bits stay set; excess bits are cleared again, bits set in this step first.
#[derive(Debug, Clone, PartialEq)]
pub struct AsymmetricBitFlip {
    gamma: f64,
    p_01: f64,
    p_10: f64,
    max_rate_of_selected_features: f64,
    factor: FlipFactor,
}

impl AsymmetricBitFlip {
    /// Creates a new asymmetric bit flip.
    ///
    /// # Arguments
    ///
    /// * `gamma` - Scales both flip probabilities, which are divided by the mask length.
    /// * `p_01` - Weight for setting a cleared bit, in `[0, 1]`.
    /// * `p_10` - Weight for clearing a set bit, in `[0, 1]`.
    pub fn new(gamma: f64, p_01: f64, p_10: f64) -> Result<Self> {
        check_gamma(gamma)?;
        for (name, p) in [("p_01", p_01), ("p_10", p_10)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(OptimizerError::Configuration(format!(
                    "{} must lie in [0, 1], got {}",
                    name, p
                )));
            }
        }
        Ok(Self {
            gamma,
            p_01,
            p_10,
            max_rate_of_selected_features: 1.0,
            factor: FlipFactor::fixed(),
        })
    }

    /// Limits the share of set bits after mutation.
    pub fn with_max_rate_of_selected_features(mut self, rate: f64) -> Result<Self> {
        if !(rate > 0.0 && rate <= 1.0) {
            return Err(OptimizerError::Configuration(format!(
                "max rate of selected features must lie in (0, 1], got {}",
                rate
            )));
        }
        self.max_rate_of_selected_features = rate;
        Ok(self)
    }

    /// Switches to a self-adapting factor.
    pub fn with_self_adaptation(mut self, adaptation: SelfAdaptation) -> Result<Self> {
        self.factor = FlipFactor::adaptive(adaptation)?;
        Ok(self)
    }

    pub fn factor(&self) -> f64 {
        self.factor.value
    }
}

impl Mutation for AsymmetricBitFlip {
    fn name(&self) -> &'static str {
        "AsymmetricBitFlip"
    }

    fn mutate(&mut self, gene: &mut Representation, rng: &mut dyn RngCore) -> Result<()> {
        let bits = gene.as_bits_mut()?;
        let length = bits.len();
        if length == 0 {
            return Ok(());
        }
        let scale = self.gamma * self.factor.value / length as f64;
        let (add, remove) = (self.p_01 * scale, self.p_10 * scale);

        let mut added = Vec::new();
        for (position, bit) in bits.iter_mut().enumerate() {
            if *bit {
                if rng.gen::<f64>() < remove {
                    *bit = false;
                }
            } else if rng.gen::<f64>() < add {
                *bit = true;
                added.push(position);
            }
        }

        let max_allowed = (length as f64 * self.max_rate_of_selected_features).floor() as usize;
        let mut selected = bits.iter().filter(|&&bit| bit).count();
        while selected > max_allowed {
            let position = if added.is_empty() {
                let set: Vec<usize> = (0..length).filter(|&i| bits[i]).collect();
                match set.choose(rng) {
                    Some(&position) => position,
                    None => break,
                }
            } else {
                added.swap_remove(rng.gen_range(0..added.len()))
            };
            bits[position] = false;
            selected -= 1;
        }

        repair_empty_mask(bits, rng);
        debug!(operator = self.name(), value = %gene, "Asymmetric bit flip finished");
        Ok(())
    }

    fn record_generation(&mut self, success_count: usize, offspring_size: usize) {
        self.factor.record("AsymmetricBitFlip", success_count, offspring_size);
    }
}
