use crate::{error::Result, individual::Fitness, individual::Gene};

/// The boundary to the external train/validate pipeline.
///
/// Given a fully materialized genome, returns the training objective vector and,
/// when an independent test set is configured, the test objective vector. The
/// optimizer core never computes fitness itself.
pub trait FitnessEvaluator {
    fn evaluate(&self, genome: &[Gene]) -> Result<Fitness>;
}

impl<F> FitnessEvaluator for F
where
    F: Fn(&[Gene]) -> Result<Fitness>,
{
    fn evaluate(&self, genome: &[Gene]) -> Result<Fitness> {
        self(genome)
    }
}
