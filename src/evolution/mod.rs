pub mod evaluator;
pub mod gene_spec;
pub mod options;

pub use evaluator::FitnessEvaluator;
pub use gene_spec::{GeneShape, GeneSpec};
pub use options::{
    CrossoverSettings, ObjectiveSpec, OptimizerOptions, OptimizerOptionsBuilder, SelectionKind,
};
