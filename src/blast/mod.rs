//! Blast-radius estimation and root-cause severity scoring.

pub mod estimator;
pub mod severity;

pub use estimator::{estimate_blast_radius, BlastRadiusReport, BlastWeights};
pub use severity::SeverityLevel;
