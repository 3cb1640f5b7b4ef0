//! Root-cause ranking and the boundary contract for the external
//! statistical classifier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feature vector handed to the classifier collaborator. Callers must
/// clamp before invocation; the classifier assumes in-range inputs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureVector {
    pub error_rate: f64,
    pub latency: f64,
    pub cpu_usage: f64,
    pub downstream_failures: f64,
    pub impact_score: f64,
}

impl FeatureVector {
    /// Clamp every feature to its valid range: error rate and impact
    /// score to [0, 1], latency to [0, 5000], CPU to [0, 100],
    /// downstream failures to [0, 10].
    pub fn clamped(&self) -> Self {
        Self {
            error_rate: self.error_rate.clamp(0.0, 1.0),
            latency: self.latency.clamp(0.0, 5000.0),
            cpu_usage: self.cpu_usage.clamp(0.0, 100.0),
            downstream_failures: self.downstream_failures.clamp(0.0, 10.0),
            impact_score: self.impact_score.clamp(0.0, 1.0),
        }
    }
}

/// Whether a feature pushed the classifier's probability up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increases,
    Decreases,
}

/// Per-feature attribution returned by the classifier on request.
/// `impact_percent` values sum to 100 across features, sorted
/// descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAttribution {
    pub feature_name: String,
    pub impact_percent: f64,
    pub direction: Direction,
    pub raw_attribution: f64,
}

/// Capability contract for the external root-cause classifier. This
/// crate never implements the scoring itself; whichever concrete
/// scorer is wired in satisfies this.
pub trait RootCauseClassifier {
    /// Root-cause probability in [0, 1] for a clamped feature vector.
    fn probability(&self, features: &FeatureVector) -> f64;

    /// Ranked per-feature attributions for the prediction.
    fn attributions(&self, features: &FeatureVector) -> Vec<FeatureAttribution>;
}

/// One row of a root-cause suspect ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRank {
    pub service: String,
    pub impact_score: f64,
}

/// Capability with a single ranking operation over per-service impact
/// scores.
pub trait RootCauseRanker {
    fn rank(&self, impact_scores: &BTreeMap<String, f64>) -> Vec<ServiceRank>;
}

/// Default ranker: highest impact score first, ties broken by service
/// name so the order is reproducible.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImpactRanker;

impl RootCauseRanker for ImpactRanker {
    fn rank(&self, impact_scores: &BTreeMap<String, f64>) -> Vec<ServiceRank> {
        let mut ranking: Vec<ServiceRank> = impact_scores
            .iter()
            .map(|(service, score)| ServiceRank {
                service: service.clone(),
                impact_score: *score,
            })
            .collect();
        // Stable sort over the name-ordered input keeps ties
        // alphabetical.
        ranking.sort_by(|a, b| b.impact_score.total_cmp(&a.impact_score));
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_pins_every_feature_to_its_range() {
        let wild = FeatureVector {
            error_rate: 1.8,
            latency: 9000.0,
            cpu_usage: -5.0,
            downstream_failures: 25.0,
            impact_score: -0.1,
        };
        let clamped = wild.clamped();
        assert_eq!(clamped.error_rate, 1.0);
        assert_eq!(clamped.latency, 5000.0);
        assert_eq!(clamped.cpu_usage, 0.0);
        assert_eq!(clamped.downstream_failures, 10.0);
        assert_eq!(clamped.impact_score, 0.0);
    }

    #[test]
    fn clamp_leaves_in_range_values_alone() {
        let fine = FeatureVector {
            error_rate: 0.25,
            latency: 3500.0,
            cpu_usage: 88.0,
            downstream_failures: 2.0,
            impact_score: 0.4,
        };
        assert_eq!(fine.clamped(), fine);
    }

    #[test]
    fn impact_ranker_sorts_descending_with_alphabetical_ties() {
        let scores = BTreeMap::from([
            ("auth-service".to_string(), 0.2),
            ("frontend".to_string(), 0.9),
            ("database".to_string(), 0.2),
        ]);
        let ranking = ImpactRanker.rank(&scores);
        assert_eq!(ranking[0].service, "frontend");
        assert_eq!(ranking[1].service, "auth-service");
        assert_eq!(ranking[2].service, "database");
    }

    // A stub scorer standing in for the external classifier.
    struct FixedClassifier(f64);

    impl RootCauseClassifier for FixedClassifier {
        fn probability(&self, _features: &FeatureVector) -> f64 {
            self.0
        }

        fn attributions(&self, _features: &FeatureVector) -> Vec<FeatureAttribution> {
            vec![
                FeatureAttribution {
                    feature_name: "error_rate".to_string(),
                    impact_percent: 70.0,
                    direction: Direction::Increases,
                    raw_attribution: 0.42,
                },
                FeatureAttribution {
                    feature_name: "latency".to_string(),
                    impact_percent: 30.0,
                    direction: Direction::Decreases,
                    raw_attribution: -0.18,
                },
            ]
        }
    }

    #[test]
    fn classifier_boundary_is_object_safe() {
        let classifier: Box<dyn RootCauseClassifier> = Box::new(FixedClassifier(0.8));
        let features = FeatureVector::default().clamped();
        assert_eq!(classifier.probability(&features), 0.8);

        let attributions = classifier.attributions(&features);
        let total: f64 = attributions.iter().map(|a| a.impact_percent).sum();
        assert_eq!(total, 100.0);
        assert!(attributions[0].impact_percent >= attributions[1].impact_percent);
    }
}
