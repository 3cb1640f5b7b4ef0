use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of matches returned when the caller does not ask otherwise.
pub const DEFAULT_TOP_N: usize = 3;

// Feature weights: error rate dominates, impact score trails.
const ERROR_WEIGHT: f64 = 0.30;
const LATENCY_WEIGHT: f64 = 0.25;
const CPU_WEIGHT: f64 = 0.20;
const DOWNSTREAM_WEIGHT: f64 = 0.15;
const IMPACT_WEIGHT: f64 = 0.10;

const LATENCY_CEILING_MS: f64 = 5000.0;
const DOWNSTREAM_CEILING: f64 = 5.0;

/// Feature snapshot compared across incidents. `cpu` is [0, 100],
/// `downstream` a failure count, the rest as stored on the graph.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentFeatures {
    pub error_rate: f64,
    pub latency: f64,
    pub cpu: f64,
    pub downstream: f64,
    pub impact_score: f64,
}

/// A recorded incident as supplied by the history store, read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalIncident {
    pub incident_id: String,
    pub name: String,
    pub service: String,
    #[serde(flatten)]
    pub features: IncidentFeatures,
}

/// One ranked match against the history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarIncident {
    pub incident_id: String,
    pub name: String,
    pub service: String,
    /// Cosine similarity as a percentage, one decimal.
    pub similarity: f64,
}

/// Rank historical incidents by weighted cosine similarity to the
/// current snapshot, best match first. Ties keep history order.
pub fn find_similar(
    current: &IncidentFeatures,
    history: &[HistoricalIncident],
    top_n: usize,
) -> Vec<SimilarIncident> {
    if history.is_empty() {
        return Vec::new();
    }

    let current_vec = weighted_vector(current);
    let mut results: Vec<SimilarIncident> = history
        .iter()
        .map(|incident| {
            let score = cosine(&current_vec, &weighted_vector(&incident.features));
            SimilarIncident {
                incident_id: incident.incident_id.clone(),
                name: incident.name.clone(),
                service: incident.service.clone(),
                similarity: (score * 1000.0).round() / 10.0,
            }
        })
        .collect();

    // Stable sort keeps original history order on equal scores.
    results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    results.truncate(top_n);
    results
}

// Each feature is normalized to [0, 1] (latency and downstream capped,
// CPU scaled) and pre-multiplied by its weight.
fn weighted_vector(f: &IncidentFeatures) -> [f64; 5] {
    [
        f.error_rate * ERROR_WEIGHT,
        (f.latency / LATENCY_CEILING_MS).min(1.0) * LATENCY_WEIGHT,
        f.cpu / 100.0 * CPU_WEIGHT,
        (f.downstream / DOWNSTREAM_CEILING).min(1.0) * DOWNSTREAM_WEIGHT,
        f.impact_score * IMPACT_WEIGHT,
    ]
}

// Zero-magnitude vectors substitute 1.0 for the denominator so the
// formula stays total; the similarity is then 0.
fn cosine(a: &[f64; 5], b: &[f64; 5]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    let denom = norm_a * norm_b;
    let denom = if denom == 0.0 { 1.0 } else { denom };
    dot / denom
}

/// Load the ordered incident history from a JSON file.
pub fn load_history(path: &Path) -> Result<Vec<HistoricalIncident>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading incident history from {}", path.display()))?;
    let history: Vec<HistoricalIncident> =
        serde_json::from_str(&raw).context("parsing incident history JSON")?;
    tracing::info!(records = history.len(), "loaded incident history");
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(id: &str, features: IncidentFeatures) -> HistoricalIncident {
        HistoricalIncident {
            incident_id: id.to_string(),
            name: format!("incident {id}"),
            service: "payment-service".to_string(),
            features,
        }
    }

    fn hot() -> IncidentFeatures {
        IncidentFeatures {
            error_rate: 0.3,
            latency: 2500.0,
            cpu: 90.0,
            downstream: 4.0,
            impact_score: 0.6,
        }
    }

    #[test]
    fn empty_history_returns_empty() {
        assert!(find_similar(&hot(), &[], DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn identical_snapshot_scores_one_hundred() {
        let history = vec![incident("inc-1", hot())];
        let results = find_similar(&hot(), &history, DEFAULT_TOP_N);
        assert_eq!(results[0].similarity, 100.0);
    }

    #[test]
    fn results_are_sorted_descending() {
        let history = vec![
            incident(
                "far",
                IncidentFeatures {
                    error_rate: 0.01,
                    latency: 4900.0,
                    cpu: 5.0,
                    downstream: 0.0,
                    impact_score: 0.0,
                },
            ),
            incident("near", hot()),
        ];
        let results = find_similar(&hot(), &history, DEFAULT_TOP_N);
        assert_eq!(results[0].incident_id, "near");
        assert!(results[0].similarity >= results[1].similarity);
    }

    #[test]
    fn top_n_larger_than_history_returns_everything() {
        let history = vec![incident("a", hot()), incident("b", hot())];
        let results = find_similar(&hot(), &history, 10);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn ties_keep_history_order() {
        let history = vec![
            incident("first", hot()),
            incident("second", hot()),
            incident("third", hot()),
        ];
        let results = find_similar(&hot(), &history, 2);
        assert_eq!(results[0].incident_id, "first");
        assert_eq!(results[1].incident_id, "second");
    }

    #[test]
    fn zero_magnitude_snapshot_scores_zero_not_nan() {
        let silent = IncidentFeatures::default();
        let history = vec![incident("inc-1", hot())];
        let results = find_similar(&silent, &history, DEFAULT_TOP_N);
        assert_eq!(results[0].similarity, 0.0);
    }

    #[test]
    fn similarity_is_rounded_to_one_decimal() {
        let history = vec![incident(
            "inc-1",
            IncidentFeatures {
                error_rate: 0.3,
                latency: 100.0,
                cpu: 20.0,
                downstream: 1.0,
                impact_score: 0.1,
            },
        )];
        let results = find_similar(&hot(), &history, DEFAULT_TOP_N);
        let scaled = results[0].similarity * 10.0;
        assert!((scaled - scaled.round()).abs() < 1e-9);
    }

    #[test]
    fn load_history_round_trips_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(
            &path,
            r#"[{"incident_id": "inc-7", "name": "Checkout outage", "service": "payment-service",
                 "error_rate": 0.4, "latency": 3000, "cpu": 88, "downstream": 3, "impact_score": 0.5}]"#,
        )
        .unwrap();

        let history = load_history(&path).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].incident_id, "inc-7");
        assert!((history[0].features.latency - 3000.0).abs() < 1e-9);
    }
}
