use crate::blast::severity::{self, SeverityLevel};
use crate::graph::{AnalysisError, ServiceGraph};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Weights for the blast-radius score's linear combination. Callers
/// may override per estimate; overrides are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlastWeights {
    /// Multiplier for the impacted-service count.
    pub alpha: f64,
    /// Multiplier for total traffic volume.
    pub beta: f64,
    /// Multiplier for aggregated business criticality.
    pub gamma: f64,
    /// Multiplier for the deepest BFS layer reached.
    pub delta: f64,
}

impl Default for BlastWeights {
    fn default() -> Self {
        Self {
            alpha: 2.0,
            beta: 0.001,
            gamma: 1.5,
            delta: 5.0,
        }
    }
}

/// Full blast-radius estimate for a suspected root-cause service.
#[derive(Debug, Clone, Serialize)]
pub struct BlastRadiusReport {
    pub root_service: String,
    /// Downstream services in BFS discovery order (layer, then
    /// edge-insertion order within a layer).
    pub downstream_services: Vec<String>,
    pub total_services_impacted: usize,
    pub max_depth: usize,
    pub total_traffic_impacted: f64,
    pub aggregated_criticality_score: u64,
    pub blast_radius_score: f64,
    pub severity_score: f64,
    pub severity_level: SeverityLevel,
    pub explanation: String,
}

/// Estimate how far a failure at `root` propagates through the
/// dependency graph, and independently score how severe the root's
/// own state is.
pub fn estimate_blast_radius(
    graph: &ServiceGraph,
    root: &str,
    weights: Option<BlastWeights>,
) -> Result<BlastRadiusReport, AnalysisError> {
    if !graph.contains(root) {
        return Err(AnalysisError::ServiceNotFound(root.to_string()));
    }
    let weights = weights.unwrap_or_default();

    // 1. BFS over outgoing edges, tracking per-node depth. The root
    //    anchors depth 0 but is excluded from the downstream set.
    let mut downstream: Vec<String> = Vec::new();
    let mut max_depth = 0usize;
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    visited.insert(root);
    queue.push_back((root, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if current != root {
            downstream.push(current.to_string());
            max_depth = max_depth.max(depth);
        }
        for next in graph.successors(current) {
            if visited.insert(next) {
                queue.push_back((next, depth + 1));
            }
        }
    }

    // 2. Aggregate metrics over the impacted set.
    let total_services_impacted = downstream.len();
    let mut total_traffic_impacted = 0.0;
    let mut aggregated_criticality_score = 0u64;
    for name in &downstream {
        if let Some(node) = graph.node(name) {
            total_traffic_impacted += node.telemetry.traffic_volume;
            aggregated_criticality_score += u64::from(node.telemetry.business_criticality_score);
        }
    }

    // 3. Weighted blast-radius score.
    let blast_radius_score = weights.alpha * total_services_impacted as f64
        + weights.beta * total_traffic_impacted
        + weights.gamma * aggregated_criticality_score as f64
        + weights.delta * max_depth as f64;

    // 4. Severity of the root node itself, independent of the
    //    downstream set.
    let root_node = graph
        .node(root)
        .ok_or_else(|| AnalysisError::ServiceNotFound(root.to_string()))?;
    let severity_score = severity::severity_score(&root_node.telemetry, root_node.impact_score);
    let severity_level = severity::classify(severity_score);

    let explanation = format!(
        "Service {root} impacts {total_services_impacted} downstream services; \
         combined severity score {severity_score:.2} yields a {severity_level} classification."
    );

    tracing::info!(
        root,
        impacted = total_services_impacted,
        score = blast_radius_score,
        %severity_level,
        "blast radius estimated"
    );

    Ok(BlastRadiusReport {
        root_service: root.to_string(),
        downstream_services: downstream,
        total_services_impacted,
        max_depth,
        total_traffic_impacted,
        aggregated_criticality_score,
        blast_radius_score,
        severity_score,
        severity_level,
        explanation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ServiceTelemetry;

    fn chain() -> ServiceGraph {
        let services = [
            ("frontend", 15_000.0, 5),
            ("auth-service", 12_000.0, 5),
            ("payment-service", 8_000.0, 5),
            ("database", 5_000.0, 4),
        ];
        ServiceGraph::with_topology(
            services.iter().map(|(name, traffic, crit)| {
                (
                    name.to_string(),
                    ServiceTelemetry {
                        traffic_volume: *traffic,
                        business_criticality_score: *crit,
                        ..Default::default()
                    },
                )
            }),
            [
                ("frontend".to_string(), "auth-service".to_string()),
                ("auth-service".to_string(), "payment-service".to_string()),
                ("payment-service".to_string(), "database".to_string()),
            ],
        )
    }

    #[test]
    fn unknown_root_is_an_error() {
        let graph = chain();
        let err = estimate_blast_radius(&graph, "search", None).unwrap_err();
        assert!(matches!(err, AnalysisError::ServiceNotFound(name) if name == "search"));
    }

    #[test]
    fn chain_from_frontend() {
        let graph = chain();
        let report = estimate_blast_radius(&graph, "frontend", None).unwrap();

        assert_eq!(report.total_services_impacted, 3);
        assert_eq!(report.max_depth, 3);
        assert_eq!(
            report.downstream_services,
            vec!["auth-service", "payment-service", "database"]
        );
        assert!((report.total_traffic_impacted - 25_000.0).abs() < 1e-9);
        assert_eq!(report.aggregated_criticality_score, 14);
        // 2*3 + 0.001*25000 + 1.5*14 + 5*3
        assert!((report.blast_radius_score - 67.0).abs() < 1e-9);
    }

    #[test]
    fn leaf_root_has_empty_downstream() {
        let graph = chain();
        let report = estimate_blast_radius(&graph, "database", None).unwrap();
        assert_eq!(report.total_services_impacted, 0);
        assert_eq!(report.max_depth, 0);
        assert!(report.downstream_services.is_empty());
        assert_eq!(report.blast_radius_score, 0.0);
    }

    #[test]
    fn weight_override_applies_for_one_call_only() {
        let graph = chain();
        let heavy = BlastWeights {
            alpha: 10.0,
            beta: 0.0,
            gamma: 0.0,
            delta: 0.0,
        };
        let overridden = estimate_blast_radius(&graph, "frontend", Some(heavy)).unwrap();
        assert!((overridden.blast_radius_score - 30.0).abs() < 1e-9);

        let default_again = estimate_blast_radius(&graph, "frontend", None).unwrap();
        assert!((default_again.blast_radius_score - 67.0).abs() < 1e-9);
    }

    #[test]
    fn discovery_order_is_layer_then_edge_insertion() {
        let graph = ServiceGraph::with_topology(
            ["a", "b", "c", "d", "e"]
                .iter()
                .map(|n| (n.to_string(), ServiceTelemetry::default())),
            [
                ("a".to_string(), "c".to_string()),
                ("a".to_string(), "b".to_string()),
                ("b".to_string(), "d".to_string()),
                ("c".to_string(), "e".to_string()),
            ],
        );
        let report = estimate_blast_radius(&graph, "a", None).unwrap();
        // Layer 1 in edge-insertion order (c before b), then layer 2
        // in the order their parents were dequeued.
        assert_eq!(report.downstream_services, vec!["c", "b", "e", "d"]);
        assert_eq!(report.max_depth, 2);
    }

    #[test]
    fn traversal_terminates_on_cycles_back_to_root() {
        let graph = ServiceGraph::with_topology(
            ["a", "b"]
                .iter()
                .map(|n| (n.to_string(), ServiceTelemetry::default())),
            [
                ("a".to_string(), "b".to_string()),
                ("b".to_string(), "a".to_string()),
            ],
        );
        let report = estimate_blast_radius(&graph, "a", None).unwrap();
        assert_eq!(report.downstream_services, vec!["b"]);
        assert_eq!(report.max_depth, 1);
    }

    #[test]
    fn explanation_names_the_key_facts() {
        let graph = chain();
        let report = estimate_blast_radius(&graph, "frontend", None).unwrap();
        assert!(report.explanation.contains("frontend"));
        assert!(report.explanation.contains('3'));
        assert!(report
            .explanation
            .contains(&format!("{:.2}", report.severity_score)));
        assert!(report
            .explanation
            .contains(&report.severity_level.to_string()));
    }
}
