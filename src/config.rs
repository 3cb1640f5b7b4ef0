//! Configuration -- initial topology, telemetry baselines, and engine
//! tuning. Loaded from a TOML file, falling back to built-in defaults
//! when the file is missing or invalid.

use crate::blast::BlastWeights;
use crate::graph::{ServiceGraph, ServiceTelemetry};
use crate::similarity::DEFAULT_TOP_N;
use crate::timeline::correlator::{CASCADE_WINDOW_MINUTES, FRONT_SERVICE, USER_IMPACT_METRICS};
use crate::timeline::TimelineCorrelator;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Front-facing service; anomalies there always count as user
    /// impact.
    pub front_service: String,
    pub cascade_window_minutes: i64,
    pub user_impact_metrics: Vec<String>,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            front_service: FRONT_SERVICE.to_string(),
            cascade_window_minutes: CASCADE_WINDOW_MINUTES,
            user_impact_metrics: USER_IMPACT_METRICS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilaritySettings {
    pub top_n: usize,
}

impl Default for SimilaritySettings {
    fn default() -> Self {
        Self { top_n: DEFAULT_TOP_N }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub topology: Vec<DependencyEdge>,
    /// Seed telemetry per service; doubles as the reset baseline.
    pub baseline: BTreeMap<String, ServiceTelemetry>,
    pub blast: BlastWeights,
    pub timeline: TimelineSettings,
    pub similarity: SimilaritySettings,
}

impl Default for Config {
    fn default() -> Self {
        let chain = [
            ("frontend", "auth-service"),
            ("auth-service", "payment-service"),
            ("payment-service", "database"),
        ];
        let baseline = [
            ("frontend", 0.01, 50.0, 30.0, 0, 15_000.0, 5, 1),
            ("auth-service", 0.05, 120.0, 60.0, 2, 12_000.0, 5, 2),
            ("payment-service", 0.15, 300.0, 85.0, 8, 8_000.0, 5, 1),
            ("database", 0.02, 80.0, 45.0, 0, 5_000.0, 4, 1),
        ];

        Self {
            topology: chain
                .iter()
                .map(|(source, target)| DependencyEdge {
                    source: source.to_string(),
                    target: target.to_string(),
                })
                .collect(),
            baseline: baseline
                .iter()
                .map(
                    |(name, error_rate, latency, cpu_usage, downstream, traffic, crit, sla)| {
                        (
                            name.to_string(),
                            ServiceTelemetry {
                                error_rate: *error_rate,
                                latency: *latency,
                                cpu_usage: *cpu_usage,
                                downstream_failures: *downstream,
                                traffic_volume: *traffic,
                                business_criticality_score: *crit,
                                sla_tier: *sla,
                            },
                        )
                    },
                )
                .collect(),
            blast: BlastWeights::default(),
            timeline: TimelineSettings::default(),
            similarity: SimilaritySettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to the
    /// built-in defaults if the file is missing or invalid.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match std::fs::read_to_string(path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                warn!(path = %path.display(), %err, "config not readable, using defaults");
                Self::default()
            }
        }
    }

    /// Build the initial service graph from topology and baseline.
    pub fn build_graph(&self) -> ServiceGraph {
        ServiceGraph::with_topology(
            self.baseline
                .iter()
                .map(|(name, telemetry)| (name.clone(), telemetry.clone())),
            self.topology
                .iter()
                .map(|edge| (edge.source.clone(), edge.target.clone())),
        )
    }

    /// Build a timeline correlator from the configured constants.
    pub fn correlator(&self) -> TimelineCorrelator {
        TimelineCorrelator::new(
            self.timeline.front_service.clone(),
            Duration::minutes(self.timeline.cascade_window_minutes),
            self.timeline.user_impact_metrics.iter().cloned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_topology_is_the_four_service_chain() {
        let config = Config::default();
        let graph = config.build_graph();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.node("frontend").unwrap().blast_radius, 3);
        assert!((graph.node("payment-service").unwrap().telemetry.error_rate - 0.15).abs() < 1e-12);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/outagescope.toml")));
        assert_eq!(config.topology.len(), 3);
        assert_eq!(config.similarity.top_n, DEFAULT_TOP_N);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outagescope.toml");
        std::fs::write(
            &path,
            r#"
                [[topology]]
                source = "api"
                target = "db"

                [baseline.api]
                error_rate = 0.02
                latency = 40.0

                [baseline.db]
                traffic_volume = 900.0

                [blast]
                alpha = 3.0

                [timeline]
                cascade_window_minutes = 5

                [similarity]
                top_n = 1
            "#,
        )
        .unwrap();

        let config = Config::load(Some(&path));
        assert_eq!(config.topology.len(), 1);
        assert_eq!(config.blast.alpha, 3.0);
        assert_eq!(config.blast.delta, 5.0);
        assert_eq!(config.timeline.cascade_window_minutes, 5);
        assert_eq!(config.similarity.top_n, 1);

        let graph = config.build_graph();
        assert_eq!(graph.node_count(), 2);
        assert!((graph.node("api").unwrap().telemetry.error_rate - 0.02).abs() < 1e-12);
    }

    #[test]
    fn invalid_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "topology = 7").unwrap();
        let config = Config::load(Some(&path));
        assert_eq!(config.topology.len(), 3);
    }

    #[test]
    fn default_config_survives_a_toml_round_trip() {
        let config = Config::default();
        let raw = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&raw).unwrap();
        assert_eq!(parsed.topology.len(), config.topology.len());
        assert_eq!(parsed.baseline.len(), config.baseline.len());
    }
}
