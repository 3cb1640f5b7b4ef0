//! Service dependency graph and per-service telemetry.

pub mod centrality;
pub mod store;

pub use store::{ServiceGraph, SharedGraph};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("service {0} not found in graph")]
    ServiceNotFound(String),
}

/// Raw telemetry and business metadata attached to a service node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceTelemetry {
    /// Fraction of failed requests, expected in [0, 1].
    pub error_rate: f64,
    /// Request latency in milliseconds.
    pub latency: f64,
    /// CPU utilisation, expected in [0, 100].
    pub cpu_usage: f64,
    /// Count of failed calls into downstream dependencies.
    pub downstream_failures: u32,
    /// Requests per minute flowing through the service.
    pub traffic_volume: f64,
    /// Business weight of the service (higher = more important).
    pub business_criticality_score: u32,
    /// SLA tier, lower = more critical.
    pub sla_tier: u32,
}

impl Default for ServiceTelemetry {
    fn default() -> Self {
        Self {
            error_rate: 0.0,
            latency: 0.0,
            cpu_usage: 0.0,
            downstream_failures: 0,
            traffic_volume: 0.0,
            business_criticality_score: 1,
            sla_tier: 3,
        }
    }
}

/// The five raw telemetry fields an `attach_telemetry` call upserts.
/// Business metadata (criticality, SLA tier) is static and not part of
/// the live feed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsUpdate {
    pub error_rate: f64,
    pub latency: f64,
    pub cpu_usage: f64,
    pub downstream_failures: u32,
    pub traffic_volume: f64,
}

/// A service node with its derived metrics. Derived fields are
/// recomputed by the store on every mutation, so readers always see
/// values consistent with the current topology and telemetry.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceNode {
    #[serde(flatten)]
    pub telemetry: ServiceTelemetry,
    /// Number of services reachable via outgoing edges (self excluded).
    pub blast_radius: usize,
    /// `min(1, error_rate * (1 + blast_radius) / node_count)`.
    pub impact_score: f64,
    /// Betweenness centrality over the full graph.
    pub centrality: f64,
}

/// Serializable snapshot of the whole graph, nodes plus edge list.
#[derive(Debug, Clone, Serialize)]
pub struct GraphView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: String,
    #[serde(flatten)]
    pub node: ServiceNode,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeView {
    pub source: String,
    pub target: String,
}
