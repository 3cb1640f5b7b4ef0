//! outagescope -- incident blast-radius, timeline, and similarity
//! analytics over a service dependency graph.
//!
//! This crate is the analytical core of an incident-response tool. It
//! owns the dependency-graph/telemetry store plus the engines that
//! read from it or from raw feeds: blast-radius estimation with
//! severity scoring, incident-timeline construction with cascade
//! detection, and historical-incident similarity matching. Transport,
//! persistence, and the statistical classifier stay outside; their
//! contracts live in [`classify`].

pub mod blast;
pub mod classify;
pub mod config;
pub mod graph;
pub mod pipeline;
pub mod similarity;
pub mod timeline;

pub use blast::{estimate_blast_radius, BlastRadiusReport, BlastWeights, SeverityLevel};
pub use config::Config;
pub use graph::{AnalysisError, MetricsUpdate, ServiceGraph, SharedGraph};
pub use pipeline::{run_pipeline, IncidentAnalysis, TelemetryUpdate};
pub use similarity::{find_similar, HistoricalIncident, IncidentFeatures, SimilarIncident};
pub use timeline::{TimelineCorrelator, TimelineEntry, TimelineEventKind};
