//! Telemetry-injection pipeline: attach an update to the shared
//! graph, recompute impact, and rank root-cause suspects.

use crate::classify::{RootCauseRanker, ServiceRank};
use crate::graph::{MetricsUpdate, SharedGraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A telemetry update for one service, as fed by collectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryUpdate {
    pub service: String,
    #[serde(flatten)]
    pub metrics: MetricsUpdate,
}

/// Output of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentAnalysis {
    pub analysis_id: Uuid,
    pub telemetry: TelemetryUpdate,
    pub impact_scores: BTreeMap<String, f64>,
    pub ranking: Vec<ServiceRank>,
}

/// Attach a telemetry update, recompute impact scores, and rank
/// suspects. The write guard covers the whole mutate-then-recompute
/// sequence so readers never observe stale derived fields.
pub fn run_pipeline(
    graph: &SharedGraph,
    update: TelemetryUpdate,
    ranker: &dyn RootCauseRanker,
) -> IncidentAnalysis {
    let impact_scores = {
        let mut store = graph.write();
        store.attach_telemetry(&update.service, update.metrics);
        store.impact_scores()
    };

    let ranking = ranker.rank(&impact_scores);
    let analysis_id = Uuid::new_v4();
    tracing::info!(
        %analysis_id,
        service = %update.service,
        suspects = ranking.len(),
        "pipeline run complete"
    );

    IncidentAnalysis {
        analysis_id,
        telemetry: update,
        impact_scores,
        ranking,
    }
}
