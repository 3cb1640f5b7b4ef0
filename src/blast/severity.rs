use crate::graph::ServiceTelemetry;
use serde::{Deserialize, Serialize};

/// Severity classification bands for a root-cause service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityLevel::Low => write!(f, "Low"),
            SeverityLevel::Medium => write!(f, "Medium"),
            SeverityLevel::High => write!(f, "High"),
            SeverityLevel::Critical => write!(f, "Critical"),
        }
    }
}

const ERROR_WEIGHT: f64 = 0.35;
const LATENCY_WEIGHT: f64 = 0.30;
const DOWNSTREAM_WEIGHT: f64 = 0.20;
const CPU_WEIGHT: f64 = 0.10;
const IMPACT_WEIGHT: f64 = 0.05;

/// Latency above this ceiling saturates its severity term.
pub const LATENCY_CEILING_MS: f64 = 5000.0;

/// Score how serious the root service's own anomalous state is, on a
/// [0, 1] scale.
///
/// The downstream-failure term is a raw count at full weight while
/// every other term is normalized first: counts above ~5 dominate the
/// score. Existing alerting thresholds are tuned against this.
pub fn severity_score(telemetry: &ServiceTelemetry, impact_score: f64) -> f64 {
    let norm_error = telemetry.error_rate.min(1.0);
    let norm_latency = (telemetry.latency / LATENCY_CEILING_MS).min(1.0);
    let norm_cpu = (telemetry.cpu_usage / 100.0).min(1.0);

    let mut score = norm_error * ERROR_WEIGHT
        + norm_latency * LATENCY_WEIGHT
        + f64::from(telemetry.downstream_failures) * DOWNSTREAM_WEIGHT
        + norm_cpu * CPU_WEIGHT
        + impact_score * IMPACT_WEIGHT;

    // Saturation boosts for hot CPUs.
    if telemetry.cpu_usage > 75.0 && telemetry.error_rate > 0.15 {
        score += 0.05;
    }
    if telemetry.cpu_usage > 85.0 {
        score += 0.10;
    }

    score.min(1.0)
}

/// Map a severity score to its label. Boundary values fall to the
/// lower band.
pub fn classify(score: f64) -> SeverityLevel {
    if score > 0.75 {
        SeverityLevel::Critical
    } else if score > 0.50 {
        SeverityLevel::High
    } else if score > 0.25 {
        SeverityLevel::Medium
    } else {
        SeverityLevel::Low
    }
}
