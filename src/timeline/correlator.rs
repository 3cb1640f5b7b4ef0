use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default front-facing service; anomalies there are user-visible by
/// definition.
pub const FRONT_SERVICE: &str = "frontend";

/// Metrics that indicate direct user impact regardless of service.
pub const USER_IMPACT_METRICS: [&str; 3] = ["error_rate", "http_5xx", "request_failures"];

/// A cascade must follow the first anomaly within this window.
pub const CASCADE_WINDOW_MINUTES: i64 = 10;

/// Category assigned to each anomalous event in the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    FirstAnomaly,
    UserImpact,
    CascadeFailure,
    Normal,
}

/// One row of the generated incident timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// Display time, `HH:MM`.
    pub time: String,
    #[serde(rename = "type")]
    pub kind: TimelineEventKind,
    pub service: String,
    pub event: String,
}

// Raw wire shape; any missing field fails deserialization and drops
// the event.
#[derive(Debug, Deserialize)]
struct RawEvent {
    timestamp: String,
    service: String,
    metric: String,
    value: f64,
    threshold: f64,
}

#[derive(Debug, Clone)]
struct Event {
    at: NaiveDateTime,
    service: String,
    metric: String,
    value: f64,
    threshold: f64,
}

impl Event {
    fn is_anomaly(&self) -> bool {
        self.value > self.threshold
    }
}

/// Stitches raw telemetry events into an ordered incident timeline.
#[derive(Debug, Clone)]
pub struct TimelineCorrelator {
    front_service: String,
    cascade_window: Duration,
    user_impact_metrics: BTreeSet<String>,
}

impl Default for TimelineCorrelator {
    fn default() -> Self {
        Self {
            front_service: FRONT_SERVICE.to_string(),
            cascade_window: Duration::minutes(CASCADE_WINDOW_MINUTES),
            user_impact_metrics: USER_IMPACT_METRICS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl TimelineCorrelator {
    pub fn new(
        front_service: impl Into<String>,
        cascade_window: Duration,
        user_impact_metrics: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            front_service: front_service.into(),
            cascade_window,
            user_impact_metrics: user_impact_metrics.into_iter().collect(),
        }
    }

    /// Build the timeline for a batch of raw events.
    ///
    /// Events missing a required field or carrying an unparsable
    /// timestamp are dropped, never surfaced as errors. Non-anomalous
    /// events are excluded from the output.
    pub fn generate_timeline(&self, events: &[serde_json::Value]) -> Vec<TimelineEntry> {
        // 1. Validate, then sort chronologically (stable).
        let mut valid: Vec<Event> = events.iter().filter_map(parse_event).collect();
        if valid.len() < events.len() {
            tracing::debug!(
                dropped = events.len() - valid.len(),
                "dropped malformed telemetry events"
            );
        }
        valid.sort_by_key(|e| e.at);

        // 2. The earliest anomaly anchors the cascade window.
        let first_anomaly = valid.iter().find(|e| e.is_anomaly()).cloned();

        // 3. Classify each anomalous event; the first matching rule
        //    wins.
        let mut timeline = Vec::new();
        let mut seen_first = false;
        for event in valid.iter().filter(|e| e.is_anomaly()) {
            let kind = if !seen_first {
                seen_first = true;
                TimelineEventKind::FirstAnomaly
            } else if self.is_user_impact(event) {
                TimelineEventKind::UserImpact
            } else if self.is_cascade(event, first_anomaly.as_ref()) {
                TimelineEventKind::CascadeFailure
            } else {
                TimelineEventKind::Normal
            };

            timeline.push(TimelineEntry {
                time: event.at.format("%H:%M").to_string(),
                kind,
                service: event.service.clone(),
                event: describe(event),
            });
        }
        timeline
    }

    fn is_user_impact(&self, event: &Event) -> bool {
        event.service.eq_ignore_ascii_case(&self.front_service)
            || self.user_impact_metrics.contains(&event.metric)
    }

    // Anomaly from a different service, strictly after the first
    // anomaly and within the window (inclusive at the boundary).
    fn is_cascade(&self, event: &Event, first_anomaly: Option<&Event>) -> bool {
        let Some(first) = first_anomaly else {
            return false;
        };
        if event.service == first.service {
            return false;
        }
        let delta = event.at - first.at;
        delta > Duration::zero() && delta <= self.cascade_window
    }
}

fn parse_event(value: &serde_json::Value) -> Option<Event> {
    let raw: RawEvent = serde_json::from_value(value.clone()).ok()?;
    let at: NaiveDateTime = raw.timestamp.parse().ok()?;
    Some(Event {
        at,
        service: raw.service,
        metric: raw.metric,
        value: raw.value,
        threshold: raw.threshold,
    })
}

// Format varies by metric family: latency carries a unit, rate-like
// metrics read as threshold breaches, everything else shows the raw
// value.
fn describe(event: &Event) -> String {
    match event.metric.as_str() {
        "latency" => format!("{} latency spiked to {}ms", event.service, event.value),
        "error_rate" | "retry_rate" | "http_5xx" | "request_failures" => {
            format!("{} {} increased beyond threshold", event.service, event.metric)
        }
        _ => format!(
            "{} {} exceeded threshold (value: {})",
            event.service, event.metric, event.value
        ),
    }
}
