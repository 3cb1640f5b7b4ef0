//! Incident timeline construction from raw telemetry events.

pub mod correlator;

pub use correlator::{TimelineCorrelator, TimelineEntry, TimelineEventKind};
