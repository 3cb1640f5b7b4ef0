//! Historical-incident similarity matching.

pub mod matcher;

pub use matcher::{
    find_similar, load_history, HistoricalIncident, IncidentFeatures, SimilarIncident,
    DEFAULT_TOP_N,
};
