use polars::error::PolarsError;
use std::io::Error as IoError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] IoError),

    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid feature config: {0}")]
    InvalidConfig(String),

    #[error("Duplicate {table} rows for keys: {}", .keys.join(", "))]
    DuplicateRows { table: &'static str, keys: Vec<String> },

    #[error("Overlapping tenures for players: {}", .0.join(", "))]
    OverlappingTenures(Vec<String>),

    #[error("More than one tenure covers player fixtures: {}", .0.join(", "))]
    AmbiguousTenure(Vec<String>),

    #[error("No tenure covers player fixtures: {}", .0.join(", "))]
    UnattributedEvents(Vec<String>),

    #[error("Fixture table is empty")]
    NoFixtures,
}
