//! Error types for the colony engine and the reporting layer.

use thiserror::Error;

/// Fatal conditions raised while building tours or updating pheromone.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColonyError {
    /// A next-city probability came out NaN or infinite.
    #[error("degenerate probability {value} for move {from} -> {candidate}")]
    DegenerateProbability {
        from: usize,
        candidate: usize,
        value: f64,
    },

    /// A traversed edge has a zero or non-finite distance, so its deposit is undefined.
    #[error("invalid distance {distance} on edge {from} -> {to}")]
    InvalidEdgeDistance {
        from: usize,
        to: usize,
        distance: f64,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors from writing or reading timing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed report line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error(transparent)]
    Colony(#[from] ColonyError),
}

pub type Result<T> = std::result::Result<T, ColonyError>;
