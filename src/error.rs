use std::path::PathBuf;

use thiserror::Error;

use crate::model::{RouteKey, SheetId};

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid timestamp {value:?} for sheet {sheet}")]
    Timestamp { sheet: SheetId, value: String },
    #[error("no ground-truth distance for sheet {0}")]
    MissingGroundTruth(SheetId),
    #[error("sequence {sequence} appears twice for {key}")]
    DuplicateSequence { key: RouteKey, sequence: u32 },
    #[error("no sheet/direction combination could be processed")]
    NoCombinationsProcessed,
    #[error("unknown sheet {0}")]
    UnknownSheet(SheetId),
    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SurveyError>;
