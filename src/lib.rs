//! Travel-time survey processing for bus routes.
//!
//! Surveyed checkpoint distances are rescaled to the mapped route length, matched
//! against the GPS track for elapsed time and speed, and turned into per-direction
//! step profiles, statistics and speed-banded map layers.

pub mod cache;
pub mod config;
pub mod error;
pub mod grouping;
pub mod interpolator;
pub mod loader;
pub mod logger;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod scaler;
pub mod stats;
pub mod step_profile;

pub use cache::{CacheKey, CacheStore, MemoryCache, NoCache};
pub use config::DashboardConfig;
pub use error::{Result, SurveyError};
pub use model::{
    DirectionLabel, EnrichedCheckpoint, Period, RouteKey, RouteType, SheetId, StepProfilePoint,
};
pub use pipeline::{RouteReport, SelectionContext, SurveyDataset, SurveyPipeline, SurveySources};
pub use report::{CsvReportWriter, ReportSink};
pub use resolver::SpeedTable;
