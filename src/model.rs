//! Records shared by every stage of the travel-journey pipeline.
//!
//! Survey exports identify a route by its sheet name and a direction of travel
//! ("arah A" / "arah B"). Routes surveyed in two shifts carry period-qualified
//! labels such as "arah A - AM". Lookups always go through [`RouteKey`] rather than
//! concatenated strings.

use std::fmt;

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Marker for the forward ("A") side of a route.
pub const SIDE_A: &str = "arah A";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SheetId(pub String);

impl SheetId {
    pub fn new(name: impl Into<String>) -> Self {
        SheetId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Survey shift for routes that were driven twice a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    Am,
    Pm,
}

impl Period {
    pub const ALL: [Period; 2] = [Period::Am, Period::Pm];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Am => "AM",
            Period::Pm => "PM",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized direction label. Every constructor runs the same normalization, so
/// labels read from different files compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct DirectionLabel(String);

impl DirectionLabel {
    pub fn new(raw: &str) -> Self {
        DirectionLabel(normalize_label(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The label of this base direction during one survey shift, e.g. "arah A - PM".
    pub fn with_period(&self, period: Period) -> Self {
        DirectionLabel(format!("{} - {}", self.0, period))
    }

    pub fn mentions_period(&self) -> bool {
        Period::ALL.iter().any(|p| self.0.contains(p.as_str()))
    }

    pub fn is_side_a(&self) -> bool {
        self.0.contains(SIDE_A)
    }
}

impl From<DirectionLabel> for String {
    fn from(label: DirectionLabel) -> Self {
        label.0
    }
}

impl fmt::Display for DirectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collapse any whitespace run around a hyphen into `" - "` and trim.
fn normalize_label(raw: &str) -> String {
    lazy_static! {
        static ref HYPHEN: Regex = Regex::new(r"\s+-\s+").unwrap();
    }
    HYPHEN.replace_all(raw, " - ").trim().to_string()
}

/// Composite key for one direction (or direction/period) of one route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    pub sheet: SheetId,
    pub direction: DirectionLabel,
}

impl RouteKey {
    pub fn new(sheet: SheetId, direction: DirectionLabel) -> Self {
        RouteKey { sheet, direction }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.sheet, self.direction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteType {
    /// One survey run per direction.
    TwoDirection,
    /// AM and PM runs per direction.
    FourDirection,
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteType::TwoDirection => f.write_str("two"),
            RouteType::FourDirection => f.write_str("four"),
        }
    }
}

/// One GPS-derived sample along a surveyed route.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTrackPoint {
    pub sheet: SheetId,
    pub direction: DirectionLabel,
    pub distance_km: f64,
    pub time_min: f64,
    pub speed_kmph: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: Option<NaiveDateTime>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub ground_truth_km: Option<f64>,
}

impl RawTrackPoint {
    pub fn key(&self) -> RouteKey {
        RouteKey::new(self.sheet.clone(), self.direction.clone())
    }
}

/// One surveyed leg between consecutive checkpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointDistance {
    pub sheet: SheetId,
    pub direction: DirectionLabel,
    pub sequence: u32,
    pub raw_distance: f64,
}

impl CheckpointDistance {
    pub fn key(&self) -> RouteKey {
        RouteKey::new(self.sheet.clone(), self.direction.clone())
    }
}

/// Authoritative total route length from the mapping service.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGroundTruth {
    pub sheet: SheetId,
    pub total_distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledCheckpoint {
    pub sheet: SheetId,
    pub direction: DirectionLabel,
    pub sequence: u32,
    pub raw_distance: f64,
    pub scaled_distance: f64,
    pub cumulative_distance: f64,
}

/// A scaled checkpoint with the elapsed time looked up from the GPS track.
/// `direction` is the label the time lookup ran against, period included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedCheckpoint {
    pub sheet: SheetId,
    pub direction: DirectionLabel,
    pub sequence: u32,
    pub scaled_distance: f64,
    pub cumulative_distance: f64,
    pub elapsed_time: f64,
    pub elapsed_time_delta: Option<f64>,
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepProfilePoint {
    pub x: f64,
    pub y: Option<f64>,
}
