//! CSV loading for the travel-journey survey exports.
//!
//! Column names follow the English field names, with aliases for the
//! survey export headers (`arah`, `jarak_km`, `waktu_menit`, `gmap`, ...).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use csv::Reader;
use log::info;
use serde::Deserialize;

use crate::error::{Result, SurveyError};
use crate::model::{CheckpointDistance, DirectionLabel, RawTrackPoint, RouteGroundTruth, SheetId};

const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Debug, Deserialize)]
struct TrackRecord {
    sheet: String,
    #[serde(alias = "arah")]
    direction: String,
    #[serde(alias = "jarak_km")]
    distance_km: f64,
    #[serde(alias = "waktu_menit")]
    time_min: f64,
    #[serde(alias = "kmph")]
    speed_kmph: f64,
    #[serde(alias = "y")]
    latitude: f64,
    #[serde(alias = "x")]
    longitude: f64,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default, alias = "arah_awal")]
    origin: Option<String>,
    #[serde(default, alias = "arah_akhir")]
    destination: Option<String>,
    #[serde(default, alias = "gmap")]
    ground_truth_km: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CheckpointRecord {
    sheet: String,
    #[serde(alias = "arah")]
    direction: String,
    #[serde(alias = "seq")]
    sequence: u32,
    #[serde(alias = "jarak")]
    raw_distance: f64,
}

#[derive(Debug, Deserialize)]
struct GroundTruthRecord {
    sheet: String,
    #[serde(alias = "gmap")]
    total_distance_km: f64,
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|source| SurveyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Load the raw GPS track export.
pub fn load_track_points(path: &Path) -> Result<Vec<RawTrackPoint>> {
    let points = read_track_points(open(path)?)?;
    info!("Loaded {} track points from {}", points.len(), path.display());
    Ok(points)
}

pub fn read_track_points<R: Read>(reader: R) -> Result<Vec<RawTrackPoint>> {
    let mut rdr = Reader::from_reader(reader);
    let mut points = Vec::new();

    for result in rdr.deserialize::<TrackRecord>() {
        let record = result?;
        let sheet = SheetId::new(record.sheet.trim());
        let timestamp = match record.timestamp.as_deref() {
            Some(raw) => parse_timestamp(&sheet, raw)?,
            None => None,
        };
        points.push(RawTrackPoint {
            direction: DirectionLabel::new(&record.direction),
            sheet,
            distance_km: record.distance_km,
            time_min: record.time_min,
            speed_kmph: record.speed_kmph,
            latitude: record.latitude,
            longitude: record.longitude,
            timestamp,
            origin: non_empty(record.origin),
            destination: non_empty(record.destination),
            ground_truth_km: record.ground_truth_km,
        });
    }

    Ok(points)
}

/// Load the surveyed checkpoint legs.
pub fn load_checkpoints(path: &Path) -> Result<Vec<CheckpointDistance>> {
    let legs = read_checkpoints(open(path)?)?;
    info!("Loaded {} checkpoint legs from {}", legs.len(), path.display());
    Ok(legs)
}

pub fn read_checkpoints<R: Read>(reader: R) -> Result<Vec<CheckpointDistance>> {
    let mut rdr = Reader::from_reader(reader);
    let mut legs = Vec::new();

    for result in rdr.deserialize::<CheckpointRecord>() {
        let record = result?;
        legs.push(CheckpointDistance {
            sheet: SheetId::new(record.sheet.trim()),
            direction: DirectionLabel::new(&record.direction),
            sequence: record.sequence,
            raw_distance: record.raw_distance,
        });
    }

    Ok(legs)
}

/// Load a dedicated per-sheet ground-truth file.
pub fn load_ground_truth(path: &Path) -> Result<Vec<RouteGroundTruth>> {
    let truths = read_ground_truth(open(path)?)?;
    info!("Loaded ground truth for {} sheets from {}", truths.len(), path.display());
    Ok(truths)
}

pub fn read_ground_truth<R: Read>(reader: R) -> Result<Vec<RouteGroundTruth>> {
    let mut rdr = Reader::from_reader(reader);
    let mut truths = Vec::new();

    for result in rdr.deserialize::<GroundTruthRecord>() {
        let record = result?;
        truths.push(RouteGroundTruth {
            sheet: SheetId::new(record.sheet.trim()),
            total_distance_km: record.total_distance_km,
        });
    }

    Ok(truths)
}

/// Extract one ground-truth distance per sheet from the track export, which repeats
/// the mapping-service total on every row. The first value seen for a sheet wins.
pub fn ground_truth_from_track(points: &[RawTrackPoint]) -> Vec<RouteGroundTruth> {
    let mut truths: Vec<RouteGroundTruth> = Vec::new();

    for point in points {
        let Some(total) = point.ground_truth_km else {
            continue;
        };
        if truths.iter().any(|t| t.sheet == point.sheet) {
            continue;
        }
        truths.push(RouteGroundTruth {
            sheet: point.sheet.clone(),
            total_distance_km: total,
        });
    }

    truths
}

fn parse_timestamp(sheet: &SheetId, raw: &str) -> Result<Option<NaiveDateTime>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.naive_local()));
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(dt));
        }
    }
    Err(SurveyError::Timestamp {
        sheet: sheet.clone(),
        value: raw.to_string(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
