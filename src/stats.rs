//! Summaries computed straight from the raw GPS track: the route catalogue, per
//! direction statistics, and speed-banded map layers.

use chrono::NaiveDateTime;
use geo::{Centroid, MultiPoint, Point};
use serde::{Deserialize, Serialize};

use crate::grouping::group_in_order;
use crate::model::{DirectionLabel, RawTrackPoint, RouteKey, SheetId};

/// One selectable route with its display label, e.g. "Grafik TJ-1 (Bekasi - Cawang)".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub sheet: SheetId,
    pub label: String,
}

/// Routes in order of first appearance. Endpoints come from each sheet's first row.
pub fn route_catalogue(track: &[RawTrackPoint]) -> Vec<RouteSummary> {
    group_in_order(track.iter(), |p| p.sheet.clone())
        .into_iter()
        .map(|(sheet, points)| {
            let first = points[0];
            let label = match (&first.origin, &first.destination) {
                (Some(origin), Some(destination)) => {
                    format!("{} ({} - {})", sheet, origin, destination)
                }
                _ => sheet.to_string(),
            };
            RouteSummary { sheet, label }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionStats {
    pub sheet: SheetId,
    pub direction: DirectionLabel,
    pub point_count: usize,
    pub mean_speed_kmph: f64,
    pub max_speed_kmph: f64,
    pub min_speed_kmph: f64,
    pub started_at: Option<NaiveDateTime>,
    pub finished_at: Option<NaiveDateTime>,
    pub max_elapsed_min: f64,
    pub total_distance_km: f64,
    /// Mean distance over mean elapsed time, in km/h. Undefined for a zero mean time.
    pub average_speed_kmph: Option<f64>,
}

pub fn direction_stats(track: &[RawTrackPoint]) -> Vec<DirectionStats> {
    group_in_order(track.iter(), |p| p.key())
        .into_iter()
        .map(|(key, points)| summarize(key, &points))
        .collect()
}

fn summarize(key: RouteKey, points: &[&RawTrackPoint]) -> DirectionStats {
    let count = points.len() as f64;
    let speeds = points.iter().map(|p| p.speed_kmph);
    let mean_distance = points.iter().map(|p| p.distance_km).sum::<f64>() / count;
    let mean_time = points.iter().map(|p| p.time_min).sum::<f64>() / count;

    DirectionStats {
        point_count: points.len(),
        mean_speed_kmph: speeds.clone().sum::<f64>() / count,
        max_speed_kmph: speeds.clone().fold(f64::NEG_INFINITY, f64::max),
        min_speed_kmph: speeds.fold(f64::INFINITY, f64::min),
        started_at: points.iter().filter_map(|p| p.timestamp).min(),
        finished_at: points.iter().filter_map(|p| p.timestamp).max(),
        max_elapsed_min: points.iter().map(|p| p.time_min).fold(f64::NEG_INFINITY, f64::max),
        total_distance_km: points.iter().map(|p| p.distance_km).fold(f64::NEG_INFINITY, f64::max),
        average_speed_kmph: if mean_time != 0.0 {
            Some(mean_distance / mean_time * 60.0)
        } else {
            None
        },
        sheet: key.sheet,
        direction: key.direction,
    }
}

/// A colour band on the speed map. Bounds are inclusive; `max_kmph: None` is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedBand {
    pub label: String,
    pub min_kmph: f64,
    pub max_kmph: Option<f64>,
    pub color: String,
}

impl SpeedBand {
    pub fn contains(&self, speed_kmph: f64) -> bool {
        speed_kmph >= self.min_kmph && self.max_kmph.map_or(true, |max| speed_kmph <= max)
    }
}

pub fn default_speed_bands() -> Vec<SpeedBand> {
    let band = |label: &str, min_kmph: f64, max_kmph: Option<f64>, color: &str| SpeedBand {
        label: label.to_string(),
        min_kmph,
        max_kmph,
        color: color.to_string(),
    };
    vec![
        band("0-20 km/jam", 0.0, Some(20.0), "#2F2F2F"),
        band("21-40 km/jam", 21.0, Some(40.0), "red"),
        band("41-60 km/jam", 41.0, Some(60.0), "orange"),
        band("61+ km/jam", 61.0, None, "blue"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandedPoint {
    pub sheet: SheetId,
    pub direction: DirectionLabel,
    pub band: String,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmph: f64,
    pub timestamp: Option<NaiveDateTime>,
}

/// Map layer for one direction: where to center the view and the coloured points.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionMap {
    pub key: RouteKey,
    /// (latitude, longitude)
    pub center: Option<(f64, f64)>,
    pub points: Vec<BandedPoint>,
}

/// Assign every track point to the first band containing its speed. Points whose
/// speed falls between bands are left off the map.
pub fn map_layers(track: &[RawTrackPoint], bands: &[SpeedBand]) -> Vec<DirectionMap> {
    group_in_order(track.iter(), |p| p.key())
        .into_iter()
        .map(|(key, points)| {
            let center = MultiPoint::new(
                points
                    .iter()
                    .map(|p| Point::new(p.longitude, p.latitude))
                    .collect::<Vec<_>>(),
            )
            .centroid()
            .map(|c| (c.y(), c.x()));

            let banded = points
                .iter()
                .filter_map(|p| {
                    let band = bands.iter().find(|b| b.contains(p.speed_kmph))?;
                    Some(BandedPoint {
                        sheet: p.sheet.clone(),
                        direction: p.direction.clone(),
                        band: band.label.clone(),
                        latitude: p.latitude,
                        longitude: p.longitude,
                        speed_kmph: p.speed_kmph,
                        timestamp: p.timestamp,
                    })
                })
                .collect();

            DirectionMap { key, center, points: banded }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(
        sheet: &str,
        direction: &str,
        distance_km: f64,
        time_min: f64,
        speed_kmph: f64,
    ) -> RawTrackPoint {
        RawTrackPoint {
            sheet: SheetId::new(sheet),
            direction: DirectionLabel::new(direction),
            distance_km,
            time_min,
            speed_kmph,
            latitude: -6.0 - distance_km / 10.0,
            longitude: 106.0 + distance_km / 10.0,
            timestamp: None,
            origin: Some("Bekasi".to_string()),
            destination: Some("Cawang".to_string()),
            ground_truth_km: None,
        }
    }

    #[test]
    fn test_route_catalogue_labels() {
        let mut track = vec![
            point("TJ-1", "arah A", 0.0, 0.0, 0.0),
            point("TJ-2", "arah A", 0.0, 0.0, 0.0),
        ];
        track[1].destination = None;
        let routes = route_catalogue(&track);
        assert_eq!(routes[0].label, "TJ-1 (Bekasi - Cawang)");
        assert_eq!(routes[1].label, "TJ-2");
    }

    #[test]
    fn test_direction_stats() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut track = vec![
            point("TJ-1", "arah A", 0.0, 0.0, 10.0),
            point("TJ-1", "arah A", 2.0, 4.0, 30.0),
            point("TJ-1", "arah A", 4.0, 8.0, 20.0),
            point("TJ-1", "arah B", 0.0, 0.0, 0.0),
        ];
        track[0].timestamp = day.and_hms_opt(7, 0, 0);
        track[2].timestamp = day.and_hms_opt(7, 8, 0);

        let stats = direction_stats(&track);
        assert_eq!(stats.len(), 2);
        let a = &stats[0];
        assert_eq!(a.point_count, 3);
        assert_eq!(a.mean_speed_kmph, 20.0);
        assert_eq!(a.max_speed_kmph, 30.0);
        assert_eq!(a.min_speed_kmph, 10.0);
        assert_eq!(a.max_elapsed_min, 8.0);
        assert_eq!(a.total_distance_km, 4.0);
        assert_eq!(a.average_speed_kmph, Some(30.0));
        assert_eq!(a.started_at, day.and_hms_opt(7, 0, 0));
        assert_eq!(a.finished_at, day.and_hms_opt(7, 8, 0));
        assert_eq!(stats[1].average_speed_kmph, None);
    }

    #[test]
    fn test_speed_bands() {
        let bands = default_speed_bands();
        let label_for = |speed: f64| {
            bands
                .iter()
                .find(|b| b.contains(speed))
                .map(|b| b.label.as_str())
        };
        assert_eq!(label_for(0.0), Some("0-20 km/jam"));
        assert_eq!(label_for(20.0), Some("0-20 km/jam"));
        assert_eq!(label_for(20.5), None);
        assert_eq!(label_for(41.0), Some("41-60 km/jam"));
        assert_eq!(label_for(140.0), Some("61+ km/jam"));
    }

    #[test]
    fn test_map_layers_center_and_bands() {
        let track = vec![
            point("TJ-1", "arah A", 0.0, 0.0, 15.0),
            point("TJ-1", "arah A", 2.0, 4.0, 70.0),
            point("TJ-1", "arah A", 4.0, 8.0, 20.5),
        ];
        let layers = map_layers(&track, &default_speed_bands());
        assert_eq!(layers.len(), 1);

        let (lat, lon) = layers[0].center.unwrap();
        assert!((lat - -6.2).abs() < 1e-9);
        assert!((lon - 106.2).abs() < 1e-9);

        let bands: Vec<&str> = layers[0].points.iter().map(|p| p.band.as_str()).collect();
        assert_eq!(bands, vec!["0-20 km/jam", "61+ km/jam"]);
    }
}
