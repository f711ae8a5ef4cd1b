//! Elapsed-time lookup and per-leg speed derivation.

use log::warn;

use crate::model::{DirectionLabel, EnrichedCheckpoint, RawTrackPoint, ScaledCheckpoint};

/// Elapsed time (minutes) of the track sample closest in distance to `distance_km`.
///
/// `track` must be sorted by distance; on equal distance gaps the first sample wins.
/// The route start is always at time zero.
pub fn nearest_elapsed_time(track: &[RawTrackPoint], distance_km: f64) -> Option<f64> {
    if distance_km == 0.0 {
        return Some(0.0);
    }
    track
        .iter()
        .min_by(|a, b| {
            let da = (a.distance_km - distance_km).abs();
            let db = (b.distance_km - distance_km).abs();
            da.total_cmp(&db)
        })
        .map(|p| p.time_min)
}

/// Attach elapsed time, time delta and speed (km/h) to one scaled checkpoint
/// sequence, using the track of the exact direction (and period) given.
///
/// Returns `None` when the track is empty, so the caller can skip the combination.
pub fn enrich_checkpoints(
    checkpoints: &[ScaledCheckpoint],
    track: &[RawTrackPoint],
    direction: &DirectionLabel,
) -> Option<Vec<EnrichedCheckpoint>> {
    if track.is_empty() {
        if let Some(first) = checkpoints.first() {
            warn!("No raw tracking data for {} {}, skipping", first.sheet, direction);
        }
        return None;
    }

    let mut sorted = track.to_vec();
    sorted.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    let mut enriched = Vec::with_capacity(checkpoints.len());
    let mut previous_time: Option<f64> = None;

    for checkpoint in checkpoints {
        let elapsed_time = nearest_elapsed_time(&sorted, checkpoint.cumulative_distance)?;
        let elapsed_time_delta = previous_time.map(|prev| elapsed_time - prev);
        let speed = match elapsed_time_delta {
            Some(dt) if dt != 0.0 => Some(checkpoint.scaled_distance / dt * 60.0),
            _ => None,
        };

        enriched.push(EnrichedCheckpoint {
            sheet: checkpoint.sheet.clone(),
            direction: direction.clone(),
            sequence: checkpoint.sequence,
            scaled_distance: checkpoint.scaled_distance,
            cumulative_distance: checkpoint.cumulative_distance,
            elapsed_time,
            elapsed_time_delta,
            speed,
        });
        previous_time = Some(elapsed_time);
    }

    Some(enriched)
}
