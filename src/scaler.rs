//! Checkpoint distance scaling.
//!
//! Surveyed leg distances are imprecise; the mapping-service total for the route is
//! taken as ground truth and every leg is rescaled proportionally so that the legs
//! of one direction add up to it exactly.

use std::collections::HashMap;

use log::debug;

use crate::error::{Result, SurveyError};
use crate::grouping::group_in_order;
use crate::model::{CheckpointDistance, RouteGroundTruth, ScaledCheckpoint, SheetId};

/// Rescale the legs of a single (sheet, direction), already in sequence order.
///
/// A zero raw total scales every leg to zero instead of dividing by it.
pub fn scale_checkpoints(
    legs: &[CheckpointDistance],
    total_distance_km: f64,
) -> Vec<ScaledCheckpoint> {
    let raw_total: f64 = legs.iter().map(|leg| leg.raw_distance).sum();
    let mut cumulative = 0.0;

    legs.iter()
        .map(|leg| {
            let scaled_distance = if raw_total != 0.0 {
                leg.raw_distance * total_distance_km / raw_total
            } else {
                0.0
            };
            cumulative += scaled_distance;
            ScaledCheckpoint {
                sheet: leg.sheet.clone(),
                direction: leg.direction.clone(),
                sequence: leg.sequence,
                raw_distance: leg.raw_distance,
                scaled_distance,
                cumulative_distance: cumulative,
            }
        })
        .collect()
}

/// Scale every (sheet, direction) group of the checkpoint table.
///
/// Groups come out in order of first appearance, legs in sequence order.
pub fn scale_all(
    legs: &[CheckpointDistance],
    truths: &[RouteGroundTruth],
) -> Result<Vec<ScaledCheckpoint>> {
    let mut ground_truth: HashMap<&SheetId, f64> = HashMap::new();
    for truth in truths {
        ground_truth.entry(&truth.sheet).or_insert(truth.total_distance_km);
    }

    let mut scaled = Vec::with_capacity(legs.len());
    for (key, mut group) in group_in_order(legs.iter().cloned(), |leg| leg.key()) {
        let total = *ground_truth
            .get(&key.sheet)
            .ok_or_else(|| SurveyError::MissingGroundTruth(key.sheet.clone()))?;

        group.sort_by_key(|leg| leg.sequence);
        if let Some(pair) = group.windows(2).find(|w| w[0].sequence == w[1].sequence) {
            return Err(SurveyError::DuplicateSequence {
                sequence: pair[0].sequence,
                key,
            });
        }

        let raw_total: f64 = group.iter().map(|leg| leg.raw_distance).sum();
        debug!(
            "Scaling {}: {} legs, {:.3} km surveyed -> {:.3} km ground truth",
            key,
            group.len(),
            raw_total,
            total
        );
        scaled.extend(scale_checkpoints(&group, total));
    }

    Ok(scaled)
}
