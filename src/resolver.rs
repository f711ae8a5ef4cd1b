//! Runs the scaler output through the interpolator for every sheet and every
//! direction, expanding AM/PM survey shifts where a route has them.

use std::collections::HashMap;

use log::{info, warn};
use rayon::prelude::*;

use crate::error::{Result, SurveyError};
use crate::grouping::group_in_order;
use crate::interpolator::enrich_checkpoints;
use crate::model::{
    DirectionLabel, EnrichedCheckpoint, Period, RawTrackPoint, RouteKey, RouteType,
    ScaledCheckpoint, SheetId,
};

/// Per-checkpoint speeds for every resolved sheet and direction, in sheet, direction,
/// period order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeedTable {
    rows: Vec<EnrichedCheckpoint>,
}

impl SpeedTable {
    pub fn new(rows: Vec<EnrichedCheckpoint>) -> Self {
        SpeedTable { rows }
    }

    pub fn rows(&self) -> &[EnrichedCheckpoint] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn for_sheet(&self, sheet: &SheetId) -> Vec<EnrichedCheckpoint> {
        self.rows.iter().filter(|r| &r.sheet == sheet).cloned().collect()
    }

    /// Resolved (sheet, direction) keys in table order.
    pub fn keys(&self) -> Vec<RouteKey> {
        group_in_order(self.rows.iter(), |r| RouteKey::new(r.sheet.clone(), r.direction.clone()))
            .into_iter()
            .map(|(key, _)| key)
            .collect()
    }
}

/// A route is surveyed in AM and PM shifts when any of its labels mention a period.
pub fn route_type<'a, I>(labels: I) -> RouteType
where
    I: IntoIterator<Item = &'a DirectionLabel>,
{
    if labels.into_iter().any(|label| label.mentions_period()) {
        RouteType::FourDirection
    } else {
        RouteType::TwoDirection
    }
}

/// Resolve speeds for every sheet in the scaled checkpoint table.
///
/// Direction/period combinations without raw tracking data are logged and left out.
/// Fails only when nothing at all could be resolved.
pub fn resolve_all(scaled: &[ScaledCheckpoint], track: &[RawTrackPoint]) -> Result<SpeedTable> {
    let mut track_by_key: HashMap<RouteKey, Vec<RawTrackPoint>> = HashMap::new();
    let mut labels_by_sheet: HashMap<SheetId, Vec<DirectionLabel>> = HashMap::new();
    for point in track {
        track_by_key.entry(point.key()).or_default().push(point.clone());
        let labels = labels_by_sheet.entry(point.sheet.clone()).or_default();
        if !labels.contains(&point.direction) {
            labels.push(point.direction.clone());
        }
    }

    let sheets = group_in_order(scaled.iter(), |c| c.sheet.clone());
    let per_sheet: Vec<Vec<EnrichedCheckpoint>> = sheets
        .par_iter()
        .map(|(sheet, checkpoints)| {
            let kind = route_type(labels_by_sheet.get(sheet).into_iter().flatten());
            resolve_sheet(sheet, checkpoints, kind, &track_by_key)
        })
        .collect();

    let rows: Vec<EnrichedCheckpoint> = per_sheet.into_iter().flatten().collect();
    if rows.is_empty() {
        return Err(SurveyError::NoCombinationsProcessed);
    }

    let table = SpeedTable::new(rows);
    info!(
        "Resolved {} checkpoints across {} sheet/direction combinations",
        table.len(),
        table.keys().len()
    );
    Ok(table)
}

fn resolve_sheet(
    sheet: &SheetId,
    checkpoints: &[&ScaledCheckpoint],
    kind: RouteType,
    track_by_key: &HashMap<RouteKey, Vec<RawTrackPoint>>,
) -> Vec<EnrichedCheckpoint> {
    let mut results = Vec::new();

    for (base, group) in group_in_order(checkpoints.iter().copied(), |c| c.direction.clone()) {
        let shared: Vec<ScaledCheckpoint> = group.into_iter().cloned().collect();
        let labels: Vec<DirectionLabel> = match kind {
            RouteType::FourDirection => Period::ALL.iter().map(|p| base.with_period(*p)).collect(),
            RouteType::TwoDirection => vec![base],
        };

        for label in labels {
            let key = RouteKey::new(sheet.clone(), label);
            let subset = match track_by_key.get(&key) {
                Some(subset) if !subset.is_empty() => subset,
                _ => {
                    warn!("No raw tracking data found for {}", key);
                    continue;
                }
            };
            if let Some(enriched) = enrich_checkpoints(&shared, subset, &key.direction) {
                results.extend(enriched);
            }
        }
    }

    results
}
