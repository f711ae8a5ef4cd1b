//! Piecewise-constant speed-vs-distance curves for the step chart.
//!
//! Every direction of a sheet is drawn against the same distance axis, taken from
//! the "arah A" side, so the directions can be overlaid on one chart.

use std::collections::{BTreeMap, HashSet};

use log::warn;

use crate::grouping::group_in_order;
use crate::model::{DirectionLabel, EnrichedCheckpoint, StepProfilePoint};

pub type StepProfiles = BTreeMap<DirectionLabel, Vec<StepProfilePoint>>;

/// Build one step curve per direction from the speed table rows of a single sheet.
pub fn build_step_profiles(rows: &[EnrichedCheckpoint]) -> StepProfiles {
    let mut directions = group_in_order(rows.iter(), |r| r.direction.clone());
    for (_, group) in directions.iter_mut() {
        group.sort_by_key(|r| r.sequence);
    }

    let mut profiles = StepProfiles::new();
    let reference = directions
        .iter()
        .find(|(label, _)| label.is_side_a())
        .or_else(|| directions.first());
    let Some((_, reference)) = reference else {
        return profiles;
    };
    let x_points: Vec<f64> = reference.iter().map(|r| r.cumulative_distance).collect();

    for (label, group) in &directions {
        let speeds: Vec<Option<f64>> = group.iter().map(|r| r.speed).collect();
        let (points, dropped) = if label.is_side_a() {
            forward_steps(&speeds, &x_points)
        } else {
            reverse_steps(&speeds, &x_points)
        };
        if dropped > 0 {
            warn!(
                "{}: dropped {} transitions past the reference axis ({} checkpoints)",
                label,
                dropped,
                x_points.len()
            );
        }
        profiles.insert(label.clone(), dedup_points(points));
    }

    profiles
}

/// "A" side: each leg's speed is drawn up to the checkpoint that closes it.
///
/// Also returns how many transitions had no position on the reference axis.
fn forward_steps(speeds: &[Option<f64>], x_points: &[f64]) -> (Vec<StepProfilePoint>, usize) {
    let n = speeds.len();
    let mut points = Vec::new();
    let mut dropped = 0;

    if n > 1 {
        if let Some(first) = speeds[1] {
            points.push(StepProfilePoint { x: 0.0, y: Some(first) });
        }
    }

    for i in 1..n.saturating_sub(1) {
        if speeds[i + 1].is_none() {
            continue;
        }
        let Some(&x) = x_points.get(i) else {
            dropped += 1;
            continue;
        };
        points.push(StepProfilePoint { x, y: speeds[i] });
        points.push(StepProfilePoint { x, y: speeds[i + 1] });
    }

    if n > 0 {
        if let Some(&x) = x_points.last() {
            points.push(StepProfilePoint { x, y: speeds[n - 1] });
        }
    }

    (points, dropped)
}

/// "B" side: transitions are placed one checkpoint further along the shared axis,
/// and the curve is closed at the route end with the last level drawn.
fn reverse_steps(speeds: &[Option<f64>], x_points: &[f64]) -> (Vec<StepProfilePoint>, usize) {
    let n = speeds.len();
    let mut points = Vec::new();
    let mut dropped = 0;

    if let Some(Some(first)) = speeds.first() {
        points.push(StepProfilePoint { x: 0.0, y: Some(*first) });
    }

    for i in 0..n.saturating_sub(1) {
        if speeds[i + 1].is_none() {
            continue;
        }
        let Some(&x) = x_points.get(i + 1) else {
            dropped += 1;
            continue;
        };
        points.push(StepProfilePoint { x, y: speeds[i] });
        points.push(StepProfilePoint { x, y: speeds[i + 1] });
    }

    // Trailing speeds are often undefined, so hold the last drawn level to the end
    if let (Some(last), Some(&x)) = (points.last().copied(), x_points.last()) {
        points.push(StepProfilePoint { x, y: last.y });
    }

    (points, dropped)
}

fn dedup_points(points: Vec<StepProfilePoint>) -> Vec<StepProfilePoint> {
    let mut seen = HashSet::new();
    points
        .into_iter()
        .filter(|p| seen.insert((p.x.to_bits(), p.y.map(f64::to_bits))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SheetId;

    fn row(
        direction: &str,
        sequence: u32,
        cumulative_distance: f64,
        speed: Option<f64>,
    ) -> EnrichedCheckpoint {
        EnrichedCheckpoint {
            sheet: SheetId::new("R1"),
            direction: DirectionLabel::new(direction),
            sequence,
            scaled_distance: 0.0,
            cumulative_distance,
            elapsed_time: 0.0,
            elapsed_time_delta: None,
            speed,
        }
    }

    fn pt(x: f64, y: Option<f64>) -> StepProfilePoint {
        StepProfilePoint { x, y }
    }

    fn sample_sheet() -> Vec<EnrichedCheckpoint> {
        vec![
            row("arah B", 1, 3.0, None),
            row("arah B", 2, 6.0, Some(20.0)),
            row("arah B", 3, 9.0, None),
            row("arah A", 1, 2.0, None),
            row("arah A", 2, 5.0, Some(30.0)),
            row("arah A", 3, 9.0, Some(60.0)),
        ]
    }

    #[test]
    fn test_forward_steps() {
        let profiles = build_step_profiles(&sample_sheet());
        let a = &profiles[&DirectionLabel::new("arah A")];
        assert_eq!(
            a,
            &vec![
                pt(0.0, Some(30.0)),
                pt(5.0, Some(30.0)),
                pt(5.0, Some(60.0)),
                pt(9.0, Some(60.0)),
            ]
        );
    }

    #[test]
    fn test_reverse_steps_use_reference_axis_and_hold_last_level() {
        let profiles = build_step_profiles(&sample_sheet());
        let b = &profiles[&DirectionLabel::new("arah B")];
        // x positions come from arah A's checkpoints, not arah B's own
        assert_eq!(b, &vec![pt(5.0, None), pt(5.0, Some(20.0)), pt(9.0, Some(20.0))]);
        assert_eq!(b.last().unwrap().y, Some(20.0));
    }

    #[test]
    fn test_single_checkpoint_a_side() {
        let rows = vec![row("arah A", 1, 4.0, None), row("arah A", 2, 10.0, Some(36.0))];
        let profiles = build_step_profiles(&rows);
        assert_eq!(
            profiles[&DirectionLabel::new("arah A")],
            vec![pt(0.0, Some(36.0)), pt(10.0, Some(36.0))]
        );
    }

    #[test]
    fn test_duplicates_removed() {
        let rows = vec![
            row("arah A", 1, 2.0, None),
            row("arah A", 2, 5.0, Some(30.0)),
            row("arah A", 3, 9.0, Some(30.0)),
        ];
        let profiles = build_step_profiles(&rows);
        assert_eq!(
            profiles[&DirectionLabel::new("arah A")],
            vec![pt(0.0, Some(30.0)), pt(5.0, Some(30.0)), pt(9.0, Some(30.0))]
        );
    }

    #[test]
    fn test_deterministic() {
        let first = build_step_profiles(&sample_sheet());
        let second = build_step_profiles(&sample_sheet());
        assert_eq!(first, second);
    }

    #[test]
    fn test_reference_axis_prefers_side_a_over_order() {
        let rows = vec![
            row("arah B - AM", 1, 1.0, None),
            row("arah B - AM", 2, 2.0, Some(40.0)),
            row("arah A - AM", 1, 4.0, None),
            row("arah A - AM", 2, 8.0, Some(50.0)),
        ];
        let profiles = build_step_profiles(&rows);
        assert_eq!(
            profiles[&DirectionLabel::new("arah B - AM")],
            vec![pt(8.0, None), pt(8.0, Some(40.0))]
        );
    }

    #[test]
    fn test_reverse_without_any_speed_is_empty() {
        let rows = vec![row("arah B", 1, 1.0, None), row("arah B", 2, 2.0, None)];
        let profiles = build_step_profiles(&rows);
        assert!(profiles[&DirectionLabel::new("arah B")].is_empty());
    }

    #[test]
    fn test_longer_b_side_drops_transitions_past_reference_axis() {
        let rows = vec![
            row("arah A", 1, 2.0, None),
            row("arah A", 2, 5.0, Some(30.0)),
            row("arah B", 1, 1.0, Some(10.0)),
            row("arah B", 2, 2.0, Some(20.0)),
            row("arah B", 3, 3.0, Some(40.0)),
            row("arah B", 4, 4.0, None),
        ];
        let profiles = build_step_profiles(&rows);
        assert_eq!(
            profiles[&DirectionLabel::new("arah B")],
            vec![pt(0.0, Some(10.0)), pt(5.0, Some(10.0)), pt(5.0, Some(20.0))]
        );

        let speeds = [Some(10.0), Some(20.0), Some(40.0), None];
        let (_, dropped) = reverse_steps(&speeds, &[2.0, 5.0]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_forward_steps_count_dropped_transitions() {
        let speeds = [None, Some(10.0), Some(20.0), Some(30.0)];
        let (points, dropped) = forward_steps(&speeds, &[1.0, 2.0]);
        assert_eq!(dropped, 1);
        assert_eq!(
            points,
            vec![pt(0.0, Some(10.0)), pt(2.0, Some(10.0)), pt(2.0, Some(20.0)), pt(2.0, Some(30.0))]
        );

        let (_, dropped) = forward_steps(&speeds, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_rows_out_of_sequence_order() {
        let mut rows = sample_sheet();
        rows.reverse();
        assert_eq!(build_step_profiles(&rows), build_step_profiles(&sample_sheet()));
    }
}
