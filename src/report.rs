//! Hand-off to whatever draws the dashboard. The pipeline only produces records;
//! a `ReportSink` decides what to do with them. `CsvReportWriter` writes one CSV
//! per chart so any plotting tool can pick them up.

use std::fs;
use std::path::{Path, PathBuf};

use csv::Writer;
use log::info;
use serde::Serialize;

use crate::error::{Result, SurveyError};
use crate::model::DirectionLabel;
use crate::pipeline::RouteReport;
use crate::resolver::SpeedTable;
use crate::stats::RouteSummary;

pub trait ReportSink {
    fn speed_table(&mut self, table: &SpeedTable) -> Result<()>;

    fn route_report(&mut self, report: &RouteReport) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct StepRow<'a> {
    direction: &'a DirectionLabel,
    x: f64,
    y: Option<f64>,
}

#[derive(Debug, Serialize)]
struct MapCenterRow<'a> {
    direction: &'a DirectionLabel,
    center_latitude: Option<f64>,
    center_longitude: Option<f64>,
    point_count: usize,
}

pub struct CsvReportWriter {
    output_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvReportWriter {
    pub fn new(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir).map_err(|source| SurveyError::Io {
            path: output_dir.to_path_buf(),
            source,
        })?;
        Ok(CsvReportWriter {
            output_dir: output_dir.to_path_buf(),
            written: Vec::new(),
        })
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_rows<T: Serialize>(
        &mut self,
        file_name: &str,
        rows: impl IntoIterator<Item = T>,
    ) -> Result<()> {
        let path = self.output_dir.join(file_name);
        let mut wtr = Writer::from_path(&path)?;
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush().map_err(|source| SurveyError::Io {
            path: path.clone(),
            source,
        })?;
        info!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

impl ReportSink for CsvReportWriter {
    fn speed_table(&mut self, table: &SpeedTable) -> Result<()> {
        self.write_rows("speed_table.csv", table.rows())
    }

    fn route_report(&mut self, report: &RouteReport) -> Result<()> {
        let stem = file_stem(report.route.sheet.as_str());

        self.write_rows(&format!("{}_speeds.csv", stem), &report.speeds)?;

        let steps = report.step_profiles.iter().flat_map(|(direction, points)| {
            points.iter().map(move |p| StepRow {
                direction,
                x: p.x,
                y: p.y,
            })
        });
        self.write_rows(&format!("{}_step_profile.csv", stem), steps)?;

        self.write_rows(&format!("{}_direction_stats.csv", stem), &report.direction_stats)?;

        let points = report.maps.iter().flat_map(|m| m.points.iter());
        self.write_rows(&format!("{}_map_points.csv", stem), points)?;

        let centers = report.maps.iter().map(|m| MapCenterRow {
            direction: &m.key.direction,
            center_latitude: m.center.map(|c| c.0),
            center_longitude: m.center.map(|c| c.1),
            point_count: m.points.len(),
        });
        self.write_rows(&format!("{}_map_centers.csv", stem), centers)
    }
}

/// Sheet names like "Grafik TJ-10.2" become "Grafik_TJ-10.2".
fn file_stem(sheet: &str) -> String {
    sheet
        .trim()
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

pub fn print_route_list(routes: &[RouteSummary]) {
    println!("\n🛣️  SURVEYED ROUTES");
    println!("==================");
    for route in routes {
        println!("  {}", route.label);
    }
    println!("Total: {} routes", routes.len());
}

pub fn print_route_summary(report: &RouteReport) {
    println!("\n📍 {}", report.route.label);
    println!("==============================");
    println!("Route type: {} directions", report.route_type);

    for stats in &report.direction_stats {
        println!("\n  Statistik untuk {}", stats.direction);
        println!("    Jumlah titik:        {}", stats.point_count);
        println!("    Kecepatan rata-rata: {:.1} km/jam", stats.mean_speed_kmph);
        println!("    Kecepatan maksimum:  {:.1} km/jam", stats.max_speed_kmph);
        println!("    Kecepatan minimum:   {:.1} km/jam", stats.min_speed_kmph);
        println!("    Waktu maksimum:      {:.1} menit", stats.max_elapsed_min);
        println!("    Jarak total:         {:.2} km", stats.total_distance_km);
        if let Some(avg) = stats.average_speed_kmph {
            println!("    Rata-rata kecepatan: {:.2} km/jam", avg);
        }
        if let (Some(start), Some(end)) = (stats.started_at, stats.finished_at) {
            println!("    Waktu: {} → {}", start, end);
        }
    }

    println!("\n  Step profile points:");
    for (direction, points) in &report.step_profiles {
        println!("    {}: {}", direction, points.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnrichedCheckpoint, RouteType, SheetId, StepProfilePoint};
    use crate::step_profile::StepProfiles;

    fn report() -> RouteReport {
        let direction = DirectionLabel::new("arah A");
        let mut step_profiles = StepProfiles::new();
        step_profiles.insert(
            direction.clone(),
            vec![
                StepProfilePoint { x: 0.0, y: Some(36.0) },
                StepProfilePoint { x: 10.0, y: Some(36.0) },
            ],
        );
        RouteReport {
            route: RouteSummary {
                sheet: SheetId::new("Grafik TJ-1"),
                label: "Grafik TJ-1 (Bekasi - Cawang)".to_string(),
            },
            route_type: RouteType::TwoDirection,
            speeds: vec![EnrichedCheckpoint {
                sheet: SheetId::new("Grafik TJ-1"),
                direction,
                sequence: 1,
                scaled_distance: 4.0,
                cumulative_distance: 4.0,
                elapsed_time: 10.0,
                elapsed_time_delta: None,
                speed: None,
            }],
            step_profiles,
            direction_stats: Vec::new(),
            maps: Vec::new(),
        }
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Grafik TJ-10.2"), "Grafik_TJ-10.2");
        assert_eq!(file_stem("a/b:c"), "a_b_c");
    }

    #[test]
    fn test_csv_writer_outputs() {
        let dir = std::env::temp_dir()
            .join(format!("traffic-survey-report-{}", std::process::id()));
        let mut writer = CsvReportWriter::new(&dir).unwrap();
        writer.route_report(&report()).unwrap();
        assert_eq!(writer.written().len(), 5);

        let steps = fs::read_to_string(dir.join("Grafik_TJ-1_step_profile.csv")).unwrap();
        assert_eq!(steps, "direction,x,y\narah A,0.0,36.0\narah A,10.0,36.0\n");

        let speeds = fs::read_to_string(dir.join("Grafik_TJ-1_speeds.csv")).unwrap();
        let mut lines = speeds.lines();
        let header = "sheet,direction,sequence,scaled_distance,cumulative_distance,\
                      elapsed_time,elapsed_time_delta,speed";
        assert_eq!(lines.next(), Some(header));
        assert_eq!(lines.next(), Some("Grafik TJ-1,arah A,1,4.0,4.0,10.0,,"));

        fs::remove_dir_all(dir).unwrap();
    }
}
