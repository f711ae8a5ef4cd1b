//! Wires loading, scaling, resolving and the per-route summaries together.
//!
//! `SurveyDataset` holds everything derived from one set of input files.
//! `SurveyPipeline` builds it through an injected cache, and a `SelectionContext`
//! picks the route a `RouteReport` is assembled for.

use std::path::PathBuf;
use std::sync::Arc;

use log::info;

use crate::cache::{CacheKey, CacheStore};
use crate::config::DashboardConfig;
use crate::error::{Result, SurveyError};
use crate::loader;
use crate::model::{
    CheckpointDistance, EnrichedCheckpoint, RawTrackPoint, RouteGroundTruth, RouteType,
    ScaledCheckpoint, SheetId,
};
use crate::resolver::{resolve_all, route_type, SpeedTable};
use crate::scaler::scale_all;
use crate::stats::{
    direction_stats, map_layers, route_catalogue, DirectionMap, DirectionStats, RouteSummary,
    SpeedBand,
};
use crate::step_profile::{build_step_profiles, StepProfiles};

/// Input files of one survey.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveySources {
    pub track: PathBuf,
    pub checkpoints: PathBuf,
    pub ground_truth: Option<PathBuf>,
}

impl SurveySources {
    pub fn from_config(config: &DashboardConfig) -> Self {
        SurveySources {
            track: config.track_path(),
            checkpoints: config.checkpoint_path(),
            ground_truth: config.ground_truth_path(),
        }
    }

    fn cache_key(&self) -> Result<CacheKey> {
        let mut paths = vec![self.track.as_path(), self.checkpoints.as_path()];
        if let Some(ground_truth) = &self.ground_truth {
            paths.push(ground_truth.as_path());
        }
        CacheKey::for_sources(&paths)
    }
}

/// The route the user is looking at.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionContext {
    pub sheet: SheetId,
}

impl SelectionContext {
    pub fn new(sheet: SheetId) -> Self {
        SelectionContext { sheet }
    }
}

#[derive(Debug, Clone)]
pub struct SurveyDataset {
    pub track: Vec<RawTrackPoint>,
    pub scaled: Vec<ScaledCheckpoint>,
    pub speed_table: SpeedTable,
}

impl SurveyDataset {
    pub fn from_records(
        track: Vec<RawTrackPoint>,
        legs: &[CheckpointDistance],
        ground_truth: &[RouteGroundTruth],
    ) -> Result<Self> {
        let scaled = scale_all(legs, ground_truth)?;
        let speed_table = resolve_all(&scaled, &track)?;
        Ok(SurveyDataset {
            track,
            scaled,
            speed_table,
        })
    }

    pub fn load(sources: &SurveySources) -> Result<Self> {
        let track = loader::load_track_points(&sources.track)?;
        let legs = loader::load_checkpoints(&sources.checkpoints)?;
        let ground_truth = match &sources.ground_truth {
            Some(path) => loader::load_ground_truth(path)?,
            None => loader::ground_truth_from_track(&track),
        };
        Self::from_records(track, &legs, &ground_truth)
    }

    pub fn routes(&self) -> Vec<RouteSummary> {
        route_catalogue(&self.track)
    }

    pub fn route_report(
        &self,
        selection: &SelectionContext,
        bands: &[SpeedBand],
    ) -> Result<RouteReport> {
        let route = self
            .routes()
            .into_iter()
            .find(|r| r.sheet == selection.sheet)
            .ok_or_else(|| SurveyError::UnknownSheet(selection.sheet.clone()))?;

        let track: Vec<RawTrackPoint> = self
            .track
            .iter()
            .filter(|p| p.sheet == selection.sheet)
            .cloned()
            .collect();
        let speeds = self.speed_table.for_sheet(&selection.sheet);

        Ok(RouteReport {
            route_type: route_type(track.iter().map(|p| &p.direction)),
            step_profiles: build_step_profiles(&speeds),
            direction_stats: direction_stats(&track),
            maps: map_layers(&track, bands),
            speeds,
            route,
        })
    }
}

/// Everything the dashboard shows for one route.
#[derive(Debug, Clone)]
pub struct RouteReport {
    pub route: RouteSummary,
    pub route_type: RouteType,
    pub speeds: Vec<EnrichedCheckpoint>,
    pub step_profiles: StepProfiles,
    pub direction_stats: Vec<DirectionStats>,
    pub maps: Vec<DirectionMap>,
}

pub struct SurveyPipeline<C> {
    sources: SurveySources,
    cache: C,
}

impl<C: CacheStore<SurveyDataset>> SurveyPipeline<C> {
    pub fn new(sources: SurveySources, cache: C) -> Self {
        SurveyPipeline { sources, cache }
    }

    pub fn sources(&self) -> &SurveySources {
        &self.sources
    }

    /// The dataset for the current input files, rebuilt only when a file changed.
    pub fn dataset(&mut self) -> Result<Arc<SurveyDataset>> {
        let key = self.sources.cache_key()?;
        let sources = &self.sources;
        self.cache.get_or_compute(key, || {
            info!("Building survey dataset from {}", sources.track.display());
            SurveyDataset::load(sources)
        })
    }

    pub fn route_report(
        &mut self,
        selection: &SelectionContext,
        bands: &[SpeedBand],
    ) -> Result<RouteReport> {
        self.dataset()?.route_report(selection, bands)
    }
}
