use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};
use crate::stats::{default_speed_bands, SpeedBand};

/// Where the survey exports live and how reports are produced. Every field has a
/// default, so a config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    /// Relative paths are resolved against `data_dir`.
    pub track_file: PathBuf,
    pub checkpoint_file: PathBuf,
    /// Without a dedicated file, ground truth is read from the track export.
    pub ground_truth_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub speed_bands: Vec<SpeedBand>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_dir: PathBuf::from("data"),
            track_file: PathBuf::from("survey_travel_journey.csv"),
            checkpoint_file: PathBuf::from("survey_travel_journey_jarak.csv"),
            ground_truth_file: None,
            output_dir: PathBuf::from("output"),
            speed_bands: default_speed_bands(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| SurveyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&raw).map_err(|source| SurveyError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// The config file if one is given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn track_path(&self) -> PathBuf {
        self.data_dir.join(&self.track_file)
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.data_dir.join(&self.checkpoint_file)
    }

    pub fn ground_truth_path(&self) -> Option<PathBuf> {
        self.ground_truth_file.as_ref().map(|file| self.data_dir.join(file))
    }
}
