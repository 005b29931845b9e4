//! Stage editing sessions.

use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vfxi_usd::{Stage, StageError, Value};

/// Stage metadata applied at the start of every session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageSettings {
    pub start_time_code: f64,
    pub end_time_code: f64,
    pub meters_per_unit: f64,
    pub up_axis: String,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            start_time_code: 1.0,
            end_time_code: 1.0,
            meters_per_unit: 1.0,
            up_axis: "Y".to_string(),
        }
    }
}

/// Errors loading settings files.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("upAxis must be \"Y\" or \"Z\", got {0:?}")]
    UpAxis(String),
}

impl StageSettings {
    /// Parse settings from JSON. Missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file<P: AsRef<FsPath>>(path: P) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        match self.up_axis.as_str() {
            "Y" | "Z" => Ok(()),
            other => Err(SettingsError::UpAxis(other.to_string())),
        }
    }

    /// Write the settings into the stage's layer metadata.
    pub fn apply(&self, stage: &mut Stage) {
        stage.set_start_time_code(self.start_time_code);
        stage.set_end_time_code(self.end_time_code);
        stage.set_metadata("metersPerUnit", self.meters_per_unit);
        stage.set_metadata("upAxis", Value::Token(self.up_axis.clone()));
    }
}

/// Open `path` (or create it when missing), apply `settings` and run `edit`.
///
/// The root layer is saved whether or not `edit` fails. An error from `edit`
/// takes precedence over a save error.
pub fn make_stage<P, T, E, F>(path: P, settings: &StageSettings, edit: F) -> Result<T, E>
where
    P: AsRef<FsPath>,
    F: FnOnce(&mut Stage) -> Result<T, E>,
    E: From<StageError>,
{
    let path = path.as_ref();
    let mut stage = if path.exists() {
        log::debug!("Opening existing stage {}", path.display());
        Stage::open(path)?
    } else {
        log::debug!("Creating stage {}", path.display());
        Stage::create_new(path)?
    };

    settings.apply(&mut stage);

    let result = edit(&mut stage);
    let saved = stage.save();

    match (result, saved) {
        (Err(e), Err(save_err)) => {
            log::error!("Failed to save {} after edit error: {save_err}", path.display());
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(_), Err(save_err)) => Err(save_err.into()),
        (Ok(value), Ok(())) => Ok(value),
    }
}
