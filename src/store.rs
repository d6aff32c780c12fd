use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::calibration::build_reading;
use crate::error::AppError;
use crate::types::{CalibrationSettings, RawSample, Reading};
use crate::utils::{local_time_string, parse_number};

const REQUIRED_SETTINGS_FIELDS: [&str; 4] =
    ["cableLength", "wellDepth", "sensorOffset", "dividerFactor"];

/// Current calibration, replaced wholesale on every update.
pub struct SettingsStore {
    current: RwLock<Arc<CalibrationSettings>>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(CalibrationSettings::default())
    }
}

impl SettingsStore {
    pub fn new(initial: CalibrationSettings) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    pub async fn read(&self) -> Arc<CalibrationSettings> {
        self.current.read().await.clone()
    }

    /// Validates and installs a new calibration. Server-side calculation is
    /// always switched on by an update.
    pub async fn update(
        &self,
        body: &Map<String, Value>,
    ) -> Result<Arc<CalibrationSettings>, AppError> {
        let next = Arc::new(parse_settings(body)?);
        *self.current.write().await = next.clone();
        Ok(next)
    }
}

fn parse_settings(body: &Map<String, Value>) -> Result<CalibrationSettings, AppError> {
    let mut values = [0.0; 4];
    let mut invalid = Vec::new();
    for (slot, field) in values.iter_mut().zip(REQUIRED_SETTINGS_FIELDS) {
        match parse_number(body.get(field)) {
            Some(value) => *slot = value,
            None => invalid.push(field),
        }
    }
    if !invalid.is_empty() {
        return Err(AppError::Validation(format!(
            "Expected numeric values for: {}",
            invalid.join(", ")
        )));
    }

    let [cable_length, well_depth, sensor_offset, divider_factor] = values;
    Ok(CalibrationSettings {
        cable_length,
        well_depth,
        sensor_offset,
        divider_factor,
        use_server_calc: true,
    })
}

/// Single most-recent reading. Readers always get a whole snapshot.
pub struct ReadingStore {
    latest: RwLock<Arc<Reading>>,
}

impl Default for ReadingStore {
    fn default() -> Self {
        Self {
            latest: RwLock::new(Arc::new(Reading::initial())),
        }
    }
}

impl ReadingStore {
    pub async fn read(&self) -> Arc<Reading> {
        self.latest.read().await.clone()
    }

    /// Calibrates `sample` against the settings in force right now and
    /// overwrites the stored reading.
    pub async fn ingest(&self, settings: &SettingsStore, sample: RawSample) -> Arc<Reading> {
        let snapshot = settings.read().await;
        let reading = Arc::new(build_reading(sample, snapshot, local_time_string()));
        *self.latest.write().await = reading.clone();
        reading
    }
}
