use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::config::Config;
use crate::constants::{
    DEFAULT_CABLE_LENGTH_FEET, DEFAULT_DIVIDER_FACTOR, DEFAULT_SENSOR_OFFSET_VOLTS,
    DEFAULT_WELL_DEPTH_FEET, INITIAL_FIRMWARE_VERSION, INITIAL_LAST_UPDATE,
};
use crate::firmware::FirmwareStore;
use crate::store::{ReadingStore, SettingsStore};
use crate::utils::parse_number;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub settings: Arc<SettingsStore>,
    pub readings: Arc<ReadingStore>,
    pub firmware: Arc<FirmwareStore>,
}

impl AppState {
    pub fn new(cfg: Arc<Config>) -> Self {
        let firmware = FirmwareStore::new(cfg.uploads_dir.clone());
        Self {
            cfg,
            settings: Arc::new(SettingsStore::default()),
            readings: Arc::new(ReadingStore::default()),
            firmware: Arc::new(firmware),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationSettings {
    pub cable_length: f64,
    pub well_depth: f64,
    pub sensor_offset: f64,
    pub divider_factor: f64,
    pub use_server_calc: bool,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            cable_length: DEFAULT_CABLE_LENGTH_FEET,
            well_depth: DEFAULT_WELL_DEPTH_FEET,
            sensor_offset: DEFAULT_SENSOR_OFFSET_VOLTS,
            divider_factor: DEFAULT_DIVIDER_FACTOR,
            use_server_calc: true,
        }
    }
}

/// One push from the well sensor.
///
/// `rawADC` is kept as the JSON number the device sent so passthrough echoes
/// it unchanged. Anything beyond `rawADC` and `fwVer` is kept in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    #[serde(rename = "rawADC", default, skip_serializing_if = "Option::is_none")]
    pub raw_adc: Option<Number>,
    #[serde(rename = "fwVer", default, skip_serializing_if = "Option::is_none")]
    pub fw_ver: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawSample {
    pub fn adc_value(&self) -> Option<f64> {
        self.raw_adc.as_ref().and_then(Number::as_f64)
    }
}

/// Output of the calibration chain for a single raw sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    #[serde(skip)]
    pub pin_volt: f64,
    pub act_volt: f64,
    #[serde(skip)]
    pub valid_volt: f64,
    #[serde(rename = "pressMPa")]
    pub press_mpa: f64,
    pub water_col: f64,
    pub depth_to_water: f64,
    pub water_below: f64,
    pub total_water_height: f64,
}

impl Conversion {
    pub const FIELD_NAMES: [&'static str; 6] = [
        "actVolt",
        "pressMPa",
        "waterCol",
        "depthToWater",
        "waterBelow",
        "totalWaterHeight",
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReadingStatus {
    Waiting,
    Normal,
    Low,
}

/// The latest reading as served to the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reading {
    #[serde(flatten)]
    pub sample: RawSample,
    #[serde(flatten)]
    pub conversion: Option<Conversion>,
    #[serde(rename = "calibratedWith", skip_serializing_if = "Option::is_none")]
    pub calibrated_with: Option<Arc<CalibrationSettings>>,
    pub status: ReadingStatus,
    #[serde(rename = "lastUpdate")]
    pub last_update: String,
}

impl Reading {
    pub const SERVER_KEYS: [&'static str; 3] = ["calibratedWith", "status", "lastUpdate"];

    pub fn initial() -> Self {
        let mut extra = Map::new();
        extra.insert("depthToWater".to_string(), Value::from(0));
        Self {
            sample: RawSample {
                raw_adc: Some(Number::from(0)),
                fw_ver: Some(INITIAL_FIRMWARE_VERSION.to_string()),
                extra,
            },
            conversion: None,
            calibrated_with: None,
            status: ReadingStatus::Waiting,
            last_update: INITIAL_LAST_UPDATE.to_string(),
        }
    }

    /// Server-computed depth when available, otherwise the device's
    /// `depthToWater` if it is a number or numeric string.
    pub fn depth_to_water(&self) -> Option<f64> {
        match &self.conversion {
            Some(conversion) => Some(conversion.depth_to_water),
            None => parse_number(self.sample.extra.get("depthToWater")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_sample_keeps_unknown_device_fields() {
        let sample: RawSample = serde_json::from_value(json!({
            "rawADC": 1234,
            "fwVer": "1.2.0",
            "rssi": -61
        }))
        .unwrap();

        assert_eq!(sample.adc_value(), Some(1234.0));
        assert_eq!(sample.fw_ver.as_deref(), Some("1.2.0"));
        assert_eq!(sample.extra.get("rssi"), Some(&json!(-61)));
    }

    #[test]
    fn raw_sample_treats_zero_as_present() {
        let sample: RawSample = serde_json::from_value(json!({ "rawADC": 0 })).unwrap();
        assert_eq!(sample.adc_value(), Some(0.0));

        let sample: RawSample = serde_json::from_value(json!({ "rawADC": null })).unwrap();
        assert_eq!(sample.raw_adc, None);
    }

    #[test]
    fn raw_sample_rejects_non_numeric_adc() {
        assert!(serde_json::from_value::<RawSample>(json!({ "rawADC": "abc" })).is_err());
        assert!(serde_json::from_value::<RawSample>(json!({ "rawADC": true })).is_err());
        assert!(serde_json::from_value::<RawSample>(json!({ "rawADC": { "v": 1 } })).is_err());
    }

    #[test]
    fn raw_sample_accepts_fractional_adc_and_echoes_it() {
        let sample: RawSample =
            serde_json::from_value(json!({ "rawADC": 1000.5, "fwVer": "1.1.0" })).unwrap();
        assert_eq!(sample.adc_value(), Some(1000.5));
        assert_eq!(serde_json::to_value(&sample).unwrap()["rawADC"], json!(1000.5));

        let sample: RawSample = serde_json::from_value(json!({ "rawADC": 2048.0 })).unwrap();
        assert_eq!(sample.adc_value(), Some(2048.0));
    }

    #[test]
    fn initial_reading_matches_waiting_shape() {
        let value = serde_json::to_value(Reading::initial()).unwrap();
        assert_eq!(
            value,
            json!({
                "rawADC": 0,
                "depthToWater": 0,
                "status": "WAITING",
                "fwVer": "0.0.0",
                "lastUpdate": "Never"
            })
        );
    }

    #[test]
    fn settings_serialize_in_camel_case() {
        let value = serde_json::to_value(CalibrationSettings::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "cableLength": 79.0,
                "wellDepth": 110.0,
                "sensorOffset": 0.5,
                "dividerFactor": 1.5,
                "useServerCalc": true
            })
        );
    }
}
