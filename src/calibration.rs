use std::sync::Arc;

use crate::constants::{
    ADC_FULL_SCALE, ADC_REFERENCE_VOLTS, FEET_WATER_PER_MPA, LOW_WATER_DEPTH_FEET,
    SENSOR_MPA_PER_VOLT,
};
use crate::types::{CalibrationSettings, Conversion, RawSample, Reading, ReadingStatus};

/// Converts a raw ADC count into the physical water-level figures.
///
/// Total over finite input; nothing is rounded here.
pub fn convert(raw_adc: f64, settings: &CalibrationSettings) -> Conversion {
    let pin_volt = raw_adc * (ADC_REFERENCE_VOLTS / ADC_FULL_SCALE);
    let act_volt = pin_volt * settings.divider_factor;
    let valid_volt = act_volt.max(settings.sensor_offset);
    let press_mpa = (valid_volt - settings.sensor_offset) * SENSOR_MPA_PER_VOLT;
    let water_col = press_mpa * FEET_WATER_PER_MPA;
    let depth_to_water = (settings.cable_length - water_col).max(0.0);
    let water_below = settings.well_depth - settings.cable_length;
    let total_water_height = water_below + water_col;

    Conversion {
        pin_volt,
        act_volt,
        valid_volt,
        press_mpa,
        water_col,
        depth_to_water,
        water_below,
        total_water_height,
    }
}

/// Returns the ADC value to convert, or `None` when the device's own
/// figures should be trusted.
pub fn server_calc_input(sample: &RawSample, settings: &CalibrationSettings) -> Option<f64> {
    if settings.use_server_calc {
        sample.adc_value()
    } else {
        None
    }
}

pub fn classify(depth_to_water: Option<f64>) -> ReadingStatus {
    match depth_to_water {
        Some(depth) if depth > LOW_WATER_DEPTH_FEET => ReadingStatus::Low,
        _ => ReadingStatus::Normal,
    }
}

/// Assembles the reading that replaces the stored one.
pub fn build_reading(
    mut sample: RawSample,
    settings: Arc<CalibrationSettings>,
    last_update: String,
) -> Reading {
    sample
        .extra
        .retain(|key, _| !Reading::SERVER_KEYS.contains(&key.as_str()));

    let (conversion, calibrated_with) = match server_calc_input(&sample, &settings) {
        Some(raw_adc) => {
            sample
                .extra
                .retain(|key, _| !Conversion::FIELD_NAMES.contains(&key.as_str()));
            (Some(convert(raw_adc, &settings)), Some(settings))
        }
        None => (None, None),
    };

    let mut reading = Reading {
        sample,
        conversion,
        calibrated_with,
        status: ReadingStatus::Normal,
        last_update,
    };
    reading.status = classify(reading.depth_to_water());
    reading
}
