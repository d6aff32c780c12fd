pub const ADC_REFERENCE_VOLTS: f64 = 3.3;
pub const ADC_FULL_SCALE: f64 = 4095.0;
pub const SENSOR_MPA_PER_VOLT: f64 = 0.4;
pub const FEET_WATER_PER_MPA: f64 = 334.55;
pub const LOW_WATER_DEPTH_FEET: f64 = 80.0;

pub const DEFAULT_CABLE_LENGTH_FEET: f64 = 79.0;
pub const DEFAULT_WELL_DEPTH_FEET: f64 = 110.0;
pub const DEFAULT_SENSOR_OFFSET_VOLTS: f64 = 0.5;
pub const DEFAULT_DIVIDER_FACTOR: f64 = 1.5;

pub const INITIAL_FIRMWARE_VERSION: &str = "0.0.0";
pub const INITIAL_LAST_UPDATE: &str = "Never";

pub const FIRMWARE_FILE_NAME: &str = "firmware.bin";
pub const FIRMWARE_CONTENT_DISPOSITION: &str = "attachment; filename=\"firmware.bin\"";
pub const FIRMWARE_FIELD_NAME: &str = "firmware";
pub const DASHBOARD_INDEX_FILE: &str = "index.html";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_UPLOADS_DIR: &str = "./uploads";
pub const DEFAULT_PUBLIC_DIR: &str = "./public";
pub const DEFAULT_MAX_FIRMWARE_BYTES: u64 = 4 * 1024 * 1024;
