use chrono::Local;
use serde_json::Value;

pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

/// Wall-clock time of day for display, e.g. `3:07:42 PM`.
pub fn local_time_string() -> String {
    Local::now().format("%-I:%M:%S %p").to_string()
}

/// Accepts a JSON number or a numeric string; anything else is `None`.
pub fn parse_number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}
