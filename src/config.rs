use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::constants::{
    DEFAULT_LISTEN_ADDR, DEFAULT_MAX_FIRMWARE_BYTES, DEFAULT_PUBLIC_DIR, DEFAULT_UPLOADS_DIR,
};

#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: String,
    pub uploads_dir: PathBuf,
    pub public_dir: PathBuf,
    pub max_firmware_bytes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let listen_addr = env_string("WELL_LISTEN_ADDR", DEFAULT_LISTEN_ADDR);
        let uploads_dir = PathBuf::from(env_string("WELL_UPLOADS_DIR", DEFAULT_UPLOADS_DIR));
        let public_dir = PathBuf::from(env_string("WELL_PUBLIC_DIR", DEFAULT_PUBLIC_DIR));
        let max_firmware_bytes = env_u64("WELL_MAX_FIRMWARE_BYTES", DEFAULT_MAX_FIRMWARE_BYTES)?;

        Ok(Self {
            listen_addr,
            uploads_dir,
            public_dir,
            max_firmware_bytes,
        })
    }

    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_firmware_bytes).unwrap_or(usize::MAX)
    }
}

fn env_string(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Failed to parse {}={} as u64", name, value)),
        Err(_) => Ok(default),
    }
}
