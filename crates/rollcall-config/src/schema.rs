//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// HTTP server settings
    #[serde(default)]
    pub server: RawServerConfig,

    /// Persistence settings
    #[serde(default)]
    pub storage: RawStorageConfig,

    /// Attendance policy settings
    #[serde(default)]
    pub attendance: RawAttendanceConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServerConfig {
    /// Listen address (default: 127.0.0.1:8080)
    pub bind_addr: Option<String>,
}

/// Persistence settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawStorageConfig {
    /// Data directory for the store (default: XDG data dir)
    pub data_dir: Option<PathBuf>,
}

/// Attendance policy settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawAttendanceConfig {
    /// Minutes after scheduled start before a scan counts as LATE
    /// (default: 15, must be > 0)
    pub late_threshold_minutes: Option<u64>,

    /// Seconds between session clock ticks (default: 60, must be > 0)
    pub clock_interval_seconds: Option<u64>,

    /// Local wall-clock hour at which the daily materializer runs
    /// (default: 0, i.e. midnight; must be 0..=23)
    pub materializer_hour: Option<u8>,
}
