//! Resolved configuration (defaults applied, durations parsed)

use crate::schema::RawConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default listen address
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default minutes after scheduled start before a scan counts as LATE
pub const DEFAULT_LATE_THRESHOLD_MINUTES: u64 = 15;

/// Default seconds between session clock ticks
pub const DEFAULT_CLOCK_INTERVAL_SECONDS: u64 = 60;

/// Resolved daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub attendance: AttendanceConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AttendanceConfig {
    /// Scans later than scheduled start + this are LATE
    pub late_threshold: Duration,

    /// Session clock tick interval
    pub clock_interval: Duration,

    /// Local wall-clock hour of the daily materializer run
    pub materializer_hour: u8,
}

impl Config {
    /// Convert a validated raw config, applying defaults
    pub fn from_raw(raw: RawConfig) -> Self {
        let bind_addr = raw
            .server
            .bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .expect("bind_addr validated before conversion");

        let data_dir = raw
            .storage
            .data_dir
            .unwrap_or_else(rollcall_util::data_dir_without_env);

        let late_threshold = Duration::from_secs(
            raw.attendance
                .late_threshold_minutes
                .unwrap_or(DEFAULT_LATE_THRESHOLD_MINUTES)
                * 60,
        );

        let clock_interval = Duration::from_secs(
            raw.attendance
                .clock_interval_seconds
                .unwrap_or(DEFAULT_CLOCK_INTERVAL_SECONDS),
        );

        Self {
            server: ServerConfig { bind_addr },
            storage: StorageConfig { data_dir },
            attendance: AttendanceConfig {
                late_threshold,
                clock_interval,
                materializer_hour: raw.attendance.materializer_hour.unwrap_or(0),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_raw(RawConfig {
            config_version: crate::CURRENT_CONFIG_VERSION,
            server: Default::default(),
            storage: Default::default(),
            attendance: Default::default(),
        })
    }
}
