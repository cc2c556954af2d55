//! Configuration validation

use crate::schema::RawConfig;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid bind address '{value}': {message}")]
    InvalidBindAddr { value: String, message: String },

    #[error("late_threshold_minutes must be greater than zero")]
    ZeroLateThreshold,

    #[error("clock_interval_seconds must be greater than zero")]
    ZeroClockInterval,

    #[error("materializer_hour must be between 0 and 23, got {0}")]
    MaterializerHourOutOfRange(u8),
}

/// Validate a raw configuration, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(addr) = &config.server.bind_addr {
        if let Err(e) = addr.parse::<std::net::SocketAddr>() {
            errors.push(ValidationError::InvalidBindAddr {
                value: addr.clone(),
                message: e.to_string(),
            });
        }
    }

    if config.attendance.late_threshold_minutes == Some(0) {
        errors.push(ValidationError::ZeroLateThreshold);
    }

    if config.attendance.clock_interval_seconds == Some(0) {
        errors.push(ValidationError::ZeroClockInterval);
    }

    if let Some(hour) = config.attendance.materializer_hour {
        if hour > 23 {
            errors.push(ValidationError::MaterializerHourOutOfRange(hour));
        }
    }

    errors
}
