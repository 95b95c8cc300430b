// Loop rates, topics, hardware defaults and the JSON robot config
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// Control loop frequency
pub const LOOP_HZ: u64 = 50;

// Battery poll period
pub const BATTERY_POLL: Duration = Duration::from_secs(5);

// Zenoh topics
pub const TOPIC_STATUS: &str = "tiny4wd/state/status"; // telemetry
pub const TOPIC_DISPLAY: &str = "tiny4wd/display"; // mirrored display text

// Serial port for the Sabertooth motor controller (Pi UART)
pub const MOTOR_PORT: &str = "/dev/serial0";

// Industrial-I/O directory of the battery ADC
pub const ADC_DIR: &str = "/sys/bus/iio/devices/iio:device0";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Stick handling and motor layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Upper bound handed to the mixer, in percent
    pub max_power: f32,
    pub dead_zone: f32,
    pub hot_zone: f32,
    pub invert_left: bool,
    /// The stock chassis mounts the right motor backwards
    pub invert_right: bool,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            max_power: 100.0,
            dead_zone: 0.1,
            hot_zone: 0.2,
            invert_left: false,
            invert_right: true,
        }
    }
}

/// Voltage divider and ADC reference for the battery sense line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub channel: u8,
    /// Raw count that corresponds to `vref`
    pub full_scale: u16,
    pub vref: f32,
    pub divider_ratio: f32,
    pub low_voltage: f32,
    #[serde(with = "duration_secs")]
    pub poll_interval: Duration,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            full_scale: u16::MAX,
            vref: 3.3,
            divider_ratio: 3.0,
            low_voltage: 6.4,
            poll_interval: BATTERY_POLL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// How long a "New Mode" banner stays up before the screen blanks
    #[serde(with = "duration_secs")]
    pub banner_timeout: Duration,
    /// How long the exit message lingers before the screen is cleared
    #[serde(with = "duration_secs")]
    pub exit_linger: Duration,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            banner_timeout: Duration::from_secs(1),
            exit_linger: Duration::from_secs(5),
        }
    }
}

/// Complete robot configuration, every field optional in the JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub drive: DriveConfig,
    pub battery: BatteryConfig,
    pub display: DisplayConfig,
}

impl RobotConfig {
    /// Load a config file, falling back to defaults for missing fields
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
