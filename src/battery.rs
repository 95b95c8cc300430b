// Battery voltage sensing through an ADC channel behind a resistor divider
//
// volts = raw / full_scale * vref * divider_ratio

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::BatteryConfig;
use crate::display::TextDisplay;
use crate::messages::BatteryReading;

/// Error types for ADC drivers
#[derive(Debug, thiserror::Error)]
pub enum AdcError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Unparseable sample {value:?} from {path}")]
    Parse { path: String, value: String },

    #[error("No ADC fitted")]
    NotFitted,
}

/// Single-ended analog-to-digital converter
pub trait Adc {
    fn read(&mut self, channel: u8) -> Result<u16, AdcError>;
}

impl<A: Adc + ?Sized> Adc for Box<A> {
    fn read(&mut self, channel: u8) -> Result<u16, AdcError> {
        (**self).read(channel)
    }
}

/// ADC exposed by a Linux industrial-I/O driver (ads1015, mcp3008, ...)
///
/// Reads `<dir>/in_voltage<channel>_raw`.
#[derive(Debug, Clone)]
pub struct IioAdc {
    dir: PathBuf,
}

impl IioAdc {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn channel_path(&self, channel: u8) -> PathBuf {
        self.dir.join(format!("in_voltage{}_raw", channel))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Adc for IioAdc {
    fn read(&mut self, channel: u8) -> Result<u16, AdcError> {
        let path = self.channel_path(channel);
        let text = std::fs::read_to_string(&path).map_err(|source| AdcError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let value = text.trim();
        // Differential-capable chips report small negative offsets near 0 V
        value
            .parse::<i32>()
            .map(|raw| raw.clamp(0, u16::MAX as i32) as u16)
            .map_err(|_| AdcError::Parse {
                path: path.display().to_string(),
                value: value.to_string(),
            })
    }
}

/// Placeholder for robots without battery sensing
#[derive(Debug, Default)]
pub struct NullAdc;

impl Adc for NullAdc {
    fn read(&mut self, _channel: u8) -> Result<u16, AdcError> {
        Err(AdcError::NotFitted)
    }
}

/// Scale a raw ADC count to the battery voltage ahead of the divider
pub fn raw_to_volts(raw: u16, config: &BatteryConfig) -> f32 {
    if config.full_scale == 0 {
        return 0.0;
    }
    raw as f32 / config.full_scale as f32 * config.vref * config.divider_ratio
}

/// Display line for a reading
pub fn format_reading(reading: &BatteryReading) -> String {
    format!("Batt: {:.2}V", reading.volts)
}

/// Polls the battery channel and remembers the last good sample
pub struct BatterySampler {
    config: BatteryConfig,
    last: Option<BatteryReading>,
    low: bool,
}

impl BatterySampler {
    pub fn new(config: BatteryConfig) -> Self {
        Self {
            config,
            last: None,
            low: false,
        }
    }

    /// Take one sample, mirroring it to the display if one is given
    ///
    /// A failed read is logged and skipped; the previous reading is kept.
    pub fn sample<A: Adc + ?Sized>(
        &mut self,
        adc: &mut A,
        display: Option<&mut dyn TextDisplay>,
    ) -> Option<BatteryReading> {
        let raw = match adc.read(self.config.channel) {
            Ok(raw) => raw,
            Err(AdcError::NotFitted) => return None,
            Err(e) => {
                warn!("Battery read failed, skipping: {}", e);
                return None;
            }
        };

        let reading = BatteryReading {
            raw,
            volts: raw_to_volts(raw, &self.config),
        };
        debug!("Battery raw={} volts={:.2}", reading.raw, reading.volts);

        let low = reading.volts < self.config.low_voltage;
        if low && !self.low {
            warn!(
                "Battery low: {:.2}V (threshold {:.2}V)",
                reading.volts, self.config.low_voltage
            );
        } else if !low && self.low {
            info!("Battery recovered: {:.2}V", reading.volts);
        }
        self.low = low;

        if let Some(display) = display {
            if let Err(e) = display.show(&format_reading(&reading), "") {
                debug!("Display unavailable for battery reading: {}", e);
            }
        }

        self.last = Some(reading);
        Some(reading)
    }

    pub fn last(&self) -> Option<BatteryReading> {
        self.last
    }

    pub fn is_low(&self) -> bool {
        self.low
    }

    pub fn config(&self) -> &BatteryConfig {
        &self.config
    }
}
