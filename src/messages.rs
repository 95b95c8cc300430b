// Message types shared by the runtime, telemetry and display mirror

use serde::{Deserialize, Serialize};

use crate::menu::Mode;

/// Left/right motor power in percent of full duty cycle, each in [-100, 100]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorPower {
    pub left: i8,
    pub right: i8,
}

impl MotorPower {
    pub const MAX: i8 = 100;

    /// Build a power pair, clamping each side into range
    pub fn new(left: i32, right: i32) -> Self {
        let max = Self::MAX as i32;
        Self {
            left: left.clamp(-max, max) as i8,
            right: right.clamp(-max, max) as i8,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0 && self.right == 0
    }
}

/// One battery sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryReading {
    pub raw: u16,
    pub volts: f32,
}

/// Health status published by the runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    NoController,
    Menu,
    Stopped,
}

/// Telemetry snapshot published once per control tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotStatus {
    pub power: MotorPower,
    pub mode: Option<Mode>,
    pub health: RuntimeHealth,
    pub battery: Option<BatteryReading>,
}

/// Two lines of display text, as mirrored over zenoh
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayText {
    pub line_one: String,
    pub line_two: String,
}
