// Sabertooth 2x5/2x12 "simplified serial" motor driver
//
// Protocol: one byte per command, no framing and no response.
//   0          stop both motors
//   1..=127    motor 1, 1 = full reverse, 64 = stop, 127 = full forward
//   128..=255  motor 2, 128 = full reverse, 192 = stop, 255 = full forward

use std::io::Write;
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, info};

use super::driver::{MotorDriver, MotorError};
use crate::messages::MotorPower;

/// DIP-switch selectable rates are 2400, 9600, 19200 and 38400
pub const DEFAULT_BAUDRATE: u32 = 9600;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// Stop-everything command byte
pub const STOP_ALL: u8 = 0;

const MOTOR1_STOP: u8 = 64;
const MOTOR2_STOP: u8 = 192;
/// Steps either side of the stop byte
const HALF_RANGE: i32 = 63;

/// Which channel on the controller a chassis side is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Motor1,
    Motor2,
}

/// Encode a power percentage for one channel
pub fn encode(channel: Channel, percent: i8) -> u8 {
    let percent = (percent as i32).clamp(-100, 100);
    // Round half away from zero so ±100 lands on the end stops
    let offset = (percent * HALF_RANGE * 2 + percent.signum() * 100) / 200;
    let stop = match channel {
        Channel::Motor1 => MOTOR1_STOP,
        Channel::Motor2 => MOTOR2_STOP,
    };
    (stop as i32 + offset) as u8
}

/// Sabertooth controller on a serial port, left side on motor 1
pub struct SabertoothMotors {
    port: Box<dyn SerialPort>,
}

impl SabertoothMotors {
    /// Open the controller on the given serial port
    pub fn open(port_name: &str) -> Result<Self, MotorError> {
        Self::open_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    /// Open with custom baudrate
    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self, MotorError> {
        info!("Opening Sabertooth on {} at {} baud", port_name, baudrate);
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        Ok(Self { port })
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), MotorError> {
        debug!("Sabertooth write: {:?}", bytes);
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }
}

impl MotorDriver for SabertoothMotors {
    fn set_speeds(&mut self, power: MotorPower) -> Result<(), MotorError> {
        let bytes = [
            encode(Channel::Motor1, power.left),
            encode(Channel::Motor2, power.right),
        ];
        self.send(&bytes)
    }

    fn stop(&mut self) -> Result<(), MotorError> {
        self.send(&[STOP_ALL])
    }
}
