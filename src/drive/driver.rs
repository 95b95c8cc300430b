// Motor driver seam and the drive train that sits in front of it
//
// The runtime only ever talks to a DriveTrain, which applies the chassis
// wiring (inverted sides) and guarantees the motors end up stopped.

use tracing::{debug, info, warn};

use crate::config::DriveConfig;
use crate::messages::MotorPower;

/// Error types for motor drivers
#[derive(Debug, thiserror::Error)]
pub enum MotorError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Speed-setting primitives of a two-channel motor controller
pub trait MotorDriver {
    /// Drive both sides, values in percent of full duty cycle
    fn set_speeds(&mut self, power: MotorPower) -> Result<(), MotorError>;

    /// Bring both sides to rest
    fn stop(&mut self) -> Result<(), MotorError>;
}

impl<M: MotorDriver + ?Sized> MotorDriver for Box<M> {
    fn set_speeds(&mut self, power: MotorPower) -> Result<(), MotorError> {
        (**self).set_speeds(power)
    }

    fn stop(&mut self) -> Result<(), MotorError> {
        (**self).stop()
    }
}

/// Stand-in driver for machines without a motor controller: logs what it
/// would have sent
#[derive(Debug, Default)]
pub struct ConsoleMotors;

impl MotorDriver for ConsoleMotors {
    fn set_speeds(&mut self, power: MotorPower) -> Result<(), MotorError> {
        info!("Left: {}, Right: {}", power.left, power.right);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), MotorError> {
        info!("Motors stopping");
        Ok(())
    }
}

/// Chassis-level wrapper around a motor driver
pub struct DriveTrain<M: MotorDriver> {
    driver: M,
    invert_left: bool,
    invert_right: bool,
    applied: MotorPower,
}

impl<M: MotorDriver> DriveTrain<M> {
    pub fn new(driver: M, config: &DriveConfig) -> Self {
        Self {
            driver,
            invert_left: config.invert_left,
            invert_right: config.invert_right,
            applied: MotorPower::zero(),
        }
    }

    /// Send a power pair to the motors
    pub fn set_speeds(&mut self, power: MotorPower) -> Result<(), MotorError> {
        let wired = MotorPower {
            left: if self.invert_left { power.left.saturating_neg() } else { power.left },
            right: if self.invert_right { power.right.saturating_neg() } else { power.right },
        };
        debug!(
            "Setting motor power: left={}, right={} (wired {}, {})",
            power.left, power.right, wired.left, wired.right
        );
        self.driver.set_speeds(wired)?;
        self.applied = power;
        Ok(())
    }

    /// Stop both motors
    ///
    /// The recorded power is zeroed even if the driver fails, so the runtime
    /// never believes the motors are still commanded after a stop request.
    pub fn stop(&mut self) -> Result<(), MotorError> {
        self.applied = MotorPower::zero();
        self.driver.stop()
    }

    /// Last power pair handed to the motors, before inversion
    pub fn applied(&self) -> MotorPower {
        self.applied
    }

    pub fn driver(&self) -> &M {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut M {
        &mut self.driver
    }
}

impl<M: MotorDriver> Drop for DriveTrain<M> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop motors on drop: {}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum Call {
        Set(MotorPower),
        Stop,
    }

    /// Driver that records every call into a shared log
    #[derive(Clone, Default)]
    pub struct RecordingMotors {
        pub calls: Rc<RefCell<Vec<Call>>>,
        pub fail: bool,
    }

    impl RecordingMotors {
        pub fn stops(&self) -> usize {
            self.calls.borrow().iter().filter(|c| **c == Call::Stop).count()
        }

        pub fn last(&self) -> Option<Call> {
            self.calls.borrow().last().copied()
        }
    }

    impl MotorDriver for RecordingMotors {
        fn set_speeds(&mut self, power: MotorPower) -> Result<(), MotorError> {
            if self.fail {
                return Err(MotorError::Io(std::io::Error::other("unplugged")));
            }
            self.calls.borrow_mut().push(Call::Set(power));
            Ok(())
        }

        fn stop(&mut self) -> Result<(), MotorError> {
            self.calls.borrow_mut().push(Call::Stop);
            if self.fail {
                return Err(MotorError::Io(std::io::Error::other("unplugged")));
            }
            Ok(())
        }
    }

    fn straight_config() -> DriveConfig {
        DriveConfig {
            invert_right: false,
            ..DriveConfig::default()
        }
    }

    #[test]
    fn test_forwards_power() {
        let motors = RecordingMotors::default();
        let mut drive = DriveTrain::new(motors.clone(), &straight_config());
        drive.set_speeds(MotorPower::new(30, -20)).unwrap();
        assert_eq!(motors.last(), Some(Call::Set(MotorPower::new(30, -20))));
        assert_eq!(drive.applied(), MotorPower::new(30, -20));
    }

    #[test]
    fn test_inverts_configured_side() {
        let motors = RecordingMotors::default();
        let mut drive = DriveTrain::new(motors.clone(), &DriveConfig::default());
        drive.set_speeds(MotorPower::new(50, 50)).unwrap();
        // Default chassis has the right motor reversed
        assert_eq!(motors.last(), Some(Call::Set(MotorPower::new(50, -50))));
        // Reported power is what the runtime asked for
        assert_eq!(drive.applied(), MotorPower::new(50, 50));
    }

    #[test]
    fn test_stop_always_zeroes() {
        let motors = RecordingMotors::default();
        let mut drive = DriveTrain::new(motors.clone(), &straight_config());
        drive.set_speeds(MotorPower::new(100, 100)).unwrap();
        drive.stop().unwrap();
        assert_eq!(drive.applied(), MotorPower::zero());
        assert_eq!(motors.last(), Some(Call::Stop));

        // Stopping from rest is still a stop
        drive.stop().unwrap();
        assert_eq!(drive.applied(), MotorPower::zero());
    }

    #[test]
    fn test_stop_zeroes_even_when_driver_fails() {
        let motors = RecordingMotors::default();
        let mut drive = DriveTrain::new(motors.clone(), &straight_config());
        drive.set_speeds(MotorPower::new(70, 70)).unwrap();

        drive.driver.fail = true;
        assert!(drive.stop().is_err());
        assert_eq!(drive.applied(), MotorPower::zero());
    }

    #[test]
    fn test_drop_stops_motors() {
        let motors = RecordingMotors::default();
        {
            let mut drive = DriveTrain::new(motors.clone(), &straight_config());
            drive.set_speeds(MotorPower::new(10, 10)).unwrap();
        }
        assert_eq!(motors.last(), Some(Call::Stop));
    }
}
