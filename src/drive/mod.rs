// Drive module for the Tiny 4WD skid-steer base
//
// Provides:
// - Arcade mixing (stick axes -> left/right power)
// - Motor driver seam plus console and Sabertooth serial drivers
// - DriveTrain wrapper that owns chassis wiring and stop-on-drop

mod driver;
pub mod mixer;
pub mod sabertooth;

pub use driver::{ConsoleMotors, DriveTrain, MotorDriver, MotorError};
pub use mixer::{MAX_POWER, mix};
pub use sabertooth::SabertoothMotors;

#[cfg(test)]
pub(crate) use driver::tests::{Call, RecordingMotors};
