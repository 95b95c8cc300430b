// Tiny 4WD robot runtime: gamepad teleop, battery sensing and status display

pub mod battery;
pub mod config;
pub mod display;
pub mod drive;
pub mod input;
pub mod menu;
pub mod messages;
pub mod runtime;
pub mod telemetry;
