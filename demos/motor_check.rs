// Motor check: spin each side of the robot briefly at low power
//
// Usage: cargo run --example motor_check -- [port]
// Example: cargo run --example motor_check -- /dev/serial0
//
// Safety features:
// - Explicit confirmation before any motion
// - Low power, short pulses
// - Motors stopped between steps and on exit

use std::io::{self, Write};
use std::thread::sleep;
use std::time::Duration;

use tiny4wd_runtime::config::{DriveConfig, MOTOR_PORT};
use tiny4wd_runtime::drive::{DriveTrain, SabertoothMotors, mix};
use tiny4wd_runtime::messages::MotorPower;

const TEST_POWER: f32 = 25.0;

fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush().unwrap();
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
    input.trim().eq_ignore_ascii_case("y")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| MOTOR_PORT.to_string());

    println!("Tiny 4WD motor check (WITH MOTION)");
    println!("Serial port: {}", port);
    println!();

    if !confirm("Are the robot's wheels OFF THE GROUND?") {
        println!("Please put the robot on blocks so the wheels can spin freely.");
        return Ok(());
    }

    let motors = SabertoothMotors::open(&port)?;
    let mut drive = DriveTrain::new(motors, &DriveConfig::default());
    drive.stop()?;
    println!("Connected, motors stopped");
    println!();

    let pulse = Duration::from_millis(400);
    let pause = Duration::from_millis(600);

    let tests = [
        ("Left side forward", MotorPower::new(TEST_POWER as i32, 0)),
        ("Right side forward", MotorPower::new(0, TEST_POWER as i32)),
        ("Both forward", mix(0.0, 1.0, TEST_POWER)),
        ("Both backward", mix(0.0, -1.0, TEST_POWER)),
        ("Spin right", mix(1.0, 0.0, TEST_POWER)),
        ("Spin left", mix(-1.0, 0.0, TEST_POWER)),
    ];

    for (name, power) in tests {
        println!("  {}: left={} right={}", name, power.left, power.right);
        drive.set_speeds(power)?;
        sleep(pulse);
        drive.stop()?;
        sleep(pause);
    }

    println!();
    println!("Done. If a side spun the wrong way, flip invert_left/invert_right in the config.");
    Ok(())
}
