use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tiny4wd_runtime::battery::{Adc, IioAdc, NullAdc};
use tiny4wd_runtime::config::{MOTOR_PORT, RobotConfig};
use tiny4wd_runtime::display::{LogDisplay, NullDisplay, TextDisplay, ZenohDisplay};
use tiny4wd_runtime::drive::{ConsoleMotors, DriveTrain, MotorDriver, SabertoothMotors};
use tiny4wd_runtime::input::{GamepadInput, InputSource, KeyboardInput};
use tiny4wd_runtime::runtime::{self, Robot, RuntimeError};
use tiny4wd_runtime::telemetry::{self, StatusPublisher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputKind {
    Gamepad,
    Keyboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MotorKind {
    /// Log motor commands instead of driving hardware
    Console,
    Sabertooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DisplayKind {
    None,
    Log,
    Zenoh,
}

/// Gamepad teleop runtime for the Tiny 4WD robot
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON robot config; missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = InputKind::Gamepad)]
    input: InputKind,

    #[arg(long, value_enum, default_value_t = MotorKind::Console)]
    motors: MotorKind,

    /// Serial port of the Sabertooth
    #[arg(long, default_value = MOTOR_PORT)]
    port: String,

    /// IIO device directory of the battery ADC, e.g. /sys/bus/iio/devices/iio:device0
    #[arg(long)]
    adc_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = DisplayKind::Log)]
    display: DisplayKind,

    /// Publish status over zenoh
    #[arg(long)]
    telemetry: bool,

    #[arg(short, long)]
    verbose: bool,
}

async fn start(args: Args) -> Result<(), RuntimeError> {
    let config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            RobotConfig::load(path)?
        }
        None => RobotConfig::default(),
    };

    let session = if args.telemetry || args.display == DisplayKind::Zenoh {
        Some(telemetry::open_session().await?)
    } else {
        None
    };

    let motors: Box<dyn MotorDriver> = match args.motors {
        MotorKind::Console => {
            info!("No motor controller selected, using console motors");
            Box::new(ConsoleMotors)
        }
        MotorKind::Sabertooth => Box::new(SabertoothMotors::open(&args.port)?),
    };

    let input: Box<dyn InputSource> = match args.input {
        InputKind::Gamepad => Box::new(GamepadInput::new()?),
        InputKind::Keyboard => Box::new(KeyboardInput::new()?),
    };

    let adc: Box<dyn Adc> = match &args.adc_dir {
        Some(dir) => {
            info!("Battery ADC at {}", dir.display());
            Box::new(IioAdc::new(dir))
        }
        None => Box::new(NullAdc),
    };

    let display: Box<dyn TextDisplay> = match (args.display, &session) {
        (DisplayKind::Zenoh, Some(session)) => Box::new(ZenohDisplay::new(session).await?),
        (DisplayKind::Log, _) => Box::new(LogDisplay),
        _ => Box::new(NullDisplay),
    };

    let status = match &session {
        Some(session) if args.telemetry => Some(StatusPublisher::new(session).await?),
        _ => None,
    };

    let drive = DriveTrain::new(motors, &config.drive);
    let mut robot = Robot::new(drive, input, adc, display, &config);

    info!("Waiting for controller, press SELECT to exit");
    runtime::run(&mut robot, status).await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Setup logging (RUST_LOG overrides, --verbose raises the default to debug)
    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse().unwrap()))
        .init();

    if let Err(e) = start(args).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
