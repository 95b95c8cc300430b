// 50 Hz control loop: controller -> mixer -> motors, plus a slow battery poll
//
// Safety rules:
// - losing the controller stops the motors, once per disconnect
// - every way out of run() goes through begin_shutdown(), which stops the motors

use std::time::{Duration, Instant};

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::battery::{Adc, BatterySampler};
use crate::config::{ConfigError, LOOP_HZ, RobotConfig};
use crate::display::{DisplayError, TextDisplay};
use crate::drive::{DriveTrain, MotorDriver, MotorError, mix};
use crate::input::{InputError, InputEvent, InputSource, StickState};
use crate::menu::{Menu, Screen};
use crate::messages::{BatteryReading, MotorPower, RobotStatus, RuntimeHealth};
use crate::telemetry::{StatusPublisher, TelemetryError};

/// Shortest battery poll period accepted from config
const MIN_BATTERY_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Motor(#[from] MotorError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Quit,
}

/// The robot and its injected hardware
pub struct Robot<M: MotorDriver, I: InputSource, A: Adc, D: TextDisplay> {
    drive: DriveTrain<M>,
    input: I,
    adc: A,
    display: D,
    sticks: StickState,
    menu: Menu,
    battery: BatterySampler,
    max_power: f32,
    exit_linger: Duration,
    health: RuntimeHealth,
    /// A failed read stood in for a disconnect the source never reported
    read_failed: bool,
    motor_failing: bool,
}

impl<M: MotorDriver, I: InputSource, A: Adc, D: TextDisplay> Robot<M, I, A, D> {
    pub fn new(drive: DriveTrain<M>, input: I, adc: A, display: D, config: &RobotConfig) -> Self {
        Self {
            drive,
            input,
            adc,
            display,
            sticks: StickState::new(config.drive.dead_zone, config.drive.hot_zone),
            menu: Menu::new(config.display.banner_timeout),
            battery: BatterySampler::new(config.battery.clone()),
            max_power: config.drive.max_power,
            exit_linger: config.display.exit_linger,
            health: RuntimeHealth::NoController, // until the first Connected event
            read_failed: false,
            motor_failing: false,
        }
    }

    fn set_health(&mut self, health: RuntimeHealth) {
        if health != self.health {
            match health {
                RuntimeHealth::NoController => warn!("No controller, motors held stopped"),
                _ => debug!("Health {:?} -> {:?}", self.health, health),
            }
            self.health = health;
        }
    }

    fn render(&mut self, screen: Screen) {
        let result = match screen {
            Screen::Show(one, two) => self.display.show(&one, &two),
            Screen::Clear => self.display.clear(),
        };
        if let Err(e) = result {
            debug!("Display write skipped: {}", e);
        }
    }

    /// Stop the motors, logging rather than propagating a driver failure
    fn stop_motors(&mut self) {
        if let Err(e) = self.drive.stop() {
            warn!("Failed to stop motors: {}", e);
        }
    }

    fn lose_controller(&mut self) {
        warn!("Controller disconnected, stopping motors");
        self.stop_motors();
        self.set_health(RuntimeHealth::NoController);
    }

    /// One pass of the control loop
    pub fn tick(&mut self, now: Instant) -> Tick {
        // 1. Drain controller events
        let events = match self.input.poll() {
            Ok(mut events) => {
                // Readable again and the source never said it went away
                if std::mem::take(&mut self.read_failed)
                    && !events.contains(&InputEvent::Disconnected)
                {
                    info!("Controller readable again");
                    events.insert(0, InputEvent::Connected);
                }
                events
            }
            // An unreadable controller counts as a lost one
            Err(e) if self.sticks.connected() => {
                warn!("Controller read failed: {}", e);
                self.read_failed = true;
                vec![InputEvent::Disconnected]
            }
            Err(e) => {
                debug!("Controller read failed: {}", e);
                Vec::new()
            }
        };

        for event in events {
            let was_connected = self.sticks.connected();
            let pressed = self.sticks.apply(event);

            match event {
                InputEvent::Connected if !was_connected => {
                    info!("Controller connected, press SELECT to exit, left stick for power, right to steer");
                }
                InputEvent::Disconnected if was_connected => self.lose_controller(),
                _ => {}
            }

            if let Some(button) = pressed {
                debug!("Pressed {:?}", button);
                let outcome = self.menu.press(button, now);
                if let Some(screen) = outcome.screen {
                    self.render(screen);
                }
                if outcome.quit {
                    return Tick::Quit;
                }
            }
        }

        // 2. Blank an expired mode banner
        if let Some(screen) = self.menu.tick(now) {
            self.render(screen);
        }

        if !self.sticks.connected() {
            self.set_health(RuntimeHealth::NoController);
            return Tick::Continue;
        }

        // 3. Mix and apply
        let power = mix(self.sticks.yaw(), self.sticks.throttle(), self.max_power);
        let driving = self.menu.active().is_some_and(|mode| mode.drives());

        self.set_health(match self.menu.active() {
            None => RuntimeHealth::Menu,
            Some(_) if driving => RuntimeHealth::Ok,
            Some(_) => RuntimeHealth::Stopped,
        });

        let target = if driving { power } else { MotorPower::zero() };
        if target == self.drive.applied() {
            return Tick::Continue;
        }

        let result = if target.is_zero() {
            self.drive.stop()
        } else {
            self.drive.set_speeds(target)
        };
        match result {
            Ok(()) if self.motor_failing => {
                info!("Motor commands accepted again");
                self.motor_failing = false;
            }
            Ok(()) => {}
            Err(e) => {
                if !self.motor_failing {
                    warn!("Motor command failed: {}", e);
                    self.motor_failing = true;
                }
                if let Err(e) = self.drive.stop() {
                    debug!("Stop after failed command also failed: {}", e);
                }
            }
        }

        Tick::Continue
    }

    /// Sample the battery, mirroring it to the display when nothing else is on it
    pub fn poll_battery(&mut self) -> Option<BatteryReading> {
        let display_idle = !self.menu.is_open() && !self.menu.banner_pending();
        let display: Option<&mut dyn TextDisplay> = if display_idle {
            Some(&mut self.display)
        } else {
            None
        };
        self.battery.sample(&mut self.adc, display)
    }

    /// Stop the motors and put up the exit message
    pub fn begin_shutdown(&mut self) {
        info!("Stopping motors");
        self.stop_motors();
        self.set_health(RuntimeHealth::Stopped);
        self.render(Screen::Show("exited to".to_string(), "command line".to_string()));
    }

    /// Clear the exit message
    pub fn finish_shutdown(&mut self) {
        self.render(Screen::Clear);
    }

    pub fn status(&self) -> RobotStatus {
        RobotStatus {
            power: self.drive.applied(),
            mode: self.menu.active(),
            health: self.health,
            battery: self.battery.last(),
        }
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }

    /// True while the motor driver is rejecting commands
    pub fn motor_failing(&self) -> bool {
        self.motor_failing
    }

    pub fn battery_interval(&self) -> Duration {
        self.battery.config().poll_interval.max(MIN_BATTERY_POLL)
    }

    pub fn exit_linger(&self) -> Duration {
        self.exit_linger
    }
}

/// Drive the robot until SELECT, Exit mode or Ctrl-C
pub async fn run<M, I, A, D>(
    robot: &mut Robot<M, I, A, D>,
    mut telemetry: Option<StatusPublisher>,
) -> Result<(), RuntimeError>
where
    M: MotorDriver,
    I: InputSource,
    A: Adc,
    D: TextDisplay,
{
    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut battery_tick = interval(robot.battery_interval());
    battery_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!(
        "Runtime started: {}Hz loop, battery every {:?}",
        LOOP_HZ,
        robot.battery_interval()
    );

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let outcome = robot.tick(Instant::now());
                if let Some(publisher) = telemetry.as_mut() {
                    publisher.publish(&robot.status()).await;
                }
                if outcome == Tick::Quit {
                    info!("Exit requested from controller");
                    break;
                }
            }
            _ = battery_tick.tick() => {
                robot.poll_battery();
            }
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    warn!("Ctrl-C handler failed: {}", e);
                }
                info!("Interrupted");
                break;
            }
        }
    }

    robot.begin_shutdown();
    if let Some(publisher) = telemetry.as_mut() {
        publisher.publish(&robot.status()).await;
    }
    tokio::time::sleep(robot.exit_linger()).await;
    robot.finish_shutdown();
    Ok(())
}
