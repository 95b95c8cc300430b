// Controller input: event model, stick conditioning and the source seam
//
// Sources turn whatever device is attached into InputEvents. StickState
// folds those events into the two conditioned axes the mixer needs.

mod gamepad;
mod keyboard;

pub use gamepad::GamepadInput;
pub use keyboard::KeyboardInput;

/// Error types for input sources
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Gamepad backend unavailable: {0}")]
    Backend(String),

    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
}

/// The two stick axes the robot drives from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Right stick horizontal, positive = right
    Yaw,
    /// Left stick vertical, positive = forward
    Throttle,
}

/// Buttons the runtime reacts to, named after a DualShock layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Select,
    Home,
    DUp,
    DDown,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Connected,
    Disconnected,
    /// Raw axis position in [-1, 1]
    Axis(Axis, f32),
    Pressed(Button),
}

/// Anything that yields controller events without blocking
pub trait InputSource {
    /// Drain all events that arrived since the last call
    fn poll(&mut self) -> Result<Vec<InputEvent>, InputError>;
}

impl<I: InputSource + ?Sized> InputSource for Box<I> {
    fn poll(&mut self) -> Result<Vec<InputEvent>, InputError> {
        (**self).poll()
    }
}

/// Apply a dead zone around centre and a hot zone at each end
///
/// |value| <= dead_zone gives 0, |value| >= 1 - hot_zone gives ±1, and the
/// band between is stretched linearly onto (0, 1) keeping the sign.
pub fn condition(value: f32, dead_zone: f32, hot_zone: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    let magnitude = value.abs().min(1.0);
    let low = dead_zone.clamp(0.0, 1.0);
    let high = (1.0 - hot_zone.clamp(0.0, 1.0)).max(low);

    let scaled = if magnitude <= low {
        0.0
    } else if magnitude >= high {
        1.0
    } else {
        (magnitude - low) / (high - low)
    };
    scaled.copysign(value)
}

/// Latest conditioned stick positions and connection state
#[derive(Debug, Clone)]
pub struct StickState {
    dead_zone: f32,
    hot_zone: f32,
    yaw: f32,
    throttle: f32,
    connected: bool,
}

impl StickState {
    pub fn new(dead_zone: f32, hot_zone: f32) -> Self {
        Self {
            dead_zone,
            hot_zone,
            yaw: 0.0,
            throttle: 0.0,
            connected: false,
        }
    }

    /// Fold one event into the state, returning any button press
    pub fn apply(&mut self, event: InputEvent) -> Option<Button> {
        match event {
            InputEvent::Connected => self.connected = true,
            InputEvent::Disconnected => {
                self.connected = false;
                self.yaw = 0.0;
                self.throttle = 0.0;
            }
            InputEvent::Axis(Axis::Yaw, value) => {
                self.yaw = condition(value, self.dead_zone, self.hot_zone);
            }
            InputEvent::Axis(Axis::Throttle, value) => {
                self.throttle = condition(value, self.dead_zone, self.hot_zone);
            }
            InputEvent::Pressed(button) => return Some(button),
        }
        None
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    pub fn connected(&self) -> bool {
        self.connected
    }
}
