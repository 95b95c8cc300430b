// Keyboard teleop for bench testing: W/S throttle, A/D turn, space centres
// H = HOME, Up/Down = D-pad, O/Enter = CIRCLE, Q/Esc/Ctrl-C = SELECT
//
// Raw mode swallows SIGINT, so Ctrl-C has to be handled here as a key.
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tracing::{info, warn};

use super::{Axis, Button, InputError, InputEvent, InputSource};

/// Sticks return to centre after this long with no movement key
const INPUT_TIMEOUT: Duration = Duration::from_millis(250);

/// Key-to-event translation, separate from the terminal so it can be tested
#[derive(Debug)]
struct KeyMap {
    yaw: f32,
    throttle: f32,
    last_movement: Instant,
}

impl KeyMap {
    fn new(now: Instant) -> Self {
        Self {
            yaw: 0.0,
            throttle: 0.0,
            last_movement: now,
        }
    }

    fn set(&mut self, axis: Axis, value: f32, now: Instant) -> InputEvent {
        match axis {
            Axis::Yaw => self.yaw = value,
            Axis::Throttle => self.throttle = value,
        }
        self.last_movement = now;
        InputEvent::Axis(axis, value)
    }

    fn key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) -> Vec<InputEvent> {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                vec![InputEvent::Pressed(Button::Select)]
            }
            KeyCode::Char('w') => vec![self.set(Axis::Throttle, 1.0, now)],
            KeyCode::Char('s') => vec![self.set(Axis::Throttle, -1.0, now)],
            KeyCode::Char('a') => vec![self.set(Axis::Yaw, -1.0, now)],
            KeyCode::Char('d') => vec![self.set(Axis::Yaw, 1.0, now)],
            KeyCode::Char(' ') => vec![
                self.set(Axis::Throttle, 0.0, now),
                self.set(Axis::Yaw, 0.0, now),
            ],
            KeyCode::Char('h') => vec![InputEvent::Pressed(Button::Home)],
            KeyCode::Up => vec![InputEvent::Pressed(Button::DUp)],
            KeyCode::Down => vec![InputEvent::Pressed(Button::DDown)],
            KeyCode::Char('o') | KeyCode::Enter => vec![InputEvent::Pressed(Button::Circle)],
            KeyCode::Char('q') | KeyCode::Esc => vec![InputEvent::Pressed(Button::Select)],
            _ => Vec::new(),
        }
    }

    /// Centre the sticks once the movement keys have gone quiet
    fn expire(&mut self, now: Instant) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if now.duration_since(self.last_movement) > INPUT_TIMEOUT {
            if self.throttle != 0.0 {
                self.throttle = 0.0;
                events.push(InputEvent::Axis(Axis::Throttle, 0.0));
            }
            if self.yaw != 0.0 {
                self.yaw = 0.0;
                events.push(InputEvent::Axis(Axis::Yaw, 0.0));
            }
        }
        events
    }
}

/// Terminal keyboard as a controller; always connected
pub struct KeyboardInput {
    keys: KeyMap,
    announced: bool,
}

impl KeyboardInput {
    /// Put the terminal in raw mode and start listening
    pub fn new() -> Result<Self, InputError> {
        enable_raw_mode()?;
        info!("Keyboard controls: WASD=drive, space=centre, H=menu, arrows=navigate, O=select, Q/Ctrl-C=quit");
        Ok(Self {
            keys: KeyMap::new(Instant::now()),
            announced: false,
        })
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self) -> Result<Vec<InputEvent>, InputError> {
        let mut events = Vec::new();
        if !self.announced {
            self.announced = true;
            events.push(InputEvent::Connected);
        }

        while event::poll(Duration::ZERO)? {
            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind == KeyEventKind::Press || kind == KeyEventKind::Repeat {
                    events.extend(self.keys.key(code, modifiers, Instant::now()));
                }
            }
        }

        events.extend(self.keys.expire(Instant::now()));
        Ok(events)
    }
}

impl Drop for KeyboardInput {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys() {
        let now = Instant::now();
        let mut keys = KeyMap::new(now);
        assert_eq!(
            keys.key(KeyCode::Char('w'), KeyModifiers::NONE, now),
            vec![InputEvent::Axis(Axis::Throttle, 1.0)]
        );
        assert_eq!(
            keys.key(KeyCode::Char('a'), KeyModifiers::NONE, now),
            vec![InputEvent::Axis(Axis::Yaw, -1.0)]
        );
        assert!(keys.key(KeyCode::Char('z'), KeyModifiers::NONE, now).is_empty());
    }

    #[test]
    fn test_button_keys() {
        let now = Instant::now();
        let mut keys = KeyMap::new(now);
        assert_eq!(
            keys.key(KeyCode::Esc, KeyModifiers::NONE, now),
            vec![InputEvent::Pressed(Button::Select)]
        );
        assert_eq!(
            keys.key(KeyCode::Enter, KeyModifiers::NONE, now),
            vec![InputEvent::Pressed(Button::Circle)]
        );
        assert_eq!(
            keys.key(KeyCode::Up, KeyModifiers::NONE, now),
            vec![InputEvent::Pressed(Button::DUp)]
        );
    }

    #[test]
    fn test_ctrl_c_quits() {
        let now = Instant::now();
        let mut keys = KeyMap::new(now);
        assert_eq!(
            keys.key(KeyCode::Char('c'), KeyModifiers::CONTROL, now),
            vec![InputEvent::Pressed(Button::Select)]
        );
        // A plain 'c' is not bound
        assert!(keys.key(KeyCode::Char('c'), KeyModifiers::NONE, now).is_empty());
    }

    #[test]
    fn test_sticks_recentre_after_timeout() {
        let start = Instant::now();
        let mut keys = KeyMap::new(start);
        keys.key(KeyCode::Char('w'), KeyModifiers::NONE, start);
        keys.key(KeyCode::Char('d'), KeyModifiers::NONE, start);

        // Still held
        assert!(keys.expire(start + Duration::from_millis(100)).is_empty());

        let events = keys.expire(start + Duration::from_millis(300));
        assert_eq!(
            events,
            vec![
                InputEvent::Axis(Axis::Throttle, 0.0),
                InputEvent::Axis(Axis::Yaw, 0.0)
            ]
        );

        // Centred sticks produce nothing further
        assert!(keys.expire(start + Duration::from_secs(1)).is_empty());
    }
}
