// Gamepad input through gilrs (evdev on Linux)
//
// Binds to the first controller that shows up and ignores the rest. When the
// bound one goes away, any other controller still plugged in takes over, like
// picking up "any available joystick".

use gilrs::{Event, EventType, GamepadId, Gilrs};
use tracing::{debug, info};

use super::{Axis, Button, InputError, InputEvent, InputSource};

/// Stick axis the robot cares about, if any
fn map_axis(axis: gilrs::Axis) -> Option<Axis> {
    match axis {
        gilrs::Axis::RightStickX => Some(Axis::Yaw),
        gilrs::Axis::LeftStickY => Some(Axis::Throttle),
        _ => None,
    }
}

fn map_button(button: gilrs::Button) -> Option<Button> {
    match button {
        gilrs::Button::Select => Some(Button::Select),
        gilrs::Button::Mode => Some(Button::Home),
        gilrs::Button::DPadUp => Some(Button::DUp),
        gilrs::Button::DPadDown => Some(Button::DDown),
        gilrs::Button::East => Some(Button::Circle),
        _ => None,
    }
}

/// The parts of a gilrs event the binding looks at
#[derive(Debug, Clone, Copy, PartialEq)]
enum PadEvent {
    Connected,
    Disconnected,
    Axis(gilrs::Axis, f32),
    Pressed(gilrs::Button),
}

impl PadEvent {
    fn from_gilrs(event: EventType) -> Option<Self> {
        match event {
            EventType::Connected => Some(Self::Connected),
            EventType::Disconnected => Some(Self::Disconnected),
            EventType::AxisChanged(axis, value, _) => Some(Self::Axis(axis, value)),
            EventType::ButtonPressed(button, _) => Some(Self::Pressed(button)),
            _ => None,
        }
    }
}

/// Which controller is driving
#[derive(Debug)]
struct Binding<Id> {
    active: Option<Id>,
}

impl<Id: Copy + PartialEq> Binding<Id> {
    fn new(active: Option<Id>) -> Self {
        Self { active }
    }

    fn active(&self) -> Option<Id> {
        self.active
    }

    /// Translate one pad event; `available` lists the pads still connected
    fn translate(
        &mut self,
        id: Id,
        event: PadEvent,
        available: impl IntoIterator<Item = Id>,
    ) -> Vec<InputEvent> {
        match event {
            PadEvent::Connected if self.active.is_none() => {
                self.active = Some(id);
                vec![InputEvent::Connected]
            }
            PadEvent::Disconnected if self.active == Some(id) => {
                self.active = available.into_iter().find(|other| *other != id);
                match self.active {
                    Some(_) => vec![InputEvent::Disconnected, InputEvent::Connected],
                    None => vec![InputEvent::Disconnected],
                }
            }
            _ if self.active != Some(id) => Vec::new(),
            PadEvent::Axis(axis, value) => map_axis(axis)
                .map(|axis| InputEvent::Axis(axis, value))
                .into_iter()
                .collect(),
            PadEvent::Pressed(button) => {
                let mapped = map_button(button);
                if mapped.is_none() {
                    debug!("Ignoring button {:?}", button);
                }
                mapped.map(InputEvent::Pressed).into_iter().collect()
            }
            _ => Vec::new(),
        }
    }
}

pub struct GamepadInput {
    gilrs: Gilrs,
    binding: Binding<GamepadId>,
    pending: Vec<InputEvent>,
}

impl GamepadInput {
    pub fn new() -> Result<Self, InputError> {
        let gilrs = Gilrs::new().map_err(|e| InputError::Backend(e.to_string()))?;

        // Controllers already plugged in produce no Connected event
        let active = gilrs.gamepads().map(|(id, _)| id).next();
        let mut pending = Vec::new();
        if let Some(id) = active {
            info!("Controller found: {}", gilrs.gamepad(id).name());
            pending.push(InputEvent::Connected);
        }

        Ok(Self {
            gilrs,
            binding: Binding::new(active),
            pending,
        })
    }
}

impl InputSource for GamepadInput {
    fn poll(&mut self) -> Result<Vec<InputEvent>, InputError> {
        let mut events = std::mem::take(&mut self.pending);
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            let Some(event) = PadEvent::from_gilrs(event) else {
                continue;
            };
            let available: Vec<GamepadId> = match event {
                PadEvent::Disconnected => self.gilrs.gamepads().map(|(id, _)| id).collect(),
                _ => Vec::new(),
            };

            let before = self.binding.active();
            events.extend(self.binding.translate(id, event, available));
            if let Some(now_active) = self.binding.active().filter(|a| Some(*a) != before) {
                info!("Controller found: {}", self.gilrs.gamepad(now_active).name());
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_mapping() {
        assert_eq!(map_axis(gilrs::Axis::RightStickX), Some(Axis::Yaw));
        assert_eq!(map_axis(gilrs::Axis::LeftStickY), Some(Axis::Throttle));
        assert_eq!(map_axis(gilrs::Axis::LeftStickX), None);
        assert_eq!(map_axis(gilrs::Axis::RightStickY), None);
    }

    #[test]
    fn test_button_mapping() {
        assert_eq!(map_button(gilrs::Button::Select), Some(Button::Select));
        assert_eq!(map_button(gilrs::Button::Mode), Some(Button::Home));
        assert_eq!(map_button(gilrs::Button::DPadUp), Some(Button::DUp));
        assert_eq!(map_button(gilrs::Button::DPadDown), Some(Button::DDown));
        assert_eq!(map_button(gilrs::Button::East), Some(Button::Circle));
        assert_eq!(map_button(gilrs::Button::South), None);
    }

    #[test]
    fn test_first_pad_binds() {
        let mut binding = Binding::new(None);
        assert_eq!(
            binding.translate(1, PadEvent::Connected, []),
            vec![InputEvent::Connected]
        );
        assert_eq!(binding.active(), Some(1));

        // A second pad does not take over
        assert!(binding.translate(2, PadEvent::Connected, []).is_empty());
        assert_eq!(binding.active(), Some(1));
    }

    #[test]
    fn test_other_pads_are_ignored() {
        let mut binding = Binding::new(Some(1));
        let throttle = PadEvent::Axis(gilrs::Axis::LeftStickY, 0.5);

        assert!(binding.translate(2, throttle, []).is_empty());
        assert!(
            binding
                .translate(2, PadEvent::Pressed(gilrs::Button::Select), [])
                .is_empty()
        );
        assert!(binding.translate(2, PadEvent::Disconnected, [1]).is_empty());
        assert_eq!(binding.active(), Some(1));

        assert_eq!(
            binding.translate(1, throttle, []),
            vec![InputEvent::Axis(Axis::Throttle, 0.5)]
        );
        assert_eq!(
            binding.translate(1, PadEvent::Pressed(gilrs::Button::East), []),
            vec![InputEvent::Pressed(Button::Circle)]
        );
    }

    #[test]
    fn test_unmapped_inputs_are_dropped() {
        let mut binding = Binding::new(Some(1));
        assert!(
            binding
                .translate(1, PadEvent::Axis(gilrs::Axis::LeftStickX, 0.9), [])
                .is_empty()
        );
        assert!(
            binding
                .translate(1, PadEvent::Pressed(gilrs::Button::South), [])
                .is_empty()
        );
    }

    #[test]
    fn test_disconnect_hands_over_to_remaining_pad() {
        let mut binding = Binding::new(Some(1));
        assert_eq!(
            binding.translate(1, PadEvent::Disconnected, [1, 2]),
            vec![InputEvent::Disconnected, InputEvent::Connected]
        );
        assert_eq!(binding.active(), Some(2));

        // Pad 2 now drives
        assert_eq!(
            binding.translate(2, PadEvent::Axis(gilrs::Axis::RightStickX, -1.0), []),
            vec![InputEvent::Axis(Axis::Yaw, -1.0)]
        );
    }

    #[test]
    fn test_last_disconnect_unbinds() {
        let mut binding = Binding::new(Some(1));
        assert_eq!(
            binding.translate(1, PadEvent::Disconnected, []),
            vec![InputEvent::Disconnected]
        );
        assert_eq!(binding.active(), None);

        // The next pad to appear binds
        assert_eq!(
            binding.translate(3, PadEvent::Connected, []),
            vec![InputEvent::Connected]
        );
        assert_eq!(binding.active(), Some(3));
    }
}
