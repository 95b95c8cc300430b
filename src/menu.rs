// Mode menu driven from the controller buttons
//
// HOME opens/closes the menu, D-pad moves the cursor, CIRCLE picks a mode.
// While the menu is open no mode is active, so the robot holds still.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::input::Button;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Manual,
    Line,
    Maze,
    Toxic,
    Zombie,
    Exit,
}

impl Mode {
    /// Menu order
    pub const ALL: [Mode; 6] = [
        Mode::Manual,
        Mode::Line,
        Mode::Maze,
        Mode::Toxic,
        Mode::Zombie,
        Mode::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Manual => "Manual",
            Mode::Line => "Line",
            Mode::Maze => "Maze",
            Mode::Toxic => "Toxic",
            Mode::Zombie => "Zombie",
            Mode::Exit => "Exit",
        }
    }

    /// Only manual mode drives from the sticks
    pub fn drives(&self) -> bool {
        matches!(self, Mode::Manual)
    }
}

/// What the display should do after a button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Show(String, String),
    Clear,
}

/// Result of feeding a button to the menu
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuOutcome {
    pub screen: Option<Screen>,
    pub quit: bool,
}

#[derive(Debug)]
pub struct Menu {
    /// Active mode; `None` while the menu is open
    active: Option<Mode>,
    /// Mode to restore if the menu is closed without picking
    saved: Mode,
    open: bool,
    cursor: usize,
    banner_timeout: Duration,
    banner_until: Option<Instant>,
}

impl Menu {
    pub fn new(banner_timeout: Duration) -> Self {
        Self {
            active: Some(Mode::Manual),
            saved: Mode::Manual,
            open: false,
            cursor: 0,
            banner_timeout,
            banner_until: None,
        }
    }

    pub fn active(&self) -> Option<Mode> {
        self.active
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn cursor(&self) -> Mode {
        Mode::ALL[self.cursor]
    }

    /// True while a "New Mode" banner is waiting to be blanked
    pub fn banner_pending(&self) -> bool {
        self.banner_until.is_some()
    }

    pub fn press(&mut self, button: Button, now: Instant) -> MenuOutcome {
        match button {
            Button::Select => MenuOutcome {
                screen: None,
                quit: true,
            },
            Button::Home if self.open => {
                self.open = false;
                self.active = Some(self.saved);
                info!("Menu exited, mode {}", self.saved.label());
                MenuOutcome {
                    screen: Some(Screen::Clear),
                    quit: false,
                }
            }
            Button::Home => {
                self.open = true;
                if let Some(mode) = self.active.take() {
                    self.saved = mode;
                }
                let text = format!("MODE: {}", self.saved.label());
                info!("Menu entered, {}", text);
                MenuOutcome {
                    screen: Some(Screen::Show(text, String::new())),
                    quit: false,
                }
            }
            Button::DUp | Button::DDown if self.open => {
                let len = Mode::ALL.len();
                self.cursor = if button == Button::DUp {
                    (self.cursor + len - 1) % len
                } else {
                    (self.cursor + 1) % len
                };
                let item = self.cursor().label();
                info!("{}  (press 'O' to select)", item);
                MenuOutcome {
                    screen: Some(Screen::Show(item.to_string(), "'O' to select".to_string())),
                    quit: false,
                }
            }
            Button::Circle if self.open => {
                let mode = self.cursor();
                self.open = false;
                self.active = Some(mode);
                self.saved = mode;
                self.banner_until = Some(now + self.banner_timeout);
                let text = format!("New Mode: {}", mode.label());
                info!("{}", text);
                MenuOutcome {
                    screen: Some(Screen::Show(text, String::new())),
                    quit: mode == Mode::Exit,
                }
            }
            _ => MenuOutcome::default(),
        }
    }

    /// Blank the mode banner once its timeout has passed
    pub fn tick(&mut self, now: Instant) -> Option<Screen> {
        match self.banner_until {
            Some(deadline) if now >= deadline => {
                self.banner_until = None;
                Some(Screen::Clear)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> (Menu, Instant) {
        (Menu::new(Duration::from_secs(1)), Instant::now())
    }

    #[test]
    fn test_starts_in_manual() {
        let (menu, _) = menu();
        assert_eq!(menu.active(), Some(Mode::Manual));
        assert!(!menu.is_open());
    }

    #[test]
    fn test_home_toggles_and_restores() {
        let (mut menu, now) = menu();

        let out = menu.press(Button::Home, now);
        assert!(menu.is_open());
        assert_eq!(menu.active(), None);
        assert_eq!(
            out.screen,
            Some(Screen::Show("MODE: Manual".to_string(), String::new()))
        );

        let out = menu.press(Button::Home, now);
        assert!(!menu.is_open());
        assert_eq!(menu.active(), Some(Mode::Manual));
        assert_eq!(out.screen, Some(Screen::Clear));
    }

    #[test]
    fn test_cursor_wraps() {
        let (mut menu, now) = menu();
        menu.press(Button::Home, now);

        let out = menu.press(Button::DUp, now);
        assert_eq!(menu.cursor(), Mode::Exit);
        assert_eq!(
            out.screen,
            Some(Screen::Show("Exit".to_string(), "'O' to select".to_string()))
        );

        menu.press(Button::DDown, now);
        assert_eq!(menu.cursor(), Mode::Manual);
        menu.press(Button::DDown, now);
        assert_eq!(menu.cursor(), Mode::Line);
    }

    #[test]
    fn test_navigation_ignored_when_closed() {
        let (mut menu, now) = menu();
        assert_eq!(menu.press(Button::DDown, now), MenuOutcome::default());
        assert_eq!(menu.press(Button::Circle, now), MenuOutcome::default());
        assert_eq!(menu.cursor(), Mode::Manual);
        assert_eq!(menu.active(), Some(Mode::Manual));
    }

    #[test]
    fn test_select_mode_and_banner_timeout() {
        let (mut menu, now) = menu();
        menu.press(Button::Home, now);
        menu.press(Button::DDown, now);
        menu.press(Button::DDown, now);

        let out = menu.press(Button::Circle, now);
        assert_eq!(menu.active(), Some(Mode::Maze));
        assert!(!menu.is_open());
        assert!(!out.quit);
        assert_eq!(
            out.screen,
            Some(Screen::Show("New Mode: Maze".to_string(), String::new()))
        );

        assert!(menu.banner_pending());
        assert_eq!(menu.tick(now + Duration::from_millis(500)), None);
        assert_eq!(menu.tick(now + Duration::from_secs(1)), Some(Screen::Clear));
        assert!(!menu.banner_pending());
        assert_eq!(menu.tick(now + Duration::from_secs(2)), None);
    }

    #[test]
    fn test_reopen_shows_selected_mode() {
        let (mut menu, now) = menu();
        menu.press(Button::Home, now);
        menu.press(Button::DDown, now);
        menu.press(Button::Circle, now);

        let out = menu.press(Button::Home, now);
        assert_eq!(
            out.screen,
            Some(Screen::Show("MODE: Line".to_string(), String::new()))
        );
        menu.press(Button::Home, now);
        assert_eq!(menu.active(), Some(Mode::Line));
    }

    #[test]
    fn test_exit_mode_quits() {
        let (mut menu, now) = menu();
        menu.press(Button::Home, now);
        menu.press(Button::DUp, now);
        let out = menu.press(Button::Circle, now);
        assert!(out.quit);
        assert_eq!(menu.active(), Some(Mode::Exit));
    }

    #[test]
    fn test_select_quits_anywhere() {
        let (mut menu, now) = menu();
        assert!(menu.press(Button::Select, now).quit);
        menu.press(Button::Home, now);
        assert!(menu.press(Button::Select, now).quit);
    }

    #[test]
    fn test_only_manual_drives() {
        assert!(Mode::Manual.drives());
        for mode in &Mode::ALL[1..] {
            assert!(!mode.drives());
        }
    }
}
