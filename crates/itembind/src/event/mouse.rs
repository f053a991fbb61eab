//! Pointer buttons.
use std::fmt;

use super::State;

/// Mouse button codes, numbered as the window system numbers them.
#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Button {
    /// Button 1.
    Left,
    /// Button 2.
    Middle,
    /// Button 3.
    Right,
    /// Button 4, usually the wheel scrolling up.
    WheelUp,
    /// Button 5, usually the wheel scrolling down.
    WheelDown,
}

impl Button {
    /// All buttons in number order.
    pub const ALL: [Self; 5] = [
        Self::Left,
        Self::Middle,
        Self::Right,
        Self::WheelUp,
        Self::WheelDown,
    ];

    /// The window-system button number, 1 through 5.
    pub fn number(&self) -> u8 {
        match self {
            Self::Left => 1,
            Self::Middle => 2,
            Self::Right => 3,
            Self::WheelUp => 4,
            Self::WheelDown => 5,
        }
    }

    /// Look up a button by number.
    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.number() == n)
    }

    /// The state bit that is set while this button is held.
    pub fn mask(&self) -> State {
        match self {
            Self::Left => State::BUTTON1,
            Self::Middle => State::BUTTON2,
            Self::Right => State::BUTTON3,
            Self::WheelUp => State::BUTTON4,
            Self::WheelDown => State::BUTTON5,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}
