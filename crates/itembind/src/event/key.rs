//! Keyboard input, named by X keysym.
use std::{fmt, str::FromStr};

use crate::error::ParseError;

/// Logical key codes.
#[derive(Debug, PartialOrd, PartialEq, Hash, Eq, Clone, Copy)]
pub enum KeyCode {
    /// Backspace key.
    Backspace,
    /// Return key.
    Return,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page up key ("Prior").
    PageUp,
    /// Page down key ("Next").
    PageDown,
    /// Tab key.
    Tab,
    /// Delete key.
    Delete,
    /// Insert key.
    Insert,
    /// Escape key.
    Escape,
    /// F key.
    ///
    /// `KeyCode::F(1)` represents the F1 key, etc.
    F(u8),
    /// A character.
    ///
    /// `KeyCode::Char('c')` represents the `c` keysym, etc.
    Char(char),
}

/// Keysym names for printable characters that cannot appear literally in a
/// sequence.
const CHAR_NAMES: &[(&str, char)] = &[
    ("space", ' '),
    ("minus", '-'),
    ("less", '<'),
    ("greater", '>'),
    ("comma", ','),
    ("period", '.'),
    ("slash", '/'),
    ("plus", '+'),
    ("equal", '='),
    ("exclam", '!'),
    ("at", '@'),
];

/// Keysym names for the non-printing keys.
const NAMED: &[(&str, KeyCode)] = &[
    ("BackSpace", KeyCode::Backspace),
    ("Return", KeyCode::Return),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
    ("Prior", KeyCode::PageUp),
    ("Next", KeyCode::PageDown),
    ("Tab", KeyCode::Tab),
    ("Delete", KeyCode::Delete),
    ("Insert", KeyCode::Insert),
    ("Escape", KeyCode::Escape),
];

impl KeyCode {
    /// The character this key inserts, if it is printable.
    pub fn printable(&self) -> Option<char> {
        match self {
            Self::Char(c) if !c.is_control() => Some(*c),
            Self::Return => Some('\r'),
            Self::Tab => Some('\t'),
            _ => None,
        }
    }
}

impl From<char> for KeyCode {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl FromStr for KeyCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Self::Char(c));
        }
        if let Some((_, k)) = NAMED.iter().find(|(name, _)| *name == s) {
            return Ok(*k);
        }
        if let Some((_, c)) = CHAR_NAMES.iter().find(|(name, _)| *name == s) {
            return Ok(Self::Char(*c));
        }
        if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse::<u8>().ok())
            && (1..=35).contains(&n)
        {
            return Ok(Self::F(n));
        }
        Err(ParseError::new(format!("bad keysym \"{s}\"")))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F(n) => write!(f, "F{n}"),
            Self::Char(c) => match CHAR_NAMES.iter().find(|(_, v)| v == c) {
                Some((name, _)) => f.write_str(name),
                None => write!(f, "{c}"),
            },
            k => {
                let name = NAMED
                    .iter()
                    .find(|(_, v)| v == k)
                    .map_or("??", |(name, _)| name);
                f.write_str(name)
            }
        }
    }
}
