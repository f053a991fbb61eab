//! Input events consumed by a binding table.
//!
//! Events are plain values. The rewritten forms the pick machinery needs (a
//! motion replayed as an enter, a synthetic leave built from the last pick
//! event) are produced by constructors that return new events rather than by
//! editing an event in place.

/// Keyboard keysyms.
pub mod key;
/// Pointer buttons.
pub mod mouse;

use bitflags::bitflags;

use crate::geom::Point;
pub use key::KeyCode;
pub use mouse::Button;

bitflags! {
    /// Modifier and button state accompanying an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct State: u16 {
        /// Shift is held.
        const SHIFT = 1;
        /// Caps lock is on.
        const LOCK = 1 << 1;
        /// Control is held.
        const CONTROL = 1 << 2;
        /// Modifier 1, usually Alt or Meta.
        const MOD1 = 1 << 3;
        /// Modifier 2.
        const MOD2 = 1 << 4;
        /// Modifier 3.
        const MOD3 = 1 << 5;
        /// Modifier 4.
        const MOD4 = 1 << 6;
        /// Modifier 5.
        const MOD5 = 1 << 7;
        /// Button 1 is held.
        const BUTTON1 = 1 << 8;
        /// Button 2 is held.
        const BUTTON2 = 1 << 9;
        /// Button 3 is held.
        const BUTTON3 = 1 << 10;
        /// Button 4 is held.
        const BUTTON4 = 1 << 11;
        /// Button 5 is held.
        const BUTTON5 = 1 << 12;
        /// Any button is held.
        const BUTTONS = Self::BUTTON1.bits()
            | Self::BUTTON2.bits()
            | Self::BUTTON3.bits()
            | Self::BUTTON4.bits()
            | Self::BUTTON5.bits();
    }
}

impl State {
    /// Alt shares the first generic modifier bit.
    pub const ALT: Self = Self::MOD1;

    /// Is any pointer button held?
    pub fn button_down(&self) -> bool {
        self.intersects(Self::BUTTONS)
    }
}

/// Crossing detail for Enter and Leave events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Detail {
    /// An ordinary transition between items.
    Ancestor,
    /// Drag feedback produced while a button is held. The item under the
    /// pointer changed but the grab keeps the pressed item current.
    Virtual,
    /// The pointer crossed from an unrelated place; used for motion replayed
    /// as an enter.
    Nonlinear,
    /// The pointer moved into a child window.
    Inferior,
}

impl Detail {
    /// The window-system name of the detail, as substituted for `%d`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ancestor => "NotifyAncestor",
            Self::Virtual => "NotifyVirtual",
            Self::Nonlinear => "NotifyNonlinear",
            Self::Inferior => "NotifyInferior",
        }
    }
}

/// The type-specific part of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A key was pressed.
    KeyPress(KeyCode),
    /// A key was released.
    KeyRelease(KeyCode),
    /// A pointer button was pressed.
    ButtonPress(Button),
    /// A pointer button was released.
    ButtonRelease(Button),
    /// The pointer moved.
    Motion,
    /// The pointer entered.
    Enter(Detail),
    /// The pointer left.
    Leave(Detail),
    /// A named application event, written `<<Name>>` in sequences.
    Virtual(String),
}

/// An input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event type and detail.
    pub kind: EventKind,
    /// Pointer location in window coordinates.
    pub location: Point,
    /// Modifier and button state. For button events this is the state before
    /// the button changed, as the window system reports it.
    pub state: State,
}

impl Event {
    /// Construct an event.
    pub fn new(kind: EventKind, location: impl Into<Point>, state: State) -> Self {
        Self {
            kind,
            location: location.into(),
            state,
        }
    }

    /// A pointer motion event.
    pub fn motion(location: impl Into<Point>, state: State) -> Self {
        Self::new(EventKind::Motion, location, state)
    }

    /// A button press event.
    pub fn button_press(button: Button, location: impl Into<Point>, state: State) -> Self {
        Self::new(EventKind::ButtonPress(button), location, state)
    }

    /// A button release event.
    pub fn button_release(button: Button, location: impl Into<Point>, state: State) -> Self {
        Self::new(EventKind::ButtonRelease(button), location, state)
    }

    /// A key press event.
    pub fn key_press(key: impl Into<KeyCode>, state: State) -> Self {
        Self::new(EventKind::KeyPress(key.into()), Point::default(), state)
    }

    /// A key release event.
    pub fn key_release(key: impl Into<KeyCode>, state: State) -> Self {
        Self::new(EventKind::KeyRelease(key.into()), Point::default(), state)
    }

    /// The pointer entering the window.
    pub fn enter(location: impl Into<Point>, state: State, detail: Detail) -> Self {
        Self::new(EventKind::Enter(detail), location, state)
    }

    /// The pointer leaving the window.
    pub fn leave(location: impl Into<Point>, state: State, detail: Detail) -> Self {
        Self::new(EventKind::Leave(detail), location, state)
    }

    /// A named virtual event.
    pub fn virtual_event(name: impl Into<String>, location: impl Into<Point>, state: State) -> Self {
        Self::new(EventKind::Virtual(name.into()), location, state)
    }

    /// An Enter event at this event's location and state.
    pub fn to_enter(&self, detail: Detail) -> Self {
        Self::enter(self.location, self.state, detail)
    }

    /// A Leave event at this event's location and state.
    pub fn to_leave(&self, detail: Detail) -> Self {
        Self::leave(self.location, self.state, detail)
    }

    /// The form of this event that is remembered for later re-picks. Motion
    /// and button release are replayed as an Enter at the same location;
    /// everything else is kept as is.
    pub fn pick_event(&self) -> Self {
        match self.kind {
            EventKind::Motion | EventKind::ButtonRelease(_) => self.to_enter(Detail::Nonlinear),
            _ => self.clone(),
        }
    }

    /// Is this a keyboard event?
    pub fn is_key(&self) -> bool {
        matches!(self.kind, EventKind::KeyPress(_) | EventKind::KeyRelease(_))
    }

    /// Is this a Leave event?
    pub fn is_leave(&self) -> bool {
        matches!(self.kind, EventKind::Leave(_))
    }

    /// The button involved in a button event.
    pub fn button(&self) -> Option<Button> {
        match self.kind {
            EventKind::ButtonPress(b) | EventKind::ButtonRelease(b) => Some(b),
            _ => None,
        }
    }

    /// The key involved in a key event.
    pub fn key(&self) -> Option<KeyCode> {
        match self.kind {
            EventKind::KeyPress(k) | EventKind::KeyRelease(k) => Some(k),
            _ => None,
        }
    }

    /// The crossing detail of an Enter or Leave event.
    pub fn detail(&self) -> Option<Detail> {
        match self.kind {
            EventKind::Enter(d) | EventKind::Leave(d) => Some(d),
            _ => None,
        }
    }

    /// The event type name, as written in sequences and substituted for `%T`.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            EventKind::KeyPress(_) => "KeyPress",
            EventKind::KeyRelease(_) => "KeyRelease",
            EventKind::ButtonPress(_) => "ButtonPress",
            EventKind::ButtonRelease(_) => "ButtonRelease",
            EventKind::Motion => "Motion",
            EventKind::Enter(_) => "Enter",
            EventKind::Leave(_) => "Leave",
            EventKind::Virtual(_) => "VirtualEvent",
        }
    }
}
