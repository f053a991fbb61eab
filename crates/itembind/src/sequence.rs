//! Event sequence patterns, written in the `<Modifier-Type-Detail>` syntax.
use std::{fmt, str::FromStr, sync::LazyLock};

use bitflags::bitflags;
use regex::Regex;

use crate::{
    error::{Error, ParseError, Result},
    event::{Button, Event, EventKind, KeyCode, State},
};

bitflags! {
    /// The event classes a sequence can match.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventMask: u16 {
        /// Key presses.
        const KEY_PRESS = 1;
        /// Key releases.
        const KEY_RELEASE = 1 << 1;
        /// Button presses.
        const BUTTON_PRESS = 1 << 2;
        /// Button releases.
        const BUTTON_RELEASE = 1 << 3;
        /// Pointer motion.
        const POINTER_MOTION = 1 << 4;
        /// Pointer entering an item.
        const ENTER_WINDOW = 1 << 5;
        /// Pointer leaving an item.
        const LEAVE_WINDOW = 1 << 6;
        /// Named virtual events.
        const VIRTUAL = 1 << 7;
    }
}

/// Modifier names, in canonical display order.
const MODIFIERS: &[(&str, State)] = &[
    ("Control", State::CONTROL),
    ("Shift", State::SHIFT),
    ("Lock", State::LOCK),
    ("Alt", State::MOD1),
    ("Mod2", State::MOD2),
    ("Mod3", State::MOD3),
    ("Mod4", State::MOD4),
    ("Mod5", State::MOD5),
    ("B1", State::BUTTON1),
    ("B2", State::BUTTON2),
    ("B3", State::BUTTON3),
    ("B4", State::BUTTON4),
    ("B5", State::BUTTON5),
];

/// Alternate modifier spellings accepted on input.
const MODIFIER_ALIASES: &[(&str, State)] = &[
    ("Meta", State::MOD1),
    ("M", State::MOD1),
    ("Mod1", State::MOD1),
    ("Button1", State::BUTTON1),
    ("Button2", State::BUTTON2),
    ("Button3", State::BUTTON3),
    ("Button4", State::BUTTON4),
    ("Button5", State::BUTTON5),
];

/// Repeat-count modifiers. They parse, but repeated sequences are not matched.
const REPEATS: &[&str] = &["Double", "Triple", "Quadruple"];

/// Event classes that exist in the window system but cannot be delivered to
/// items.
const ILLEGAL: &[&str] = &[
    "Expose",
    "Configure",
    "FocusIn",
    "FocusOut",
    "Destroy",
    "Map",
    "Unmap",
    "Visibility",
    "Property",
    "Activate",
    "Deactivate",
    "Circulate",
    "Colormap",
    "Gravity",
    "Reparent",
    "Create",
    "MouseWheel",
];

/// The event class a pattern matches, with its optional detail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// Key press, optionally for one keysym.
    KeyPress(Option<KeyCode>),
    /// Key release, optionally for one keysym.
    KeyRelease(Option<KeyCode>),
    /// Button press, optionally for one button.
    ButtonPress(Option<Button>),
    /// Button release, optionally for one button.
    ButtonRelease(Option<Button>),
    /// Pointer motion.
    Motion,
    /// Pointer entry, real or virtual.
    Enter,
    /// Pointer exit, real or virtual.
    Leave,
    /// A named virtual event.
    Virtual(String),
}

/// A parsed single-event sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    /// Event class and detail.
    pub kind: PatternKind,
    /// Modifiers that must be present in the event state.
    pub modifiers: State,
}

/// Look up a bindable event type by name.
fn type_from_name(name: &str) -> Option<PatternKind> {
    Some(match name {
        "Key" | "KeyPress" => PatternKind::KeyPress(None),
        "KeyRelease" => PatternKind::KeyRelease(None),
        "Button" | "ButtonPress" => PatternKind::ButtonPress(None),
        "ButtonRelease" => PatternKind::ButtonRelease(None),
        "Motion" => PatternKind::Motion,
        "Enter" => PatternKind::Enter,
        "Leave" => PatternKind::Leave,
        _ => return None,
    })
}

/// Look up a modifier by any of its spellings.
fn modifier_from_name(name: &str) -> Option<State> {
    MODIFIERS
        .iter()
        .chain(MODIFIER_ALIASES)
        .find(|(n, _)| *n == name)
        .map(|(_, s)| *s)
        .or_else(|| (name == "Any").then(State::empty))
}

/// A virtual event, `<<Name>>`.
static VIRTUAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<<([^<>]+)>>$").expect("invalid virtual event pattern"));

/// A single `<...>` pattern.
static SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([^<>]*)>$").expect("invalid pattern regex"));

/// Two or more patterns or characters in a row.
static MULTI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(<[^<>]*>|[^<>])+$").expect("invalid sequence regex"));

/// Parse a button detail field.
fn parse_button(field: &str, seq: &str, offset: usize) -> Result<Button> {
    field
        .parse::<u8>()
        .ok()
        .and_then(Button::from_number)
        .ok_or_else(|| ParseError::with_offset(format!("bad button \"{field}\""), seq, offset).into())
}

impl Pattern {
    /// Parse a sequence. A bare printable character is a key press for that
    /// character; `<<Name>>` is a virtual event; everything else is a single
    /// `<...>` pattern.
    pub fn parse(seq: &str) -> Result<Self> {
        if seq.is_empty() {
            return Err(ParseError::new("empty event sequence").into());
        }
        if let Some(c) = VIRTUAL_RE.captures(seq) {
            return Ok(Self {
                kind: PatternKind::Virtual(c[1].to_string()),
                modifiers: State::empty(),
            });
        }
        if let Some(c) = SINGLE_RE.captures(seq) {
            return Self::parse_fields(&c[1], seq);
        }
        let mut chars = seq.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Self {
                kind: PatternKind::KeyPress(Some(KeyCode::Char(c))),
                modifiers: State::empty(),
            });
        }
        if MULTI_RE.is_match(seq) {
            return Err(Error::Unsupported(format!(
                "multi-event sequence \"{seq}\""
            )));
        }
        Err(ParseError::with_offset("unterminated pattern", seq, 0).into())
    }

    /// Parse the body of a `<...>` pattern.
    fn parse_fields(body: &str, seq: &str) -> Result<Self> {
        let mut fields = Vec::new();
        let mut offset = 1;
        for f in body.split('-') {
            if f.is_empty() {
                return Err(ParseError::with_offset("empty field", seq, offset).into());
            }
            fields.push((f, offset));
            offset += f.len() + 1;
        }

        let mut modifiers = State::empty();
        let mut i = 0;
        while i + 1 < fields.len() {
            let (f, _) = fields[i];
            if REPEATS.contains(&f) {
                return Err(Error::Unsupported(format!("repeat modifier \"{f}\"")));
            }
            match modifier_from_name(f) {
                Some(m) => modifiers |= m,
                None => break,
            }
            i += 1;
        }

        let (field, at) = fields[i];
        if ILLEGAL.contains(&field) {
            return Err(Error::IllegalEvent(field.to_string()));
        }
        let mut rest = fields[i + 1..].iter();
        let kind = match type_from_name(field) {
            Some(kind) => match (kind, rest.next()) {
                (k, None) => k,
                (PatternKind::KeyPress(_), Some((d, at))) => {
                    PatternKind::KeyPress(Some(Self::keysym(d, seq, *at)?))
                }
                (PatternKind::KeyRelease(_), Some((d, at))) => {
                    PatternKind::KeyRelease(Some(Self::keysym(d, seq, *at)?))
                }
                (PatternKind::ButtonPress(_), Some((d, at))) => {
                    PatternKind::ButtonPress(Some(parse_button(d, seq, *at)?))
                }
                (PatternKind::ButtonRelease(_), Some((d, at))) => {
                    PatternKind::ButtonRelease(Some(parse_button(d, seq, *at)?))
                }
                (_, Some((d, at))) => {
                    return Err(ParseError::with_offset(
                        format!("{field} events take no detail, got \"{d}\""),
                        seq,
                        *at,
                    )
                    .into());
                }
            },
            None if field.len() == 1 && field.as_bytes()[0].is_ascii_digit() => {
                PatternKind::ButtonPress(Some(parse_button(field, seq, at)?))
            }
            None => PatternKind::KeyPress(Some(Self::keysym(field, seq, at)?)),
        };
        if let Some((extra, at)) = rest.next() {
            return Err(
                ParseError::with_offset(format!("extra field \"{extra}\""), seq, *at).into(),
            );
        }
        Ok(Self { kind, modifiers })
    }

    /// Parse a keysym field, attaching the field's location on failure.
    fn keysym(field: &str, seq: &str, offset: usize) -> Result<KeyCode> {
        field
            .parse::<KeyCode>()
            .map_err(|e| ParseError::with_offset(e.to_string(), seq, offset).into())
    }

    /// The event classes this pattern can match.
    pub fn mask(&self) -> EventMask {
        match self.kind {
            PatternKind::KeyPress(_) => EventMask::KEY_PRESS,
            PatternKind::KeyRelease(_) => EventMask::KEY_RELEASE,
            PatternKind::ButtonPress(_) => EventMask::BUTTON_PRESS,
            PatternKind::ButtonRelease(_) => EventMask::BUTTON_RELEASE,
            PatternKind::Motion => EventMask::POINTER_MOTION,
            PatternKind::Enter => EventMask::ENTER_WINDOW,
            PatternKind::Leave => EventMask::LEAVE_WINDOW,
            PatternKind::Virtual(_) => EventMask::VIRTUAL,
        }
    }

    /// Does this pattern match an event? Every pattern modifier must be held;
    /// extra modifiers in the event are ignored.
    pub fn matches(&self, event: &Event) -> bool {
        let kind = match (&self.kind, &event.kind) {
            (PatternKind::KeyPress(k), EventKind::KeyPress(e))
            | (PatternKind::KeyRelease(k), EventKind::KeyRelease(e)) => k.is_none_or(|k| k == *e),
            (PatternKind::ButtonPress(b), EventKind::ButtonPress(e))
            | (PatternKind::ButtonRelease(b), EventKind::ButtonRelease(e)) => {
                b.is_none_or(|b| b == *e)
            }
            (PatternKind::Motion, EventKind::Motion)
            | (PatternKind::Enter, EventKind::Enter(_))
            | (PatternKind::Leave, EventKind::Leave(_)) => true,
            (PatternKind::Virtual(p), EventKind::Virtual(e)) => p == e,
            _ => false,
        };
        kind && event.state.contains(self.modifiers)
    }

    /// How specific the pattern is. Among patterns matching the same event,
    /// the most specific one wins.
    pub fn specificity(&self) -> u32 {
        let detail = match &self.kind {
            PatternKind::KeyPress(k) | PatternKind::KeyRelease(k) => k.is_some(),
            PatternKind::ButtonPress(b) | PatternKind::ButtonRelease(b) => b.is_some(),
            _ => false,
        };
        self.modifiers.bits().count_ones() + u32::from(detail)
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let PatternKind::Virtual(name) = &self.kind {
            return write!(f, "<<{name}>>");
        }
        f.write_str("<")?;
        for (name, m) in MODIFIERS {
            if self.modifiers.contains(*m) {
                write!(f, "{name}-")?;
            }
        }
        match &self.kind {
            PatternKind::KeyPress(k) => write_detail(f, "KeyPress", k.as_ref())?,
            PatternKind::KeyRelease(k) => write_detail(f, "KeyRelease", k.as_ref())?,
            PatternKind::ButtonPress(b) => write_detail(f, "ButtonPress", b.as_ref())?,
            PatternKind::ButtonRelease(b) => write_detail(f, "ButtonRelease", b.as_ref())?,
            PatternKind::Motion => f.write_str("Motion")?,
            PatternKind::Enter => f.write_str("Enter")?,
            PatternKind::Leave => f.write_str("Leave")?,
            PatternKind::Virtual(_) => {}
        }
        f.write_str(">")
    }
}

/// Write a type name with its optional detail.
fn write_detail(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    detail: Option<&impl fmt::Display>,
) -> fmt::Result {
    match detail {
        Some(d) => write!(f, "{name}-{d}"),
        None => f.write_str(name),
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::event::Detail;

    fn p(s: &str) -> Result<Pattern> {
        Pattern::parse(s)
    }

    #[test]
    fn canonical_forms() -> Result<()> {
        assert_eq!(p("a")?, p("<KeyPress-a>")?);
        assert_eq!(p("<a>")?, p("<Key-a>")?);
        assert_eq!(p("<1>")?, p("<ButtonPress-1>")?);
        assert_eq!(p("<Button-1>")?, p("<ButtonPress-1>")?);
        assert_eq!(p("<Meta-x>")?, p("<Alt-KeyPress-x>")?);
        assert_eq!(p("<Button1-Motion>")?, p("<B1-Motion>")?);
        assert_eq!(p("<Any-Enter>")?, p("<Enter>")?);

        assert_eq!(p("<Shift-Control-1>")?.to_string(), "<Control-Shift-ButtonPress-1>");
        assert_eq!(p("<Key-minus>")?.to_string(), "<KeyPress-minus>");
        assert_eq!(p("<Enter>")?.to_string(), "<Enter>");
        assert_eq!(p("<B1-Motion>")?.to_string(), "<B1-Motion>");
        assert_eq!(p("<<Open>>")?.to_string(), "<<Open>>");
        Ok(())
    }

    #[test]
    fn parses_on_many_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                thread::spawn(|| {
                    (0..50).all(|_| {
                        p("<<Open>>").is_ok()
                            && p("<Control-1>").is_ok()
                            && matches!(p("<1><2>"), Err(Error::Unsupported(_)))
                    })
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().is_ok_and(|ok| ok));
        }
    }

    #[test]
    fn rejections() {
        assert_eq!(p("<Expose>"), Err(Error::IllegalEvent("Expose".into())));
        assert_eq!(
            p("<Control-FocusIn>"),
            Err(Error::IllegalEvent("FocusIn".into()))
        );
        assert!(matches!(p("<Double-1>"), Err(Error::Unsupported(_))));
        assert!(matches!(p("<1><2>"), Err(Error::Unsupported(_))));
        assert!(matches!(p("ab"), Err(Error::Unsupported(_))));
        assert!(matches!(p(""), Err(Error::Parse(_))));
        assert!(matches!(p("<>"), Err(Error::Parse(_))));
        assert!(matches!(p("<Control--a>"), Err(Error::Parse(_))));
        assert!(matches!(p("<ButtonPress-9>"), Err(Error::Parse(_))));
        assert!(matches!(p("<Enter-1>"), Err(Error::Parse(_))));
        assert!(matches!(p("<KeyPress-a-b>"), Err(Error::Parse(_))));
        assert!(matches!(p("<Bogus>"), Err(Error::Parse(_))));
        assert!(matches!(p("<1"), Err(Error::Parse(_))));
    }

    #[test]
    fn matching() -> Result<()> {
        let press = Event::button_press(Button::Left, (0, 0), State::CONTROL);
        assert!(p("<1>")?.matches(&press));
        assert!(p("<ButtonPress>")?.matches(&press));
        assert!(p("<Control-1>")?.matches(&press));
        assert!(!p("<Shift-1>")?.matches(&press));
        assert!(!p("<2>")?.matches(&press));
        assert!(!p("<ButtonRelease-1>")?.matches(&press));

        let drag = Event::motion((0, 0), State::BUTTON1);
        assert!(p("<Motion>")?.matches(&drag));
        assert!(p("<B1-Motion>")?.matches(&drag));
        assert!(!p("<B2-Motion>")?.matches(&drag));

        let venter = Event::enter((0, 0), State::empty(), Detail::Virtual);
        assert!(p("<Enter>")?.matches(&venter));
        assert!(!p("<Leave>")?.matches(&venter));

        let v = Event::virtual_event("Open", (0, 0), State::empty());
        assert!(p("<<Open>>")?.matches(&v));
        assert!(!p("<<Close>>")?.matches(&v));

        assert!(p("q")?.matches(&Event::key_press('q', State::empty())));
        assert!(!p("q")?.matches(&Event::key_release('q', State::empty())));
        Ok(())
    }

    #[test]
    fn specificity_and_mask() -> Result<()> {
        assert_eq!(p("<ButtonPress>")?.specificity(), 0);
        assert_eq!(p("<1>")?.specificity(), 1);
        assert_eq!(p("<Control-1>")?.specificity(), 2);
        assert_eq!(p("<Enter>")?.mask(), EventMask::ENTER_WINDOW);
        assert_eq!(p("<<Open>>")?.mask(), EventMask::VIRTUAL);
        assert_eq!(p("x")?.mask(), EventMask::KEY_PRESS);
        Ok(())
    }
}
