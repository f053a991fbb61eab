//! `%` substitution in bound commands.
use crate::event::Event;

/// Placeholder for a field the event does not carry.
const UNKNOWN: &str = "??";

/// Expand the `%` escapes in a command against an event.
///
/// | escape | value |
/// |---|---|
/// | `%x`, `%y` | pointer location |
/// | `%b` | button number |
/// | `%K` | keysym name |
/// | `%A` | printable character of a key event, or nothing |
/// | `%s` | modifier state, decimal |
/// | `%d` | crossing detail |
/// | `%T` | event type name |
/// | `%%` | a literal `%` |
pub fn expand(command: &str, event: &Event) -> String {
    let mut out = String::with_capacity(command.len());
    let mut chars = command.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None | Some('%') => out.push('%'),
            Some('x') => out.push_str(&event.location.x.to_string()),
            Some('y') => out.push_str(&event.location.y.to_string()),
            Some('b') => match event.button() {
                Some(b) => out.push_str(&b.number().to_string()),
                None => out.push_str(UNKNOWN),
            },
            Some('K') => match event.key() {
                Some(k) => out.push_str(&k.to_string()),
                None => out.push_str(UNKNOWN),
            },
            Some('A') => {
                if let Some(c) = event.key().and_then(|k| k.printable()) {
                    out.push(c);
                }
            }
            Some('s') => out.push_str(&event.state.bits().to_string()),
            Some('d') => out.push_str(event.detail().map_or(UNKNOWN, |d| d.name())),
            Some('T') => out.push_str(event.type_name()),
            Some(_) => out.push_str(UNKNOWN),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Button, Detail, KeyCode, State};

    #[test]
    fn pointer_fields() {
        let e = Event::button_press(Button::Right, (12, -3), State::SHIFT);
        assert_eq!(expand("press %b at %x,%y", &e), "press 3 at 12,-3");
        assert_eq!(expand("%T %s", &e), "ButtonPress 1");
        assert_eq!(expand("%K %d", &e), "?? ??");
    }

    #[test]
    fn crossing_and_keys() {
        let e = Event::leave((0, 0), State::empty(), Detail::Virtual);
        assert_eq!(expand("%T %d", &e), "Leave NotifyVirtual");

        let k = Event::key_press('q', State::empty());
        assert_eq!(expand("[%K][%A]", &k), "[q][q]");
        let esc = Event::key_press(KeyCode::Escape, State::empty());
        assert_eq!(expand("[%K][%A]", &esc), "[Escape][]");
    }

    #[test]
    fn escapes() {
        let e = Event::motion((1, 2), State::empty());
        assert_eq!(expand("100%%", &e), "100%");
        assert_eq!(expand("trailing %", &e), "trailing %");
        assert_eq!(expand("%q", &e), "??");
        assert_eq!(expand("plain", &e), "plain");
    }
}
