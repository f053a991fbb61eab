//! Replay scripted pointer sessions against the widgets and record the
//! commands their bindings run.

use std::{cell::RefCell, fmt::Debug, rc::Rc};

use clap::ValueEnum;
use itembind::{
    BindTag, Invocation, Outcome, WindowId,
    event::{Button, Event, State},
};
use itembind_widgets::{
    EntryId, EntryPart, Hierbox, HierboxCtx, HierboxHandler, Result, TabId, TabPart, Tabs,
    TabsCtx, TabsHandler,
};
use tracing::info;

/// Widgets the gym can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Widget {
    /// A hierarchy box with a small source tree.
    Hierbox,
    /// A notebook with three tabs.
    Tabs,
}

/// Lines recorded by command handlers.
type Output = Rc<RefCell<Vec<String>>>;

/// Record an invocation as `part name sequence command`.
fn record<I, C: Debug>(out: &Output, name: &str, inv: &Invocation<I, C>) {
    let line = format!(
        "{:?} {name} {} {}",
        inv.target.context, inv.sequence, inv.command
    );
    info!("{line}");
    out.borrow_mut().push(line);
}

/// A handler that records each command and runs the built-in ones.
fn hierbox_handler(out: Output) -> HierboxHandler {
    Box::new(
        move |ctx: &mut HierboxCtx<'_>,
              inv: &Invocation<EntryId, EntryPart>|
              -> itembind::Result<Outcome> {
            let name = ctx.tree().label(inv.target.item).unwrap_or("?").to_string();
            record(&out, &name, inv);
            ctx.builtin(inv)?;
            Ok(Outcome::Continue)
        },
    )
}

/// A handler that records each command and runs the built-in ones.
fn tabs_handler(out: Output) -> TabsHandler {
    Box::new(
        move |ctx: &mut TabsCtx<'_>, inv: &Invocation<TabId, TabPart>| -> itembind::Result<Outcome> {
            let name = ctx.strip().name(inv.target.item).unwrap_or("?").to_string();
            record(&out, &name, inv);
            ctx.builtin(inv)?;
            Ok(Outcome::Continue)
        },
    )
}

/// Pointer motion with no buttons held.
fn motion(x: i32, y: i32) -> Event {
    Event::motion((x, y), State::empty())
}

/// Pointer motion with button 1 held.
fn drag(x: i32, y: i32) -> Event {
    Event::motion((x, y), State::BUTTON1)
}

/// Press button 1.
fn press(x: i32, y: i32) -> Event {
    Event::button_press(Button::Left, (x, y), State::empty())
}

/// Release button 1.
fn release(x: i32, y: i32) -> Event {
    Event::button_release(Button::Left, (x, y), State::BUTTON1)
}

/// Drive a hierarchy box through a press, a drag to a sibling row, a release,
/// a click on an expand button and a window exit.
///
/// Rows are `root`, `src`, `lib.rs`, `main.rs` and `docs`, 20 units high.
pub fn run_hierbox() -> Result<Vec<String>> {
    let out: Output = Rc::default();
    let mut hb = Hierbox::new(WindowId(1), "root", hierbox_handler(out.clone()));
    hb.install_defaults()?;
    hb.bind(BindTag::from("Entry"), &["<ButtonPress-1>", "press %x,%y"])?;
    hb.bind(BindTag::from("Entry"), &["<ButtonRelease-1>", "release %x,%y"])?;

    let root = hb.tree().root();
    let src = hb.insert(root, "src")?;
    hb.insert(src, "lib.rs")?;
    hb.insert(src, "main.rs")?;
    hb.insert(root, "docs")?;
    hb.open(src)?;

    for e in [
        motion(60, 30),
        press(60, 30),
        drag(60, 50),
        release(60, 50),
        motion(28, 28),
        press(28, 28),
        release(28, 28),
        motion(60, 500),
    ] {
        hb.handle_event(&e);
    }
    Ok(out.take())
}

/// Drive a notebook through selecting a tab and tearing it off.
///
/// Tabs are `alpha` (x 0..43), `beta` (x 43..79) and `gamma` (x 79..122).
pub fn run_tabs() -> Result<Vec<String>> {
    let out: Output = Rc::default();
    let mut tabs = Tabs::notebook(WindowId(1), tabs_handler(out.clone()));
    tabs.install_defaults()?;
    tabs.bind("all", &["<Enter>", "enter %x"])?;
    for name in ["alpha", "beta", "gamma"] {
        tabs.insert(name)?;
    }

    for e in [
        motion(10, 10),
        press(50, 10),
        release(50, 10),
        motion(50, 24),
        press(50, 24),
        release(50, 24),
        motion(100, 10),
    ] {
        tabs.handle_event(&e);
    }
    Ok(out.take())
}

/// Run the session for a widget.
pub fn run(widget: Widget) -> Result<Vec<String>> {
    match widget {
        Widget::Hierbox => run_hierbox(),
        Widget::Tabs => run_tabs(),
    }
}
