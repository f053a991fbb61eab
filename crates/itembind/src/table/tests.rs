use proptest::prelude::*;

use super::*;
use crate::{
    adapter::{Adapter, Pick},
    event::{Button, Detail, Event, State},
    geom::{Point, Rect},
    testing::{Grid, ItemId, Zone},
};

/// Two side by side items, 1 on the left and 2 on the right, with empty
/// space from x = 20 onwards. Crossings and buttons are traced on "all".
fn setup() -> Result<(BindingTable<ItemId, Zone>, Grid)> {
    let mut grid = Grid::new();
    grid.add(1, Rect::new(0, 0, 10, 10))
        .add(2, Rect::new(10, 0, 10, 10));
    let mut table: BindingTable<ItemId, Zone> = BindingTable::new(WindowId(1));
    for seq in ["<Enter>", "<Leave>", "<ButtonPress>", "<ButtonRelease>"] {
        table.bind("all", seq, "", false)?;
    }
    Ok((table, grid))
}

fn motion(x: i32, y: i32) -> Event {
    Event::motion((x, y), State::empty())
}

fn drag(x: i32, y: i32) -> Event {
    Event::motion((x, y), State::BUTTON1)
}

fn press(x: i32, y: i32) -> Event {
    Event::button_press(Button::Left, (x, y), State::empty())
}

fn release(x: i32, y: i32) -> Event {
    Event::button_release(Button::Left, (x, y), State::BUTTON1)
}

fn run(table: &mut BindingTable<ItemId, Zone>, grid: &mut Grid, events: &[Event]) {
    for e in events {
        table.handle_event(grid, e);
    }
}

#[test]
fn enter_on_first_pick() -> Result<()> {
    let mut grid = Grid::new();
    grid.add_tagged(1, Rect::new(0, 0, 10, 10), &["node"]);
    let mut table: BindingTable<ItemId, Zone> = BindingTable::new(WindowId(1));
    table.bind("node", "<Enter>", "cmdA", false)?;

    assert_eq!(table.current_item(), None);
    table.handle_event(
        &mut grid,
        &Event::enter((5, 5), State::empty(), Detail::Ancestor),
    );
    assert_eq!(grid.commands(), ["cmdA"]);
    assert_eq!(table.current(), Some(Pick::new(1, Zone::Body)));

    table.handle_event(&mut grid, &motion(6, 6));
    assert_eq!(grid.commands(), ["cmdA"]);
    Ok(())
}

#[test]
fn leave_precedes_enter() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    run(&mut table, &mut grid, &[motion(5, 5), motion(15, 5), motion(25, 5)]);
    assert_eq!(grid.trace(), ["Enter(1)", "Leave(1)", "Enter(2)", "Leave(2)"]);
    assert_eq!(table.current_item(), None);
    Ok(())
}

#[test]
fn window_leave_clears_current() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    run(
        &mut table,
        &mut grid,
        &[
            motion(5, 5),
            Event::leave((5, 5), State::empty(), Detail::Ancestor),
        ],
    );
    assert_eq!(grid.trace(), ["Enter(1)", "Leave(1)"]);
    assert_eq!(table.current_item(), None);
    assert!(table.last_event().is_some_and(Event::is_leave));

    // Re-picking after the pointer left the window finds nothing.
    table.repick(&mut grid);
    assert_eq!(grid.trace().len(), 2);
    Ok(())
}

#[test]
fn context_change_is_a_transition() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    grid.set_edge(1, Rect::new(0, 0, 2, 10));
    run(&mut table, &mut grid, &[motion(5, 5), motion(1, 5)]);
    assert_eq!(grid.trace(), ["Enter(1)", "Leave(1)", "Enter(1)"]);
    assert_eq!(table.current_context(), Some(Zone::Edge));
    Ok(())
}

#[test]
fn drag_to_another_item() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    run(&mut table, &mut grid, &[motion(5, 5), press(5, 5), drag(15, 5)]);
    assert_eq!(
        grid.trace(),
        ["Enter(1)", "ButtonPress(1)", "vLeave(1)", "vEnter(2)"]
    );
    assert_eq!(table.current_item(), Some(1));
    assert!(table.is_grabbed());

    // Further motion inside the new item reports nothing.
    table.handle_event(&mut grid, &drag(16, 6));
    assert_eq!(grid.trace().len(), 4);

    table.handle_event(&mut grid, &release(15, 5));
    assert_eq!(
        grid.trace(),
        [
            "Enter(1)",
            "ButtonPress(1)",
            "vLeave(1)",
            "vEnter(2)",
            "ButtonRelease(2)",
            "Leave(1)",
            "Enter(2)",
        ]
    );
    assert_eq!(table.current_item(), Some(2));
    assert!(!table.is_grabbed());
    assert_eq!(table.state(), State::empty());
    Ok(())
}

#[test]
fn drag_back_to_pressed_item() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    run(
        &mut table,
        &mut grid,
        &[
            motion(5, 5),
            press(5, 5),
            drag(15, 5),
            drag(5, 5),
            release(5, 5),
        ],
    );
    assert_eq!(
        grid.trace(),
        [
            "Enter(1)",
            "ButtonPress(1)",
            "vLeave(1)",
            "vEnter(2)",
            "vLeave(2)",
            "vEnter(1)",
            "ButtonRelease(1)",
        ]
    );
    assert_eq!(table.current_item(), Some(1));
    assert!(!table.is_grabbed());
    Ok(())
}

#[test]
fn drag_out_to_empty_space() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    run(
        &mut table,
        &mut grid,
        &[motion(5, 5), press(5, 5), drag(25, 5), release(25, 5)],
    );
    // The pressed item still sees the release.
    assert_eq!(
        grid.trace(),
        [
            "Enter(1)",
            "ButtonPress(1)",
            "vLeave(1)",
            "ButtonRelease(1)",
            "Leave(1)",
        ]
    );
    assert_eq!(table.current_item(), None);
    Ok(())
}

#[test]
fn press_on_empty_space_then_drag_in() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    run(
        &mut table,
        &mut grid,
        &[motion(25, 5), press(25, 5), drag(5, 5), release(5, 5)],
    );
    // Item 1 never saw the press, so it gets no release.
    assert_eq!(grid.trace(), ["vEnter(1)", "Enter(1)"]);
    assert_eq!(table.current_item(), Some(1));
    assert!(!table.is_grabbed());
    assert_eq!(table.state(), State::empty());
    Ok(())
}

#[test]
fn pressed_item_deleted_in_its_drag_leave() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind(BindTag::Item(1), "<Leave>", "delete 1", false)?;
    run(&mut table, &mut grid, &[motion(5, 5), press(5, 5), drag(15, 5)]);
    assert_eq!(
        grid.trace(),
        ["Enter(1)", "ButtonPress(1)", "vLeave(1)", "vEnter(2)"]
    );
    assert!(!grid.contains(1));
    assert_eq!(table.current_item(), None);
    assert!(table.is_grabbed());

    // With the pressed item gone, the release has no target.
    table.handle_event(&mut grid, &release(15, 5));
    assert_eq!(
        grid.trace(),
        ["Enter(1)", "ButtonPress(1)", "vLeave(1)", "vEnter(2)", "Enter(2)"]
    );
    assert_eq!(table.current_item(), Some(2));
    assert!(!table.is_grabbed());
    assert_eq!(table.state(), State::empty());
    Ok(())
}

#[test]
fn drag_target_deleted_in_drag_leave() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind(BindTag::Item(1), "<Leave>", "delete 2", false)?;
    run(&mut table, &mut grid, &[motion(5, 5), press(5, 5), drag(15, 5)]);

    // Item 2 is gone before it could be entered; both tags of item 1 ran.
    assert_eq!(
        grid.trace(),
        ["Enter(1)", "ButtonPress(1)", "vLeave(1)", "vLeave(1)"]
    );
    assert_eq!(table.current_item(), Some(1));
    assert!(table.is_grabbed());

    // More motion over the hole reports nothing.
    table.handle_event(&mut grid, &drag(16, 6));
    assert_eq!(grid.trace().len(), 4);

    table.handle_event(&mut grid, &release(15, 5));
    assert_eq!(
        grid.trace(),
        [
            "Enter(1)",
            "ButtonPress(1)",
            "vLeave(1)",
            "vLeave(1)",
            "ButtonRelease(1)",
            "Leave(1)",
            "Leave(1)",
        ]
    );
    assert_eq!(table.current_item(), None);
    assert!(!table.is_grabbed());
    assert_eq!(table.state(), State::empty());
    Ok(())
}

#[test]
fn drag_target_deleted_in_drag_enter() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind(BindTag::Item(2), "<Enter>", "delete 2", false)?;
    run(&mut table, &mut grid, &[motion(5, 5), press(5, 5), drag(15, 5)]);
    assert_eq!(
        grid.trace(),
        ["Enter(1)", "ButtonPress(1)", "vLeave(1)", "vEnter(2)"]
    );
    // The pressed item is restored as current.
    assert_eq!(table.current_item(), Some(1));
    assert!(table.is_grabbed());

    table.handle_event(&mut grid, &release(15, 5));
    assert_eq!(
        &grid.trace()[4..],
        ["ButtonRelease(1)", "Leave(1)"]
    );
    assert_eq!(table.current_item(), None);
    assert!(!table.is_grabbed());
    Ok(())
}

#[test]
fn destroy_during_drag_feedback() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind(BindTag::Item(2), "<Enter>", "destroy", false)?;
    run(
        &mut table,
        &mut grid,
        &[motion(5, 5), press(5, 5), drag(15, 5), release(15, 5)],
    );
    assert_eq!(
        grid.trace(),
        ["Enter(1)", "ButtonPress(1)", "vLeave(1)", "vEnter(2)"]
    );
    assert!(table.is_destroyed());
    assert_eq!(table.current_item(), None);
    Ok(())
}

#[test]
fn motion_goes_to_grabbed_item() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind("all", "<B1-Motion>", "", false)?;
    run(&mut table, &mut grid, &[motion(5, 5), press(5, 5), drag(15, 5)]);
    assert_eq!(
        grid.trace(),
        [
            "Enter(1)",
            "ButtonPress(1)",
            "vLeave(1)",
            "vEnter(2)",
            "Motion(1)",
        ]
    );
    Ok(())
}

#[test]
fn press_picks_before_dispatch() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    // The press arrives without a preceding motion.
    table.handle_event(&mut grid, &press(15, 5));
    assert_eq!(grid.trace(), ["Enter(2)", "ButtonPress(2)"]);
    assert_eq!(table.state(), State::BUTTON1);
    Ok(())
}

#[test]
fn delete_current_in_own_leave() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind(BindTag::Item(1), "<Leave>", "delete 1", false)?;
    run(&mut table, &mut grid, &[motion(5, 5), motion(15, 5)]);

    // The item tag deleted the item, so the "all" Leave never ran.
    assert_eq!(grid.trace(), ["Enter(1)", "Leave(1)", "Enter(2)"]);
    assert!(!grid.contains(1));
    assert_eq!(table.current_item(), Some(2));
    assert!(table.sequences(BindTag::Item(1)).is_empty());
    Ok(())
}

#[test]
fn delete_pick_in_leave() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind(BindTag::Item(1), "<Leave>", "delete 2", false)?;
    run(&mut table, &mut grid, &[motion(5, 5), motion(15, 5)]);
    assert_eq!(grid.trace(), ["Enter(1)", "Leave(1)", "Leave(1)"]);
    assert_eq!(table.current_item(), None);

    table.repick(&mut grid);
    assert_eq!(table.current_item(), None);
    assert_eq!(grid.trace().len(), 3);
    Ok(())
}

#[test]
fn leave_on_window_exit_deletes_current() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind(BindTag::Item(1), "<Leave>", "delete 1", false)?;
    run(
        &mut table,
        &mut grid,
        &[
            motion(5, 5),
            Event::leave((5, 5), State::empty(), Detail::Ancestor),
        ],
    );
    assert_eq!(grid.trace(), ["Enter(1)", "Leave(1)"]);
    assert_eq!(table.current_item(), None);
    Ok(())
}

#[test]
fn repick_after_delete() -> Result<()> {
    let mut grid = Grid::new();
    grid.add(3, Rect::new(0, 0, 10, 10))
        .add(1, Rect::new(0, 0, 10, 10));
    let mut table: BindingTable<ItemId, Zone> = BindingTable::new(WindowId(1));
    table.bind("all", "<Enter>", "", false)?;
    table.bind("all", "<Leave>", "", false)?;

    table.handle_event(&mut grid, &motion(5, 5));
    assert_eq!(table.current_item(), Some(1));

    table.forget_item(1);
    grid.remove(1);
    assert_eq!(table.current_item(), None);
    table.repick(&mut grid);
    assert_eq!(grid.trace(), ["Enter(1)", "Enter(3)"]);
    assert_eq!(table.current_item(), Some(3));
    Ok(())
}

#[test]
fn repick_without_pointer_is_noop() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.repick(&mut grid);
    assert!(grid.trace().is_empty());
    assert_eq!(table.last_event(), None);
    Ok(())
}

#[test]
fn nested_repick_in_leave_is_ignored() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind(BindTag::Item(1), "<Leave>", "repick", false)?;
    run(&mut table, &mut grid, &[motion(5, 5), motion(15, 5)]);
    assert_eq!(
        grid.trace(),
        ["Enter(1)", "Leave(1)", "Leave(1)", "Enter(2)"]
    );

    // The guard was released: later transitions still happen.
    table.handle_event(&mut grid, &motion(5, 5));
    assert_eq!(grid.trace()[4..], ["Leave(2)", "Enter(1)"]);
    Ok(())
}

#[test]
fn repick_in_enter_is_idempotent() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind(BindTag::Item(2), "<Enter>", "repick", false)?;
    run(&mut table, &mut grid, &[motion(15, 5)]);
    assert_eq!(grid.trace(), ["Enter(2)", "Enter(2)"]);
    Ok(())
}

#[test]
fn item_tag_runs_before_group_tag() -> Result<()> {
    let mut grid = Grid::new();
    grid.add_tagged(1, Rect::new(0, 0, 10, 10), &["node"]);
    let mut table: BindingTable<ItemId, Zone> = BindingTable::new(WindowId(1));
    table.bind("node", "<Enter>", "group", false)?;
    table.bind(BindTag::Item(1), "<Enter>", "item", false)?;
    table.handle_event(&mut grid, &motion(5, 5));
    assert_eq!(grid.commands(), ["item", "group"]);

    table.bind(BindTag::Item(1), "<Leave>", "item\nbreak", false)?;
    table.bind("node", "<Leave>", "group", false)?;
    table.handle_event(&mut grid, &motion(50, 5));
    assert_eq!(grid.commands(), ["item", "group", "item\nbreak"]);
    Ok(())
}

#[test]
fn destroy_from_command() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind(BindTag::Item(1), "<Enter>", "destroy", false)?;
    run(&mut table, &mut grid, &[motion(5, 5), motion(15, 5)]);
    assert_eq!(grid.commands(), ["destroy"]);
    assert!(table.is_destroyed());
    assert_eq!(table.window(), None);
    assert_eq!(table.current_item(), None);
    assert_eq!(table.bind("all", "<Enter>", "x", false), Err(Error::Destroyed));
    Ok(())
}

#[test]
fn failures_do_not_stop_dispatch() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind(BindTag::Item(1), "<Enter>", "fail boom", false)?;
    table.handle_event(&mut grid, &motion(5, 5));
    assert_eq!(grid.trace(), ["Enter(1)", "Enter(1)"]);
    assert_eq!(grid.errors(), ["command failed: boom"]);
    Ok(())
}

#[test]
fn keys_go_to_focus() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind("all", "<KeyPress>", "key %K", false)?;
    table.handle_event(&mut grid, &motion(5, 5));

    table.handle_event(&mut grid, &Event::key_press('a', State::empty()));
    assert_eq!(grid.trace(), ["Enter(1)"]);

    table.set_focus(Some(Pick::new(2, Zone::Body)));
    table.handle_event(&mut grid, &Event::key_press('a', State::SHIFT));
    assert_eq!(grid.trace(), ["Enter(1)", "KeyPress(2)"]);
    assert_eq!(grid.commands()[1], "key a");
    assert_eq!(table.state(), State::SHIFT);
    assert_eq!(table.focus_item(), Some(2));

    table.forget_item(2);
    assert_eq!(table.focus(), None);
    Ok(())
}

#[test]
fn focus_from_command() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind(BindTag::Item(1), "<ButtonPress>", "focus 1", false)?;
    run(&mut table, &mut grid, &[motion(5, 5), press(5, 5)]);
    assert_eq!(table.focus(), Some(Pick::new(1, Zone::Body)));
    Ok(())
}

#[test]
fn virtual_events_go_to_current() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind("all", "<<Open>>", "open %x", false)?;
    table.handle_event(&mut grid, &Event::virtual_event("Open", (1, 1), State::empty()));
    assert!(grid.commands().is_empty());

    table.handle_event(&mut grid, &motion(5, 5));
    table.handle_event(&mut grid, &Event::virtual_event("Open", (7, 7), State::empty()));
    assert_eq!(grid.trace(), ["Enter(1)", "VirtualEvent(1)"]);
    assert_eq!(grid.commands()[1], "open 7");
    Ok(())
}

#[test]
fn substitution_in_commands() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.bind("all", "<1>", "click %b at %x,%y", false)?;
    table.bind("all", "<Enter>", "enter %d", false)?;
    run(&mut table, &mut grid, &[press(3, 4)]);
    assert_eq!(grid.commands(), ["enter NotifyAncestor", "click 1 at 3,4"]);
    Ok(())
}

#[test]
fn window_filtering() -> Result<()> {
    let (mut table, mut grid) = setup()?;
    table.handle_window_event(&mut grid, WindowId(2), &motion(5, 5));
    assert!(grid.trace().is_empty());

    table.move_to_window(WindowId(2));
    assert_eq!(table.window(), Some(WindowId(2)));
    table.handle_window_event(&mut grid, WindowId(2), &motion(5, 5));
    assert_eq!(grid.trace(), ["Enter(1)"]);
    Ok(())
}

#[test]
fn configure_forms() -> Result<()> {
    let mut table: BindingTable<ItemId, Zone> = BindingTable::new(WindowId(1));
    assert_eq!(
        table.configure("node", &["<Enter>", "a"])?,
        Configured::Bound(EventMask::ENTER_WINDOW)
    );
    assert_eq!(
        table.configure("node", &["<Enter>", "+b"])?,
        Configured::Bound(EventMask::ENTER_WINDOW)
    );
    assert_eq!(
        table.configure("node", &["<Enter>"])?,
        Configured::Command("a\nb".into())
    );
    table.configure("node", &["<1>", "c"])?;
    assert_eq!(
        table.configure("node", &[])?,
        Configured::Sequences(vec!["<Enter>".into(), "<ButtonPress-1>".into()])
    );

    assert_eq!(table.configure("node", &["<Enter>", ""])?, Configured::Removed);
    assert_eq!(table.configure("node", &["<Enter>", ""])?, Configured::Removed);
    assert!(matches!(
        table.configure("node", &["<Enter>"]),
        Err(Error::NoBinding { .. })
    ));
    assert!(matches!(
        table.configure("node", &["<Enter>", "a", "b"]),
        Err(Error::Usage(_))
    ));
    Ok(())
}

#[test]
fn illegal_event_is_rejected() -> Result<()> {
    let mut table: BindingTable<ItemId, Zone> = BindingTable::new(WindowId(1));
    table.configure("node", &["<Enter>", "a"])?;
    let before = table.sequences("node");

    let err = table.configure("node", &["<Expose>", "cmd"]);
    assert_eq!(err, Err(Error::IllegalEvent("Expose".into())));
    let msg = Error::IllegalEvent("Expose".into()).to_string();
    assert!(msg.contains("Expose"));
    assert_eq!(table.sequences("node"), before);
    assert!(table.sequences("other").is_empty());
    Ok(())
}

/// Pointer positions across both items, their edges and empty space.
fn position() -> impl Strategy<Value = (i32, i32)> {
    (0i32..30, 0i32..12)
}

proptest! {
    #[test]
    fn crossings_alternate(path in prop::collection::vec(position(), 1..40)) {
        let (mut table, mut grid) = setup().unwrap();
        for (x, y) in &path {
            table.handle_event(&mut grid, &motion(*x, *y));
        }

        // Without buttons, Enter and Leave strictly alternate and each Leave
        // names the item last entered.
        let mut inside: Option<&str> = None;
        for label in grid.trace() {
            let (kind, item) = label.split_once('(').unwrap();
            inside = match (kind, inside) {
                ("Enter", None) => Some(item),
                ("Leave", Some(i)) if i == item => None,
                _ => {
                    return Err(TestCaseError::fail(format!(
                        "unexpected {label} in {:?}",
                        grid.trace()
                    )));
                }
            };
        }

        let (x, y) = *path.last().unwrap();
        let expected = grid.hit_test(Point::new(x, y)).map(|p| p.item);
        prop_assert_eq!(table.current_item(), expected);
    }

    #[test]
    fn repeated_event_is_noop(path in prop::collection::vec(position(), 1..20)) {
        let (mut table, mut grid) = setup().unwrap();
        for (x, y) in &path {
            table.handle_event(&mut grid, &motion(*x, *y));
            let seen = grid.trace().len();
            table.handle_event(&mut grid, &motion(*x, *y));
            prop_assert_eq!(grid.trace().len(), seen);
            table.repick(&mut grid);
            prop_assert_eq!(grid.trace().len(), seen);
        }
    }
}
