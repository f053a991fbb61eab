//! The per-widget binding table: bindings, pointer tracking and dispatch.
use std::{cell::Cell, fmt::Debug, hash::Hash, rc::Rc};

use bitflags::bitflags;
use tracing::{trace, warn};

use crate::{
    adapter::{Adapter, Pick},
    error::{Error, Result},
    event::{Event, EventKind, State},
    preserve::Preserver,
    registry::{BindTag, Registry},
    sequence::EventMask,
};

/// Command dispatch to an item's tags.
mod dispatch;
/// The pick state machine.
mod pick;
#[cfg(test)]
mod tests;

use dispatch::dispatch;
use pick::pick_current;

bitflags! {
    /// Pick state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct Flags: u8 {
        /// A Leave is being dispatched by the pick machinery; nested picks
        /// only record their event.
        const REPICK_IN_PROGRESS = 1;
        /// A button is held and the pointer has left the item it was pressed
        /// on. The current item stays put until the button is released.
        const LEFT_GRABBED_ITEM = 1 << 1;
    }
}

/// Identifies the native window delivering events to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// Result of [`BindingTable::configure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Configured {
    /// Every sequence bound on the tag.
    Sequences(Vec<String>),
    /// The command bound to a sequence.
    Command(String),
    /// A binding was installed; the event classes it matches.
    Bound(EventMask),
    /// A binding was removed, or there was nothing to remove.
    Removed,
}

/// Bindings and pointer state for the items of one widget.
///
/// Items are owned by the widget and referred to by value. The widget must
/// call [`BindingTable::forget_item`] before an item goes away.
#[derive(Debug)]
pub struct BindingTable<I, C> {
    /// Bindings per tag.
    registry: Registry<I>,
    /// Pick flags, shared with scope guards during dispatch.
    flags: Rc<Cell<Flags>>,
    /// Item the pointer is in, as far as bindings have been told.
    current: Option<Pick<I, C>>,
    /// Item most recently reported entered. Differs from `current` only while
    /// a grab is pending.
    new: Option<Pick<I, C>>,
    /// Item receiving keyboard events.
    focus: Option<Pick<I, C>>,
    /// Last pointer event, in the form replayed by re-picks.
    last_event: Option<Event>,
    /// Last known modifier and button state.
    state: State,
    /// Window delivering events.
    window: Option<WindowId>,
    /// Set once the table has been torn down.
    destroyed: bool,
    /// Items protected across dispatch.
    preserver: Preserver<I>,
}

impl<I, C> BindingTable<I, C>
where
    I: Copy + Eq + Hash + Debug,
    C: Copy + Eq + Debug,
{
    /// Create a table receiving events from a window.
    pub fn new(window: WindowId) -> Self {
        Self {
            registry: Registry::new(),
            flags: Rc::new(Cell::new(Flags::empty())),
            current: None,
            new: None,
            focus: None,
            last_event: None,
            state: State::empty(),
            window: Some(window),
            destroyed: false,
            preserver: Preserver::default(),
        }
    }

    /// Fail if the table has been torn down.
    fn live(&self) -> Result<()> {
        if self.destroyed {
            warn!("binding request on a destroyed table");
            return Err(Error::Destroyed);
        }
        Ok(())
    }

    /// Is a flag raised?
    fn has(&self, f: Flags) -> bool {
        self.flags.get().contains(f)
    }

    /// Raise a flag.
    fn raise(&self, f: Flags) {
        self.flags.set(self.flags.get() | f);
    }

    /// Lower a flag.
    fn lower(&self, f: Flags) {
        self.flags.set(self.flags.get() - f);
    }

    /// Bind a command to a sequence on a tag. With `append`, the command is
    /// added to an existing one on a new line.
    pub fn bind(
        &mut self,
        tag: impl Into<BindTag<I>>,
        sequence: &str,
        command: &str,
        append: bool,
    ) -> Result<EventMask> {
        self.live()?;
        self.registry.bind(tag.into(), sequence, command, append)
    }

    /// Remove a binding. Fails if the sequence is not bound on the tag.
    pub fn unbind(&mut self, tag: impl Into<BindTag<I>>, sequence: &str) -> Result<()> {
        self.live()?;
        self.registry.unbind(&tag.into(), sequence)
    }

    /// The command bound to a sequence on a tag.
    pub fn binding(&self, tag: impl Into<BindTag<I>>, sequence: &str) -> Result<Option<&str>> {
        self.registry.binding(&tag.into(), sequence)
    }

    /// Every sequence bound on a tag, in canonical form.
    pub fn sequences(&self, tag: impl Into<BindTag<I>>) -> Vec<String> {
        self.registry.sequences(&tag.into())
    }

    /// Remove every binding on a tag.
    pub fn delete_bindings(&mut self, tag: impl Into<BindTag<I>>) {
        self.registry.delete_all(&tag.into());
    }

    /// Query or change bindings with a single argument list, the way a
    /// widget's `bind` operation does:
    ///
    /// - no arguments lists the bound sequences,
    /// - a sequence alone returns its command,
    /// - a sequence and an empty command removes the binding,
    /// - a sequence and a command installs it, appending if the command
    ///   starts with `+`.
    pub fn configure(&mut self, tag: impl Into<BindTag<I>>, args: &[&str]) -> Result<Configured> {
        let tag = tag.into();
        match args {
            [] => Ok(Configured::Sequences(self.registry.sequences(&tag))),
            [seq] => match self.registry.binding(&tag, seq)? {
                Some(cmd) => Ok(Configured::Command(cmd.to_string())),
                None => Err(Error::NoBinding {
                    tag: tag.to_string(),
                    sequence: (*seq).to_string(),
                }),
            },
            [seq, ""] => {
                self.live()?;
                match self.registry.unbind(&tag, seq) {
                    Ok(()) | Err(Error::NoBinding { .. }) => Ok(Configured::Removed),
                    Err(e) => Err(e),
                }
            }
            [seq, cmd] => {
                let (cmd, append) = match cmd.strip_prefix('+') {
                    Some(rest) => (rest, true),
                    None => (*cmd, false),
                };
                self.bind(tag, seq, cmd, append).map(Configured::Bound)
            }
            _ => Err(Error::Usage(format!(
                "expected at most a sequence and a command, got {} arguments",
                args.len()
            ))),
        }
    }

    /// Tear the table down. Events are ignored from now on and every binding
    /// is dropped. Safe to call from inside a bound command.
    pub fn destroy(&mut self) {
        trace!("destroying binding table for {:?}", self.window);
        self.destroyed = true;
        self.window = None;
        self.registry.clear();
        self.current = None;
        self.new = None;
        self.focus = None;
        self.last_event = None;
    }

    /// Has the table been torn down?
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The window delivering events, if the table is live.
    pub fn window(&self) -> Option<WindowId> {
        self.window
    }

    /// Receive events from a different window.
    pub fn move_to_window(&mut self, window: WindowId) {
        if self.destroyed {
            return;
        }
        self.window = Some(window);
    }

    /// Drop every reference to an item, along with its own bindings. Must be
    /// called before the widget frees the item.
    pub fn forget_item(&mut self, item: I) {
        let names = |p: &Option<Pick<I, C>>| p.is_some_and(|p| p.item == item);
        if names(&self.current) {
            self.current = None;
        }
        if names(&self.new) {
            self.new = None;
        }
        if names(&self.focus) {
            self.focus = None;
        }
        self.preserver.release(&item);
        self.registry.delete_all(&BindTag::Item(item));
    }

    /// Direct keyboard events to a pick, or to nothing.
    pub fn set_focus(&mut self, pick: Option<Pick<I, C>>) {
        self.focus = pick;
    }

    /// The pick receiving keyboard events.
    pub fn focus(&self) -> Option<Pick<I, C>> {
        self.focus
    }

    /// The item receiving keyboard events.
    pub fn focus_item(&self) -> Option<I> {
        self.focus.map(|p| p.item)
    }

    /// The pick the pointer is in.
    pub fn current(&self) -> Option<Pick<I, C>> {
        self.current
    }

    /// The item the pointer is in.
    pub fn current_item(&self) -> Option<I> {
        self.current.map(|p| p.item)
    }

    /// The hit region of the item the pointer is in.
    pub fn current_context(&self) -> Option<C> {
        self.current.map(|p| p.context)
    }

    /// Last known modifier and button state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Is the pointer held away from the item a button was pressed on?
    pub fn is_grabbed(&self) -> bool {
        self.has(Flags::LEFT_GRABBED_ITEM)
    }

    /// The stored pointer event used by re-picks.
    pub fn last_event(&self) -> Option<&Event> {
        self.last_event.as_ref()
    }

    /// Handle an event delivered by a window. Events from any window other
    /// than the table's own are dropped.
    pub fn handle_window_event<A>(&mut self, adapter: &mut A, window: WindowId, event: &Event)
    where
        A: Adapter<Item = I, Context = C>,
    {
        if self.window != Some(window) {
            trace!("dropping event from {window:?}");
            return;
        }
        self.handle_event(adapter, event);
    }

    /// Route an event. Keyboard events go to the focus item; pointer events
    /// update the pick and go to the current item.
    pub fn handle_event<A>(&mut self, adapter: &mut A, event: &Event)
    where
        A: Adapter<Item = I, Context = C>,
    {
        if self.destroyed {
            return;
        }
        match &event.kind {
            EventKind::KeyPress(_) | EventKind::KeyRelease(_) => self.on_key_event(adapter, event),
            EventKind::ButtonPress(_) | EventKind::ButtonRelease(_) => {
                self.on_button_event(adapter, event);
            }
            EventKind::Motion => {
                self.state = event.state;
                pick_current(self, adapter, Some(event));
                let target = self.current;
                dispatch(self, adapter, event, target);
            }
            EventKind::Enter(_) | EventKind::Leave(_) => self.on_pointer_event(adapter, event),
            EventKind::Virtual(_) => {
                let target = self.current;
                dispatch(self, adapter, event, target);
            }
        }
    }

    /// Dispatch a key event to the focus item. Keyboard input never picks.
    pub fn on_key_event<A>(&mut self, adapter: &mut A, event: &Event)
    where
        A: Adapter<Item = I, Context = C>,
    {
        self.state = event.state;
        let target = self.focus;
        dispatch(self, adapter, event, target);
    }

    /// Update the pick from a pointer event without dispatching the event
    /// itself.
    pub fn on_pointer_event<A>(&mut self, adapter: &mut A, event: &Event)
    where
        A: Adapter<Item = I, Context = C>,
    {
        self.state = match event.kind {
            EventKind::ButtonRelease(b) => event.state - b.mask(),
            _ => event.state,
        };
        pick_current(self, adapter, Some(event));
    }

    /// Handle a button event. A press picks first and then dispatches; a
    /// release dispatches while the button is still held and picks
    /// afterwards. The release goes to the item last entered during the drag,
    /// or to the pressed item if the drag ended outside every item. A press
    /// outside every item delivers no release.
    pub fn on_button_event<A>(&mut self, adapter: &mut A, event: &Event)
    where
        A: Adapter<Item = I, Context = C>,
    {
        match event.kind {
            EventKind::ButtonPress(b) => {
                self.state = event.state;
                pick_current(self, adapter, Some(event));
                self.state |= b.mask();
                let target = self.current;
                dispatch(self, adapter, event, target);
            }
            EventKind::ButtonRelease(b) => {
                self.state = event.state;
                // Only the pressed item, or the item a drag from it ended on,
                // sees the release.
                let target = self.current.and(self.new.or(self.current));
                dispatch(self, adapter, event, target);
                self.state -= b.mask();
                pick_current(self, adapter, Some(event));
            }
            _ => self.on_pointer_event(adapter, event),
        }
    }

    /// Pick again using the stored pointer event. Widgets call this after
    /// anything that may change what lies under the pointer: scrolling,
    /// inserting or deleting items.
    pub fn repick<A>(&mut self, adapter: &mut A)
    where
        A: Adapter<Item = I, Context = C>,
    {
        if self.destroyed || self.last_event.is_none() {
            return;
        }
        pick_current(self, adapter, None);
    }

    /// Dispatch an event to a pick through its tags, bypassing the pick
    /// machinery.
    pub fn dispatch_to<A>(&mut self, adapter: &mut A, event: &Event, pick: Pick<I, C>)
    where
        A: Adapter<Item = I, Context = C>,
    {
        dispatch(self, adapter, event, Some(pick));
    }
}
