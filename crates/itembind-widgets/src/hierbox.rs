//! A hierarchical list box. Entries are laid out one per row, indented by
//! depth, with an expand button on entries that have children. Entry labels
//! and expand buttons have separate binding tables.
use itembind::{
    Adapter, BindTag, Binder, BindingTable, Configured, DefaultBindings, Invocation, Outcome, Pick,
    WindowId,
    event::Event,
    geom::{Point, Rect},
};
use slotmap::{SlotMap, new_key_type};
use tracing::debug;

use crate::error::{Error, Result};

new_key_type! {
    /// Identifier for an entry in a hierarchy.
    pub struct EntryId;
}

/// The part of an entry under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPart {
    /// The entry's row, outside its button.
    Label,
    /// The expand button.
    Button,
}

/// Extra hit area around expand buttons, on every side.
const BUTTON_PAD: u32 = 2;

/// Tags given to new entries.
const DEFAULT_TAGS: &[&str] = &["Entry", "all"];

/// Row geometry, in window units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Height of every row.
    pub row_height: u32,
    /// Horizontal indent per level of depth.
    pub indent: u32,
    /// Width and height of the expand button.
    pub button_size: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            row_height: 20,
            indent: 20,
            button_size: 9,
        }
    }
}

/// A tree entry.
#[derive(Debug, Clone)]
struct Entry {
    /// Display text.
    label: String,
    /// Binding tags, in order.
    tags: Vec<String>,
    /// Parent entry; `None` only for the root.
    parent: Option<EntryId>,
    /// Children, in display order.
    children: Vec<EntryId>,
    /// Are the children shown?
    open: bool,
}

impl Entry {
    /// Construct a closed entry with the default tags.
    fn new(label: &str, parent: Option<EntryId>) -> Self {
        Self {
            label: label.to_string(),
            tags: DEFAULT_TAGS.iter().map(|t| String::from(*t)).collect(),
            parent,
            children: Vec::new(),
            open: false,
        }
    }
}

/// The entries of a hierarchy and their layout.
#[derive(Debug)]
pub struct Tree {
    /// Entry arena.
    entries: SlotMap<EntryId, Entry>,
    /// The root entry.
    root: EntryId,
    /// Row geometry.
    layout: Layout,
    /// Vertical scroll offset.
    scroll: i32,
    /// Highlighted entry.
    active: Option<EntryId>,
    /// Highlighted expand button.
    active_button: Option<EntryId>,
    /// The layout changed since the tables last picked.
    dirty: bool,
}

impl Tree {
    /// Construct a tree holding only an open root.
    pub fn new(root_label: &str, layout: Layout) -> Self {
        let mut entries = SlotMap::with_key();
        let mut root = Entry::new(root_label, None);
        root.open = true;
        let root = entries.insert(root);
        Self {
            entries,
            root,
            layout,
            scroll: 0,
            active: None,
            active_button: None,
            dirty: false,
        }
    }

    /// Look up an entry.
    fn entry(&self, id: EntryId) -> Result<&Entry> {
        self.entries.get(id).ok_or(Error::UnknownEntry)
    }

    /// Look up an entry mutably.
    fn entry_mut(&mut self, id: EntryId) -> Result<&mut Entry> {
        self.entries.get_mut(id).ok_or(Error::UnknownEntry)
    }

    /// The root entry.
    pub fn root(&self) -> EntryId {
        self.root
    }

    /// Number of entries, including the root.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A tree always holds its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Is the entry in the tree?
    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.contains_key(id)
    }

    /// An entry's label.
    pub fn label(&self, id: EntryId) -> Option<&str> {
        self.entries.get(id).map(|e| e.label.as_str())
    }

    /// An entry's binding tags.
    pub fn tags(&self, id: EntryId) -> Option<&[String]> {
        self.entries.get(id).map(|e| e.tags.as_slice())
    }

    /// An entry's parent.
    pub fn parent(&self, id: EntryId) -> Option<EntryId> {
        self.entries.get(id).and_then(|e| e.parent)
    }

    /// An entry's children.
    pub fn children(&self, id: EntryId) -> &[EntryId] {
        self.entries.get(id).map_or(&[], |e| e.children.as_slice())
    }

    /// Are the entry's children shown?
    pub fn is_open(&self, id: EntryId) -> bool {
        self.entries.get(id).is_some_and(|e| e.open)
    }

    /// The highlighted entry.
    pub fn active(&self) -> Option<EntryId> {
        self.active
    }

    /// The highlighted expand button.
    pub fn active_button(&self) -> Option<EntryId> {
        self.active_button
    }

    /// Vertical scroll offset.
    pub fn scroll(&self) -> i32 {
        self.scroll
    }

    /// Add an entry as the last child of `parent`.
    pub fn insert(&mut self, parent: EntryId, label: &str) -> Result<EntryId> {
        self.entry(parent)?;
        let id = self.entries.insert(Entry::new(label, Some(parent)));
        self.entry_mut(parent)?.children.push(id);
        self.dirty = true;
        Ok(id)
    }

    /// Replace an entry's binding tags.
    pub fn set_tags(&mut self, id: EntryId, tags: &[&str]) -> Result<()> {
        self.entry_mut(id)?.tags = tags.iter().map(|t| String::from(*t)).collect();
        Ok(())
    }

    /// Show or hide an entry's children.
    pub fn set_open(&mut self, id: EntryId, open: bool) -> Result<()> {
        let e = self.entry_mut(id)?;
        if e.open != open {
            e.open = open;
            self.dirty = true;
        }
        Ok(())
    }

    /// Flip an entry between open and closed, returning the new state.
    pub fn toggle(&mut self, id: EntryId) -> Result<bool> {
        let open = !self.entry(id)?.open;
        self.set_open(id, open)?;
        Ok(open)
    }

    /// Set the vertical scroll offset.
    pub fn set_scroll(&mut self, offset: i32) {
        if self.scroll != offset {
            self.scroll = offset;
            self.dirty = true;
        }
    }

    /// The visible entries in display order, with their depth.
    pub fn rows(&self) -> Vec<(EntryId, u32)> {
        let mut rows = Vec::new();
        let mut stack = vec![(self.root, 0)];
        while let Some((id, depth)) = stack.pop() {
            let Some(e) = self.entries.get(id) else {
                continue;
            };
            rows.push((id, depth));
            if e.open {
                stack.extend(e.children.iter().rev().map(|c| (*c, depth + 1)));
            }
        }
        rows
    }

    /// The entry whose row contains a point, with its depth and the row's top
    /// edge.
    fn row_at(&self, p: Point) -> Option<(EntryId, u32, i32)> {
        let height = i64::from(self.layout.row_height);
        let y = i64::from(p.y) + i64::from(self.scroll);
        if height == 0 || y < 0 {
            return None;
        }
        let idx = usize::try_from(y / height).ok()?;
        let (id, depth) = *self.rows().get(idx)?;
        let top = i32::try_from(y / height * height - i64::from(self.scroll)).ok()?;
        Some((id, depth, top))
    }

    /// The hit area of an entry's expand button, if it has one.
    fn button_area(&self, id: EntryId, depth: u32, top: i32) -> Option<Rect> {
        if self.children(id).is_empty() {
            return None;
        }
        let l = &self.layout;
        let x = depth
            .saturating_mul(l.indent)
            .saturating_add(l.indent.saturating_sub(l.button_size) / 2);
        let dy = l.row_height.saturating_sub(l.button_size) / 2;
        let x = i32::try_from(x).ok()?;
        let y = top.saturating_add(i32::try_from(dy).ok()?);
        Some(Rect::new(x, y, l.button_size, l.button_size).pad(BUTTON_PAD))
    }

    /// The entry whose row is under a point, unless the point is on the
    /// entry's expand button.
    pub fn pick_entry(&self, p: Point) -> Option<EntryId> {
        let (id, depth, top) = self.row_at(p)?;
        match self.button_area(id, depth, top) {
            Some(b) if b.contains_point(p) => None,
            _ => Some(id),
        }
    }

    /// The entry whose expand button is under a point.
    pub fn pick_button(&self, p: Point) -> Option<EntryId> {
        let (id, depth, top) = self.row_at(p)?;
        self.button_area(id, depth, top)
            .filter(|b| b.contains_point(p))
            .map(|_| id)
    }

    /// An entry and all of its descendants, parents first.
    pub fn subtree(&self, id: EntryId) -> Vec<EntryId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(e) = self.entries.get(id) {
                out.push(id);
                stack.extend(e.children.iter().rev());
            }
        }
        out
    }

    /// Free an entry and its descendants. Bindings must already have
    /// forgotten them.
    fn remove_subtree(&mut self, id: EntryId, doomed: &[EntryId]) {
        let parent = self.parent(id);
        if let Some(p) = parent.and_then(|p| self.entries.get_mut(p)) {
            p.children.retain(|c| *c != id);
        }
        for d in doomed {
            self.entries.remove(*d);
        }
        if self.active.is_some_and(|a| doomed.contains(&a)) {
            self.active = parent;
        }
        if self.active_button.is_some_and(|a| doomed.contains(&a)) {
            self.active_button = None;
        }
        self.dirty = true;
    }

    /// Binding tags for an entry: its own identity, then its tags.
    fn bind_tags(&self, id: EntryId) -> Vec<BindTag<EntryId>> {
        let mut tags = vec![BindTag::Item(id)];
        if let Some(e) = self.entries.get(id) {
            tags.extend(e.tags.iter().map(|t| BindTag::from(t.as_str())));
        }
        tags
    }
}

/// Delete an entry and its descendants, forgetting them in both binding
/// tables before they are freed.
fn delete_entry(
    tree: &mut Tree,
    a: &mut BindingTable<EntryId, EntryPart>,
    b: &mut BindingTable<EntryId, EntryPart>,
    id: EntryId,
) -> Result<()> {
    if id == tree.root {
        return Err(Error::RootEntry);
    }
    tree.entry(id)?;
    let doomed = tree.subtree(id);
    debug!("deleting {} entries", doomed.len());
    for d in &doomed {
        a.forget_item(*d);
        b.forget_item(*d);
    }
    tree.remove_subtree(id, &doomed);
    Ok(())
}

/// Runs the commands bound in a hierarchy box.
pub type HierboxHandler =
    Box<dyn FnMut(&mut HierboxCtx<'_>, &Invocation<EntryId, EntryPart>) -> itembind::Result<Outcome>>;

/// What a bound command can reach while it runs.
pub struct HierboxCtx<'a> {
    /// The entries.
    tree: &'a mut Tree,
    /// Table dispatching the command.
    table: &'a mut BindingTable<EntryId, EntryPart>,
    /// The other table.
    other: &'a mut BindingTable<EntryId, EntryPart>,
    /// Which table is dispatching.
    part: EntryPart,
}

impl HierboxCtx<'_> {
    /// The entries.
    pub fn tree(&self) -> &Tree {
        self.tree
    }

    /// Which table is dispatching.
    pub fn part(&self) -> EntryPart {
        self.part
    }

    /// The table dispatching the command.
    pub fn table(&self) -> &BindingTable<EntryId, EntryPart> {
        self.table
    }

    /// Delete an entry and its descendants.
    pub fn delete(&mut self, id: EntryId) -> Result<()> {
        delete_entry(self.tree, self.table, self.other, id)
    }

    /// Open or close an entry.
    pub fn toggle(&mut self, id: EntryId) -> Result<bool> {
        self.tree.toggle(id)
    }

    /// Move keyboard focus to an entry label.
    pub fn focus(&mut self, id: Option<EntryId>) {
        let pick = id.map(|id| Pick::new(id, EntryPart::Label));
        match self.part {
            EntryPart::Label => self.table.set_focus(pick),
            EntryPart::Button => self.other.set_focus(pick),
        }
    }

    /// Highlight an entry, or its button when the button table is
    /// dispatching.
    pub fn activate(&mut self, id: Option<EntryId>) {
        match self.part {
            EntryPart::Label => self.tree.active = id,
            EntryPart::Button => self.tree.active_button = id,
        }
    }

    /// Run one of the commands installed by the default bindings:
    /// `activate`, `deactivate` or `toggle`. Returns false for any other
    /// command.
    pub fn builtin(&mut self, inv: &Invocation<EntryId, EntryPart>) -> Result<bool> {
        let id = inv.target.item;
        match inv.command.as_str() {
            "activate" => self.activate(Some(id)),
            "deactivate" => self.activate(None),
            "toggle" => {
                self.toggle(id)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Adapter for one of the two tables of a hierarchy box.
struct EntryAdapter<'a> {
    /// The entries.
    tree: &'a mut Tree,
    /// The table not being driven.
    other: &'a mut BindingTable<EntryId, EntryPart>,
    /// Which table is being driven.
    part: EntryPart,
    /// Command runner.
    handler: &'a mut HierboxHandler,
}

impl Adapter for EntryAdapter<'_> {
    type Item = EntryId;
    type Context = EntryPart;

    fn hit_test(&mut self, location: Point) -> Option<Pick<EntryId, EntryPart>> {
        let id = match self.part {
            EntryPart::Label => self.tree.pick_entry(location),
            EntryPart::Button => self.tree.pick_button(location),
        };
        id.map(|id| Pick::new(id, self.part))
    }

    fn tags(&self, pick: &Pick<EntryId, EntryPart>) -> Vec<BindTag<EntryId>> {
        self.tree.bind_tags(pick.item)
    }

    fn invoke(
        &mut self,
        table: &mut BindingTable<EntryId, EntryPart>,
        invocation: &Invocation<EntryId, EntryPart>,
    ) -> itembind::Result<Outcome> {
        let mut ctx = HierboxCtx {
            tree: &mut *self.tree,
            table,
            other: &mut *self.other,
            part: self.part,
        };
        (self.handler)(&mut ctx, invocation)
    }
}

/// Class bindings for entry labels: highlight on entry.
pub struct EntryBindings;

impl DefaultBindings<EntryId, EntryPart> for EntryBindings {
    fn defaults(
        b: Binder<'_, EntryId, EntryPart>,
    ) -> itembind::Result<Binder<'_, EntryId, EntryPart>> {
        b.with_tag("Entry")
            .bind("<Enter>", "activate")?
            .bind("<Leave>", "deactivate")
    }
}

/// Class bindings for expand buttons: highlight on entry, toggle on
/// release.
pub struct ButtonBindings;

impl DefaultBindings<EntryId, EntryPart> for ButtonBindings {
    fn defaults(
        b: Binder<'_, EntryId, EntryPart>,
    ) -> itembind::Result<Binder<'_, EntryId, EntryPart>> {
        b.with_tag("all")
            .bind("<Enter>", "activate")?
            .bind("<Leave>", "deactivate")?
            .bind("<ButtonRelease-1>", "toggle")
    }
}

/// A hierarchical list box.
pub struct Hierbox {
    /// The entries.
    tree: Tree,
    /// Bindings on entry rows.
    entries: BindingTable<EntryId, EntryPart>,
    /// Bindings on expand buttons.
    buttons: BindingTable<EntryId, EntryPart>,
    /// Command runner.
    handler: HierboxHandler,
}

impl Hierbox {
    /// Construct a hierarchy box holding only its root.
    pub fn new(window: WindowId, root_label: &str, handler: HierboxHandler) -> Self {
        Self {
            tree: Tree::new(root_label, Layout::default()),
            entries: BindingTable::new(window),
            buttons: BindingTable::new(window),
            handler,
        }
    }

    /// Install the class bindings for entries and buttons.
    pub fn install_defaults(&mut self) -> Result<()> {
        Binder::new(&mut self.entries).defaults::<EntryBindings>()?;
        Binder::new(&mut self.buttons).defaults::<ButtonBindings>()?;
        Ok(())
    }

    /// The entries.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Bindings on entry rows.
    pub fn entries(&self) -> &BindingTable<EntryId, EntryPart> {
        &self.entries
    }

    /// Bindings on expand buttons.
    pub fn buttons(&self) -> &BindingTable<EntryId, EntryPart> {
        &self.buttons
    }

    /// Add an entry as the last child of `parent`.
    pub fn insert(&mut self, parent: EntryId, label: &str) -> Result<EntryId> {
        let id = self.tree.insert(parent, label)?;
        self.settle();
        Ok(id)
    }

    /// Replace an entry's binding tags.
    pub fn set_tags(&mut self, id: EntryId, tags: &[&str]) -> Result<()> {
        self.tree.set_tags(id, tags)
    }

    /// Show an entry's children.
    pub fn open(&mut self, id: EntryId) -> Result<()> {
        self.tree.set_open(id, true)?;
        self.settle();
        Ok(())
    }

    /// Hide an entry's children.
    pub fn close(&mut self, id: EntryId) -> Result<()> {
        self.tree.set_open(id, false)?;
        self.settle();
        Ok(())
    }

    /// Delete an entry and its descendants.
    pub fn delete(&mut self, id: EntryId) -> Result<()> {
        delete_entry(&mut self.tree, &mut self.entries, &mut self.buttons, id)?;
        self.settle();
        Ok(())
    }

    /// Scroll vertically.
    pub fn scroll_to(&mut self, offset: i32) {
        self.tree.set_scroll(offset);
        self.settle();
    }

    /// Move keyboard focus to an entry label.
    pub fn set_focus(&mut self, id: Option<EntryId>) -> Result<()> {
        if let Some(id) = id {
            self.tree.entry(id)?;
        }
        self.entries
            .set_focus(id.map(|id| Pick::new(id, EntryPart::Label)));
        Ok(())
    }

    /// Query or change entry bindings. See [`BindingTable::configure`].
    pub fn bind(&mut self, tag: BindTag<EntryId>, args: &[&str]) -> Result<Configured> {
        Ok(self.entries.configure(tag, args)?)
    }

    /// Query or change expand button bindings.
    pub fn button_bind(&mut self, tag: BindTag<EntryId>, args: &[&str]) -> Result<Configured> {
        Ok(self.buttons.configure(tag, args)?)
    }

    /// Receive events from a different window.
    pub fn move_to_window(&mut self, window: WindowId) {
        self.entries.move_to_window(window);
        self.buttons.move_to_window(window);
    }

    /// Tear down both binding tables. The tree is kept, but no further
    /// events are dispatched and binding requests fail.
    pub fn destroy(&mut self) {
        self.entries.destroy();
        self.buttons.destroy();
    }

    /// Has the widget been torn down?
    pub fn is_destroyed(&self) -> bool {
        self.entries.is_destroyed() && self.buttons.is_destroyed()
    }

    /// Deliver an event to both tables, entries first.
    pub fn handle_event(&mut self, event: &Event) {
        let Self {
            tree,
            entries,
            buttons,
            handler,
        } = self;
        entries.handle_event(
            &mut EntryAdapter {
                tree: &mut *tree,
                other: &mut *buttons,
                part: EntryPart::Label,
                handler: &mut *handler,
            },
            event,
        );
        buttons.handle_event(
            &mut EntryAdapter {
                tree: &mut *tree,
                other: &mut *entries,
                part: EntryPart::Button,
                handler: &mut *handler,
            },
            event,
        );
        self.settle();
    }

    /// Re-pick both tables.
    pub fn repick(&mut self) {
        let Self {
            tree,
            entries,
            buttons,
            handler,
        } = self;
        tree.dirty = false;
        entries.repick(&mut EntryAdapter {
            tree: &mut *tree,
            other: &mut *buttons,
            part: EntryPart::Label,
            handler: &mut *handler,
        });
        buttons.repick(&mut EntryAdapter {
            tree: &mut *tree,
            other: &mut *entries,
            part: EntryPart::Button,
            handler: &mut *handler,
        });
    }

    /// Re-pick if the layout changed.
    fn settle(&mut self) {
        if self.tree.dirty {
            self.repick();
        }
    }
}
