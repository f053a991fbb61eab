//! A strip of named tabs. Tab labels carry bindings under the tab's name;
//! when tear-off is enabled, the perforation under the selected tab carries
//! bindings under the `Perforation` tag.
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
    /// Identifier for a tab.
    pub struct TabId;
}

/// The part of a tab under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabPart {
    /// The tab's label.
    Label,
    /// The tear-off perforation below the selected tab.
    Perforation,
}

/// Flavours of tab strip. They differ only in defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabsKind {
    /// Tear-off enabled by default.
    Notebook,
    /// Tear-off disabled by default.
    Tabset,
}

/// Height of the perforation hit area.
const PERFORATION_HEIGHT: u32 = 8;

/// Tag under which perforation bindings live.
pub const PERFORATION_TAG: &str = "Perforation";

/// Tags given to new tabs.
const DEFAULT_TAGS: &[&str] = &["all"];

/// Strip geometry, in window units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabStyle {
    /// Height of the strip.
    pub height: u32,
    /// Horizontal padding on each side of a label.
    pub pad: u32,
    /// Width of one label character.
    pub char_width: u32,
}

impl Default for TabStyle {
    fn default() -> Self {
        Self {
            height: 20,
            pad: 4,
            char_width: 7,
        }
    }
}

/// A tab.
#[derive(Debug, Clone)]
struct Tab {
    /// Unique name, also the label text.
    name: String,
    /// Binding tags after the name.
    tags: Vec<String>,
    /// Has the tab been torn off the strip?
    torn: bool,
}

/// The tabs of a strip and their layout.
#[derive(Debug)]
pub struct TabStrip {
    /// Tab arena.
    tabs: SlotMap<TabId, Tab>,
    /// Display order.
    order: Vec<TabId>,
    /// Strip flavour.
    kind: TabsKind,
    /// Geometry.
    style: TabStyle,
    /// Selected tab.
    selected: Option<TabId>,
    /// Is the perforation shown?
    tearoff: bool,
    /// Horizontal scroll offset.
    scroll: i32,
    /// The layout changed since the table last picked.
    dirty: bool,
}

impl TabStrip {
    /// Construct an empty strip.
    pub fn new(kind: TabsKind, style: TabStyle) -> Self {
        Self {
            tabs: SlotMap::with_key(),
            order: Vec::new(),
            kind,
            style,
            selected: None,
            tearoff: kind == TabsKind::Notebook,
            scroll: 0,
            dirty: false,
        }
    }

    /// Look up a tab.
    fn tab(&self, id: TabId) -> Result<&Tab> {
        self.tabs.get(id).ok_or(Error::UnknownTabId)
    }

    /// Strip flavour.
    pub fn kind(&self) -> TabsKind {
        self.kind
    }

    /// Number of tabs.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Does the strip have no tabs?
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tabs in display order.
    pub fn tabs(&self) -> &[TabId] {
        &self.order
    }

    /// Find a tab by name.
    pub fn find(&self, name: &str) -> Result<TabId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.tabs.get(*id).is_some_and(|t| t.name == name))
            .ok_or_else(|| Error::UnknownTab(name.to_string()))
    }

    /// A tab's name.
    pub fn name(&self, id: TabId) -> Option<&str> {
        self.tabs.get(id).map(|t| t.name.as_str())
    }

    /// A tab's binding tags, after its name.
    pub fn tags(&self, id: TabId) -> Option<&[String]> {
        self.tabs.get(id).map(|t| t.tags.as_slice())
    }

    /// The selected tab.
    pub fn selected(&self) -> Option<TabId> {
        self.selected
    }

    /// Is the perforation shown?
    pub fn tearoff(&self) -> bool {
        self.tearoff
    }

    /// Horizontal scroll offset.
    pub fn scroll(&self) -> i32 {
        self.scroll
    }

    /// Append a tab. Names are unique.
    pub fn insert(&mut self, name: &str) -> Result<TabId> {
        if self.find(name).is_ok() {
            return Err(Error::DuplicateTab(name.to_string()));
        }
        let id = self.tabs.insert(Tab {
            name: name.to_string(),
            tags: DEFAULT_TAGS.iter().map(|t| String::from(*t)).collect(),
            torn: false,
        });
        self.order.push(id);
        self.dirty = true;
        Ok(id)
    }

    /// Replace a tab's binding tags.
    pub fn set_tags(&mut self, id: TabId, tags: &[&str]) -> Result<()> {
        self.tabs.get_mut(id).ok_or(Error::UnknownTabId)?.tags =
            tags.iter().map(|t| String::from(*t)).collect();
        Ok(())
    }

    /// Select a tab.
    pub fn select(&mut self, id: Option<TabId>) -> Result<()> {
        if let Some(id) = id {
            self.tab(id)?;
        }
        if self.selected != id {
            self.selected = id;
            self.dirty = true;
        }
        Ok(())
    }

    /// Show or hide the perforation.
    pub fn set_tearoff(&mut self, tearoff: bool) {
        if self.tearoff != tearoff {
            self.tearoff = tearoff;
            self.dirty = true;
        }
    }

    /// Has a tab been torn off?
    pub fn is_torn(&self, id: TabId) -> bool {
        self.tabs.get(id).is_some_and(|t| t.torn)
    }

    /// Tear a tab off the strip, or put it back. A torn tab shows no
    /// perforation.
    pub fn set_torn(&mut self, id: TabId, torn: bool) -> Result<()> {
        let tab = self.tabs.get_mut(id).ok_or(Error::UnknownTabId)?;
        if tab.torn != torn {
            debug!("tab {} torn: {torn}", tab.name);
            tab.torn = torn;
            self.dirty = true;
        }
        Ok(())
    }

    /// Set the horizontal scroll offset.
    pub fn set_scroll(&mut self, offset: i32) {
        if self.scroll != offset {
            self.scroll = offset;
            self.dirty = true;
        }
    }

    /// Width of a tab's label area.
    fn width(&self, tab: &Tab) -> u32 {
        let chars = u32::try_from(tab.name.chars().count()).unwrap_or(u32::MAX);
        chars
            .saturating_mul(self.style.char_width)
            .saturating_add(self.style.pad.saturating_mul(2))
    }

    /// Screen rectangles of all tabs, in display order.
    pub fn rects(&self) -> Vec<(TabId, Rect)> {
        let mut x = -i64::from(self.scroll);
        let mut out = Vec::with_capacity(self.order.len());
        for id in &self.order {
            let Some(tab) = self.tabs.get(*id) else {
                continue;
            };
            let w = self.width(tab);
            if let Ok(left) = i32::try_from(x) {
                out.push((*id, Rect::new(left, 0, w, self.style.height)));
            }
            x += i64::from(w);
        }
        out
    }

    /// The perforation's hit area, if one is shown.
    fn perforation(&self) -> Option<Rect> {
        if !self.tearoff {
            return None;
        }
        let sel = self.selected?;
        if self.is_torn(sel) {
            return None;
        }
        let (_, r) = self.rects().into_iter().find(|(id, _)| *id == sel)?;
        let top = i32::try_from(r.h).ok()?;
        Some(Rect::new(r.tl.x, top, r.w, PERFORATION_HEIGHT))
    }

    /// The tab part at a point. The perforation is checked before labels.
    pub fn pick(&self, p: Point) -> Option<Pick<TabId, TabPart>> {
        if let Some(r) = self.perforation()
            && r.contains_point(p)
            && let Some(sel) = self.selected
        {
            return Some(Pick::new(sel, TabPart::Perforation));
        }
        self.rects()
            .into_iter()
            .find(|(_, r)| r.contains_point(p))
            .map(|(id, _)| Pick::new(id, TabPart::Label))
    }

    /// Remove a tab. Bindings must already have forgotten it.
    fn remove(&mut self, id: TabId) -> Option<Tab> {
        let tab = self.tabs.remove(id)?;
        self.order.retain(|t| *t != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.dirty = true;
        Some(tab)
    }

    /// Binding tags for a tab part. A label is bound under its name followed
    /// by its tags. The perforation is bound only under
    /// [`PERFORATION_TAG`].
    fn bind_tags(&self, pick: &Pick<TabId, TabPart>) -> Vec<BindTag<TabId>> {
        match pick.context {
            TabPart::Perforation => vec![BindTag::from(PERFORATION_TAG)],
            TabPart::Label => self.tabs.get(pick.item).map_or_else(Vec::new, |t| {
                let mut tags = vec![BindTag::from(t.name.as_str())];
                tags.extend(t.tags.iter().map(|s| BindTag::from(s.as_str())));
                tags
            }),
        }
    }
}

/// Delete a tab, forgetting it in the binding table before it is freed.
fn delete_tab(
    strip: &mut TabStrip,
    table: &mut BindingTable<TabId, TabPart>,
    id: TabId,
) -> Result<()> {
    let name = strip.tab(id)?.name.clone();
    debug!("deleting tab {name}");
    table.forget_item(id);
    table.delete_bindings(name.as_str());
    strip.remove(id);
    Ok(())
}

/// Runs the commands bound in a tab strip.
pub type TabsHandler =
    Box<dyn FnMut(&mut TabsCtx<'_>, &Invocation<TabId, TabPart>) -> itembind::Result<Outcome>>;

/// What a bound command can reach while it runs.
pub struct TabsCtx<'a> {
    /// The tabs.
    strip: &'a mut TabStrip,
    /// The dispatching table.
    table: &'a mut BindingTable<TabId, TabPart>,
}

impl TabsCtx<'_> {
    /// The tabs.
    pub fn strip(&self) -> &TabStrip {
        self.strip
    }

    /// The dispatching table.
    pub fn table(&self) -> &BindingTable<TabId, TabPart> {
        self.table
    }

    /// Select a tab.
    pub fn select(&mut self, id: Option<TabId>) -> Result<()> {
        self.strip.select(id)
    }

    /// Delete a tab.
    pub fn delete(&mut self, id: TabId) -> Result<()> {
        delete_tab(self.strip, self.table, id)
    }

    /// Move keyboard focus to a tab.
    pub fn focus(&mut self, id: Option<TabId>) {
        self.table
            .set_focus(id.map(|id| Pick::new(id, TabPart::Label)));
    }

    /// Run one of the commands installed by the default bindings: `select`
    /// or `tearoff`, which tears the target tab off the strip. Returns false
    /// for any other command.
    pub fn builtin(&mut self, inv: &Invocation<TabId, TabPart>) -> Result<bool> {
        match inv.command.as_str() {
            "select" => self.select(Some(inv.target.item))?,
            "tearoff" => self.strip.set_torn(inv.target.item, true)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Adapter for a tab strip's table.
struct TabsAdapter<'a> {
    /// The tabs.
    strip: &'a mut TabStrip,
    /// Command runner.
    handler: &'a mut TabsHandler,
}

impl Adapter for TabsAdapter<'_> {
    type Item = TabId;
    type Context = TabPart;

    fn hit_test(&mut self, location: Point) -> Option<Pick<TabId, TabPart>> {
        self.strip.pick(location)
    }

    fn tags(&self, pick: &Pick<TabId, TabPart>) -> Vec<BindTag<TabId>> {
        self.strip.bind_tags(pick)
    }

    fn invoke(
        &mut self,
        table: &mut BindingTable<TabId, TabPart>,
        invocation: &Invocation<TabId, TabPart>,
    ) -> itembind::Result<Outcome> {
        let mut ctx = TabsCtx {
            strip: &mut *self.strip,
            table,
        };
        (self.handler)(&mut ctx, invocation)
    }
}

/// Class bindings for tab strips: select on press, tear off on a
/// perforation release.
pub struct TabBindings;

impl DefaultBindings<TabId, TabPart> for TabBindings {
    fn defaults(b: Binder<'_, TabId, TabPart>) -> itembind::Result<Binder<'_, TabId, TabPart>> {
        b.with_tag("all")
            .bind("<ButtonPress-1>", "select")?
            .with_tag(PERFORATION_TAG)
            .bind("<ButtonRelease-1>", "tearoff")
    }
}

/// A tab strip.
pub struct Tabs {
    /// The tabs.
    strip: TabStrip,
    /// Bindings on tab parts.
    table: BindingTable<TabId, TabPart>,
    /// Command runner.
    handler: TabsHandler,
}

impl Tabs {
    /// Construct an empty strip.
    pub fn new(kind: TabsKind, window: WindowId, handler: TabsHandler) -> Self {
        Self {
            strip: TabStrip::new(kind, TabStyle::default()),
            table: BindingTable::new(window),
            handler,
        }
    }

    /// Construct a notebook: a strip with tear-off enabled.
    pub fn notebook(window: WindowId, handler: TabsHandler) -> Self {
        Self::new(TabsKind::Notebook, window, handler)
    }

    /// Construct a tabset: a strip with tear-off disabled.
    pub fn tabset(window: WindowId, handler: TabsHandler) -> Self {
        Self::new(TabsKind::Tabset, window, handler)
    }

    /// Install the class bindings.
    pub fn install_defaults(&mut self) -> Result<()> {
        Binder::new(&mut self.table).defaults::<TabBindings>()?;
        Ok(())
    }

    /// The tabs.
    pub fn strip(&self) -> &TabStrip {
        &self.strip
    }

    /// The binding table.
    pub fn table(&self) -> &BindingTable<TabId, TabPart> {
        &self.table
    }

    /// Append a tab.
    pub fn insert(&mut self, name: &str) -> Result<TabId> {
        let id = self.strip.insert(name)?;
        self.settle();
        Ok(id)
    }

    /// Replace a tab's binding tags.
    pub fn set_tags(&mut self, id: TabId, tags: &[&str]) -> Result<()> {
        self.strip.set_tags(id, tags)
    }

    /// Delete a tab.
    pub fn delete(&mut self, id: TabId) -> Result<()> {
        delete_tab(&mut self.strip, &mut self.table, id)?;
        self.settle();
        Ok(())
    }

    /// Select a tab.
    pub fn select(&mut self, id: Option<TabId>) -> Result<()> {
        self.strip.select(id)?;
        self.settle();
        Ok(())
    }

    /// Show or hide the perforation.
    pub fn set_tearoff(&mut self, tearoff: bool) {
        self.strip.set_tearoff(tearoff);
        self.settle();
    }

    /// Scroll horizontally.
    pub fn scroll_to(&mut self, offset: i32) {
        self.strip.set_scroll(offset);
        self.settle();
    }

    /// Tear a tab off the strip. Its perforation disappears.
    pub fn tear_off(&mut self, id: TabId) -> Result<()> {
        self.strip.set_torn(id, true)?;
        self.settle();
        Ok(())
    }

    /// Put a torn tab back on the strip.
    pub fn restore(&mut self, id: TabId) -> Result<()> {
        self.strip.set_torn(id, false)?;
        self.settle();
        Ok(())
    }

    /// Move keyboard focus to a tab.
    pub fn set_focus(&mut self, id: Option<TabId>) -> Result<()> {
        if let Some(id) = id {
            self.strip.tab(id)?;
        }
        self.table
            .set_focus(id.map(|id| Pick::new(id, TabPart::Label)));
        Ok(())
    }

    /// Query or change bindings on a tag: a tab name, a class tag, or
    /// [`PERFORATION_TAG`]. See [`BindingTable::configure`].
    pub fn bind(&mut self, tag: &str, args: &[&str]) -> Result<Configured> {
        Ok(self.table.configure(tag, args)?)
    }

    /// Receive events from a different window.
    pub fn move_to_window(&mut self, window: WindowId) {
        self.table.move_to_window(window);
    }

    /// Tear down the binding table. The strip keeps its tabs, but no
    /// further events are dispatched and binding requests fail.
    pub fn destroy(&mut self) {
        self.table.destroy();
    }

    /// Has the widget been torn down?
    pub fn is_destroyed(&self) -> bool {
        self.table.is_destroyed()
    }

    /// Deliver an event.
    pub fn handle_event(&mut self, event: &Event) {
        self.table.handle_event(
            &mut TabsAdapter {
                strip: &mut self.strip,
                handler: &mut self.handler,
            },
            event,
        );
        self.settle();
    }

    /// Re-pick the current tab part.
    pub fn repick(&mut self) {
        self.strip.dirty = false;
        self.table.repick(&mut TabsAdapter {
            strip: &mut self.strip,
            handler: &mut self.handler,
        });
    }

    /// Re-pick if the layout changed.
    fn settle(&mut self) {
        if self.strip.dirty {
            self.repick();
        }
    }
}
