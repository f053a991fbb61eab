//! A test adapter: items are rectangles, later items lie on top, and every
//! invoked binding is recorded.
use std::mem;

use crate::{
    adapter::{Adapter, Invocation, Outcome, Pick},
    error::{Error, Result},
    event::{Detail, EventKind},
    geom::{Point, Rect},
    registry::BindTag,
    table::BindingTable,
};

/// Item identity used by [`Grid`].
pub type ItemId = u32;

/// Hit regions of a grid item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    /// Anywhere in the item outside its edge.
    Body,
    /// The item's edge region, if it has one.
    Edge,
}

/// A rectangular item.
#[derive(Debug, Clone)]
struct Tile {
    /// Item identity.
    id: ItemId,
    /// Item bounds.
    rect: Rect,
    /// Optional sub-region reported as [`Zone::Edge`].
    edge: Option<Rect>,
    /// User tags, in order.
    tags: Vec<String>,
}

/// Recording adapter.
///
/// Bound commands are recorded and then interpreted line by line:
///
/// - `delete N` forgets item N in the table and removes it from the grid,
/// - `repick` re-picks the table,
/// - `destroy` destroys the table,
/// - `focus N` moves keyboard focus to item N,
/// - `break` stops dispatch to further tags,
/// - `fail MESSAGE` fails the command,
/// - anything else does nothing.
#[derive(Debug, Default)]
pub struct Grid {
    /// Items, bottom first.
    tiles: Vec<Tile>,
    /// One label per invocation, like `Enter(1)` or `vLeave(2)`.
    trace: Vec<String>,
    /// Expanded command text per invocation.
    commands: Vec<String>,
    /// Reported command failures.
    errors: Vec<String>,
}

impl Grid {
    /// Construct an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item on top of the existing ones.
    pub fn add(&mut self, id: ItemId, rect: Rect) -> &mut Self {
        self.add_tagged(id, rect, &[])
    }

    /// Add an item carrying user tags.
    pub fn add_tagged(&mut self, id: ItemId, rect: Rect, tags: &[&str]) -> &mut Self {
        self.tiles.push(Tile {
            id,
            rect,
            edge: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    /// Give an item an edge region.
    pub fn set_edge(&mut self, id: ItemId, edge: Rect) -> &mut Self {
        for t in self.tiles.iter_mut().filter(|t| t.id == id) {
            t.edge = Some(edge);
        }
        self
    }

    /// Remove an item.
    pub fn remove(&mut self, id: ItemId) {
        self.tiles.retain(|t| t.id != id);
    }

    /// Does the grid hold an item?
    pub fn contains(&self, id: ItemId) -> bool {
        self.tiles.iter().any(|t| t.id == id)
    }

    /// Invocation labels so far.
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Take and clear the invocation labels.
    pub fn take_trace(&mut self) -> Vec<String> {
        mem::take(&mut self.trace)
    }

    /// Expanded commands so far.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Command failures so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Label an invocation.
    fn label(inv: &Invocation<ItemId, Zone>) -> String {
        let prefix = match inv.event.kind {
            EventKind::Enter(Detail::Virtual) | EventKind::Leave(Detail::Virtual) => "v",
            _ => "",
        };
        format!("{prefix}{}({})", inv.event.type_name(), inv.target.item)
    }
}

impl Adapter for Grid {
    type Item = ItemId;
    type Context = Zone;

    fn hit_test(&mut self, location: Point) -> Option<Pick<ItemId, Zone>> {
        self.tiles.iter().rev().find_map(|t| {
            if t.edge.is_some_and(|e| e.contains_point(location)) {
                Some(Pick::new(t.id, Zone::Edge))
            } else if t.rect.contains_point(location) {
                Some(Pick::new(t.id, Zone::Body))
            } else {
                None
            }
        })
    }

    fn tags(&self, pick: &Pick<ItemId, Zone>) -> Vec<BindTag<ItemId>> {
        let mut tags = vec![BindTag::Item(pick.item)];
        if let Some(t) = self.tiles.iter().find(|t| t.id == pick.item) {
            tags.extend(t.tags.iter().map(|s| BindTag::from(s.as_str())));
        }
        tags.push(BindTag::from("all"));
        tags
    }

    fn invoke(
        &mut self,
        table: &mut BindingTable<ItemId, Zone>,
        invocation: &Invocation<ItemId, Zone>,
    ) -> Result<Outcome> {
        self.trace.push(Self::label(invocation));
        self.commands.push(invocation.command.clone());
        for line in invocation.command.lines() {
            let (verb, arg) = line.trim().split_once(' ').unwrap_or((line.trim(), ""));
            let id = || {
                arg.trim()
                    .parse::<ItemId>()
                    .map_err(|e| Error::Command(format!("{line}: {e}")))
            };
            match verb {
                "delete" => {
                    let id = id()?;
                    table.forget_item(id);
                    self.remove(id);
                }
                "repick" => table.repick(self),
                "destroy" => table.destroy(),
                "focus" => table.set_focus(Some(Pick::new(id()?, Zone::Body))),
                "break" => return Ok(Outcome::Break),
                "fail" => return Err(Error::Command(arg.to_string())),
                _ => {}
            }
        }
        Ok(Outcome::Continue)
    }

    fn background_error(&mut self, err: &Error) {
        self.errors.push(err.to_string());
    }
}
