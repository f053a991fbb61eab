//! The interface between a binding table and the widget that owns it.
use std::{fmt::Debug, hash::Hash};

use tracing::error;

use crate::{
    error::{Error, Result},
    event::Event,
    geom::Point,
    registry::BindTag,
    table::BindingTable,
};

/// An item together with the region of it that was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pick<I, C> {
    /// The item.
    pub item: I,
    /// Widget-defined sub-region of the item, e.g. a label or a button.
    pub context: C,
}

impl<I, C> Pick<I, C> {
    /// Construct a pick.
    pub fn new(item: I, context: C) -> Self {
        Self { item, context }
    }
}

/// Whether dispatch continues to the remaining tags of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Run bindings on the remaining tags.
    Continue,
    /// Skip the remaining tags.
    Break,
}

/// A resolved binding about to be run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<I, C> {
    /// Tag the binding was found on.
    pub tag: BindTag<I>,
    /// Canonical form of the matched sequence.
    pub sequence: String,
    /// Command text with `%` escapes expanded.
    pub command: String,
    /// The event being dispatched.
    pub event: Event,
    /// The item the event was dispatched to.
    pub target: Pick<I, C>,
}

/// Widget-side hooks used by a [`BindingTable`].
///
/// The widget owns its items. The table identifies them by value and asks the
/// adapter what is under the pointer, which tags an item carries, and how to
/// run a bound command.
pub trait Adapter {
    /// Item identity.
    type Item: Copy + Eq + Hash + Debug;
    /// Hit region within an item.
    type Context: Copy + Eq + Debug;

    /// The topmost item at a location, if any.
    fn hit_test(&mut self, location: Point) -> Option<Pick<Self::Item, Self::Context>>;

    /// Tags to consult, in order, when dispatching to a pick. The default is
    /// the item's own identity followed by `"all"`.
    fn tags(&self, pick: &Pick<Self::Item, Self::Context>) -> Vec<BindTag<Self::Item>> {
        vec![BindTag::Item(pick.item), BindTag::from("all")]
    }

    /// Run a bound command. The table is passed back in so that commands can
    /// delete items, re-pick, move focus or destroy the table.
    fn invoke(
        &mut self,
        table: &mut BindingTable<Self::Item, Self::Context>,
        invocation: &Invocation<Self::Item, Self::Context>,
    ) -> Result<Outcome>;

    /// Report a failed command. Failures never stop the dispatch loop.
    fn background_error(&mut self, err: &Error) {
        error!("binding command failed: {err}");
    }
}
