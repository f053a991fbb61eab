//! itembind: event bindings for the items inside a widget.
//!
//! Widgets that draw many logical items into one window (rows of a tree,
//! tabs of a notebook) need per-item event bindings. A [`BindingTable`]
//! provides them: it stores sequence to command bindings per tag, tracks
//! which item the pointer is in, synthesizes Enter and Leave events as that
//! changes, and emulates a pointer grab on the item a button was pressed on.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`BindingTable`] - bindings and pointer state for one widget
//! - [`Adapter`] - the hooks a widget implements: hit testing, tags, and
//!   running commands
//! - [`Binder`] - a builder for installing bindings
//!
//! # Module Organization
//!
//! - [`event`] - input events, keysyms and buttons
//! - [`sequence`] - the `<Modifier-Type-Detail>` pattern syntax
//! - [`registry`] - per-tag binding storage

#![warn(missing_docs)]

/// Widget hooks.
pub mod adapter;
/// The binding builder.
mod binder;
/// Error types.
pub mod error;
/// Input events.
pub mod event;
/// Geometry primitives.
pub mod geom;
/// Scoped item protection.
pub mod preserve;
/// Per-tag binding storage.
pub mod registry;
/// Sequence patterns.
pub mod sequence;
/// `%` substitution.
pub mod subst;
/// The binding table.
pub mod table;
/// Test adapters.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use adapter::{Adapter, Invocation, Outcome, Pick};
pub use binder::{Binder, DefaultBindings};
pub use error::{Error, Result};
pub use registry::BindTag;
pub use table::{BindingTable, Configured, WindowId};
