//! Widgets whose items carry event bindings: a hierarchy box with separate
//! tables for entries and their expand buttons, and a tab strip with a
//! tear-off perforation.

/// Widget errors.
pub mod error;
pub mod hierbox;
pub mod tabs;

pub use error::{Error, Result};
pub use hierbox::{EntryId, EntryPart, Hierbox, HierboxCtx, HierboxHandler, Layout, Tree};
pub use tabs::{TabId, TabPart, TabStrip, TabStyle, Tabs, TabsCtx, TabsHandler, TabsKind};
