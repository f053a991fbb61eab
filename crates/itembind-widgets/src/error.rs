use std::result::Result as StdResult;

use thiserror::Error;

/// Result type for widget operations.
pub type Result<T> = StdResult<T, Error>;

/// Widget error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("unknown entry")]
    /// An entry id that is not (or no longer) in the tree.
    UnknownEntry,

    #[error("unknown tab \"{0}\"")]
    /// No tab has this name.
    UnknownTab(String),

    #[error("unknown tab")]
    /// A tab id that is not (or no longer) in the strip.
    UnknownTabId,

    #[error("a tab named \"{0}\" already exists")]
    /// Tab names are unique within a strip.
    DuplicateTab(String),

    #[error("the root entry cannot be deleted")]
    /// The hierarchy root is permanent.
    RootEntry,

    #[error(transparent)]
    /// Error from the binding table.
    Bind(#[from] itembind::Error),
}

impl From<Error> for itembind::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Bind(e) => e,
            e => Self::Command(e.to_string()),
        }
    }
}
