use std::{fmt::Debug, hash::Hash};

use crate::{
    error::Result,
    registry::BindTag,
    table::BindingTable,
};

/// Binder provides an ergonomic way to specify a set of bindings on a table
/// using a builder pattern.
pub struct Binder<'a, I, C> {
    /// Tag subsequent bindings are registered on.
    tag: BindTag<I>,
    /// Table being configured.
    table: &'a mut BindingTable<I, C>,
}

impl<'a, I, C> Binder<'a, I, C>
where
    I: Copy + Eq + Hash + Debug,
    C: Copy + Eq + Debug,
{
    /// Construct a binder for a table. Bindings go on the `"all"` tag until
    /// another tag is chosen.
    pub fn new(table: &'a mut BindingTable<I, C>) -> Self {
        Binder {
            tag: BindTag::from("all"),
            table,
        }
    }

    /// Add the default bindings for a widget.
    pub fn defaults<T>(self) -> Result<Self>
    where
        T: DefaultBindings<I, C>,
    {
        T::defaults(self)
    }

    /// Set the tag for subsequent bindings.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = BindTag::from(tag);
        self
    }

    /// Bind subsequent sequences on a single item.
    pub fn with_item(mut self, item: I) -> Self {
        self.tag = BindTag::Item(item);
        self
    }

    /// Bind a sequence to a command, replacing any existing command.
    pub fn bind(self, sequence: &str, command: &str) -> Result<Self> {
        self.table.bind(self.tag.clone(), sequence, command, false)?;
        Ok(self)
    }

    /// Add a command to whatever is already bound to a sequence.
    pub fn append(self, sequence: &str, command: &str) -> Result<Self> {
        self.table.bind(self.tag.clone(), sequence, command, true)?;
        Ok(self)
    }

    /// Remove a binding.
    pub fn unbind(self, sequence: &str) -> Result<Self> {
        self.table.unbind(self.tag.clone(), sequence)?;
        Ok(self)
    }
}

/// Widgets implement this trait to install their class bindings.
pub trait DefaultBindings<I, C> {
    /// Add this widget's default bindings to a binder.
    fn defaults(b: Binder<'_, I, C>) -> Result<Binder<'_, I, C>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, table::WindowId};

    /// Bindings a hypothetical list widget installs for itself.
    struct ListDefaults;

    impl DefaultBindings<u32, ()> for ListDefaults {
        fn defaults(b: Binder<'_, u32, ()>) -> Result<Binder<'_, u32, ()>> {
            b.with_tag("list")
                .bind("<Enter>", "highlight")?
                .bind("<Leave>", "unhighlight")
        }
    }

    #[test]
    fn builds_bindings() -> Result<()> {
        let mut table: BindingTable<u32, ()> = BindingTable::new(WindowId(1));
        Binder::new(&mut table)
            .bind("<1>", "select")?
            .defaults::<ListDefaults>()?
            .append("<Enter>", "status")?
            .with_item(7)
            .bind("<Motion>", "track")?;

        assert_eq!(table.binding("all", "<1>")?, Some("select"));
        assert_eq!(table.binding("list", "<Enter>")?, Some("highlight\nstatus"));
        assert_eq!(table.binding(BindTag::Item(7), "<Motion>")?, Some("track"));

        let err = Binder::new(&mut table).with_tag("list").unbind("<Motion>");
        assert!(matches!(err, Err(Error::NoBinding { .. })));
        Ok(())
    }
}
