//! Scoped protection of items across command dispatch.
//!
//! While a command runs, the item it was dispatched for may be deleted by
//! the command itself. A [`Preserved`] guard is held for the duration of the
//! dispatch; deleting the item marks every live guard for it, so the caller
//! can check [`Preserved::is_deleted`] instead of touching a stale item.
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

/// One outstanding preservation.
#[derive(Debug)]
struct Slot<I> {
    /// Preserved item.
    item: I,
    /// Set when the item is released while preserved.
    deleted: Rc<Cell<bool>>,
}

/// Tracks items that are preserved by in-flight dispatches.
#[derive(Debug)]
pub struct Preserver<I> {
    /// Outstanding preservations.
    slots: Rc<RefCell<Vec<Slot<I>>>>,
}

impl<I> Default for Preserver<I> {
    fn default() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<I: Copy + PartialEq> Preserver<I> {
    /// Preserve an item until the returned guard is dropped.
    pub fn preserve(&self, item: I) -> Preserved<I> {
        let deleted = Rc::new(Cell::new(false));
        self.slots.borrow_mut().push(Slot {
            item,
            deleted: deleted.clone(),
        });
        Preserved {
            slots: self.slots.clone(),
            deleted,
        }
    }

    /// Mark an item as deleted in every guard currently preserving it.
    pub fn release(&self, item: &I) {
        for s in self.slots.borrow().iter().filter(|s| s.item == *item) {
            s.deleted.set(true);
        }
    }

    /// Number of outstanding guards.
    pub fn outstanding(&self) -> usize {
        self.slots.borrow().len()
    }
}

/// Guard returned by [`Preserver::preserve`].
#[derive(Debug)]
pub struct Preserved<I> {
    /// Shared slot list, for removal on drop.
    slots: Rc<RefCell<Vec<Slot<I>>>>,
    /// Deletion flag shared with this guard's slot.
    deleted: Rc<Cell<bool>>,
}

impl<I> Preserved<I> {
    /// Was the item deleted while this guard was held?
    pub fn is_deleted(&self) -> bool {
        self.deleted.get()
    }
}

impl<I> Drop for Preserved<I> {
    fn drop(&mut self) {
        self.slots
            .borrow_mut()
            .retain(|s| !Rc::ptr_eq(&s.deleted, &self.deleted));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_marks_live_guards() {
        let p = Preserver::default();
        let a = p.preserve(1u32);
        let a2 = p.preserve(1u32);
        let b = p.preserve(2u32);
        assert_eq!(p.outstanding(), 3);

        p.release(&1);
        assert!(a.is_deleted());
        assert!(a2.is_deleted());
        assert!(!b.is_deleted());

        drop(a);
        drop(a2);
        assert_eq!(p.outstanding(), 1);
        drop(b);
        assert_eq!(p.outstanding(), 0);

        // Releasing with no guard outstanding is a no-op.
        p.release(&2);
        assert!(!p.preserve(2).is_deleted());
    }
}
