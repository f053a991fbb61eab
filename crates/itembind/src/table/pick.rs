use scopeguard::guard;
use tracing::debug;

use super::{BindingTable, Flags, dispatch::dispatch};
use crate::{
    adapter::Adapter,
    event::{Detail, Event},
};

/// Work out which item the pointer is in and tell bindings about any change.
///
/// With an event, the event is first stored as the table's last pointer
/// event; without one, the stored event is replayed. While a button is held
/// the item it was pressed on stays current: moving elsewhere produces only
/// virtual Leave and Enter events, and the real transition happens when the
/// button is released.
pub(super) fn pick_current<A: Adapter>(
    table: &mut BindingTable<A::Item, A::Context>,
    adapter: &mut A,
    event: Option<&Event>,
) {
    let button_down = table.state.button_down();
    if !button_down {
        table.lower(Flags::LEFT_GRABBED_ITEM);
    }
    if let Some(e) = event {
        table.last_event = Some(e.pick_event());
    }

    // A Leave dispatched further up the stack owns this pick.
    if table.has(Flags::REPICK_IN_PROGRESS) {
        return;
    }
    let Some(last) = table.last_event.clone() else {
        return;
    };

    let mut pick = if last.is_leave() {
        None
    } else {
        adapter.hit_test(last.location)
    };
    if pick == table.current && !table.has(Flags::LEFT_GRABBED_ITEM) {
        return;
    }

    if button_down {
        if !table.has(Flags::LEFT_GRABBED_ITEM) {
            debug!("grab: pointer left {:?} with a button held", table.current);
        }
        table.raise(Flags::LEFT_GRABBED_ITEM);
        if pick == table.new {
            return;
        }
    }

    if !table.has(Flags::LEFT_GRABBED_ITEM)
        && let Some(current) = table.current
    {
        let kept = pick.map(|p| table.preserver.preserve(p.item));
        {
            table.raise(Flags::REPICK_IN_PROGRESS);
            let _repicking = guard(table.flags.clone(), |flags| {
                flags.set(flags.get() - Flags::REPICK_IN_PROGRESS);
            });
            dispatch(table, adapter, &last.to_leave(Detail::Ancestor), Some(current));
        }
        if kept.is_some_and(|k| k.is_deleted()) {
            pick = None;
        }
        if table.destroyed {
            return;
        }
    }

    if button_down {
        let saved = table.current;
        let saved_kept = saved.map(|p| table.preserver.preserve(p.item));
        if let Some(previous) = table.new {
            let kept = pick.map(|p| table.preserver.preserve(p.item));
            table.current = Some(previous);
            dispatch(table, adapter, &last.to_leave(Detail::Virtual), Some(previous));
            if kept.is_some_and(|k| k.is_deleted()) {
                pick = None;
            }
            if table.destroyed {
                return;
            }
        }
        table.new = pick;
        if let Some(p) = pick {
            table.current = Some(p);
            dispatch(table, adapter, &last.to_enter(Detail::Virtual), Some(p));
            if table.destroyed {
                return;
            }
        }
        table.current = if saved_kept.is_some_and(|k| k.is_deleted()) {
            None
        } else {
            saved
        };
        return;
    }

    debug!("pick: {:?} -> {:?}", table.current, pick);
    table.lower(Flags::LEFT_GRABBED_ITEM);
    table.current = pick;
    table.new = pick;
    if let Some(p) = pick {
        dispatch(table, adapter, &last.to_enter(Detail::Ancestor), Some(p));
    }
}
