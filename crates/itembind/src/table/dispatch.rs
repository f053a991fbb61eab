use tracing::trace;

use super::BindingTable;
use crate::{
    adapter::{Adapter, Invocation, Outcome, Pick},
    event::Event,
    subst::expand,
};

/// Run the bindings matching an event on each tag of a pick, in tag order.
///
/// Keyboard events go to the focus item regardless of `pick`. The target is
/// preserved for the duration; once a command deletes it or destroys the
/// table, no further tags are tried.
pub(super) fn dispatch<A: Adapter>(
    table: &mut BindingTable<A::Item, A::Context>,
    adapter: &mut A,
    event: &Event,
    pick: Option<Pick<A::Item, A::Context>>,
) {
    if table.destroyed {
        return;
    }
    let target = if event.is_key() { table.focus } else { pick };
    let Some(target) = target else {
        return;
    };

    let tags = adapter.tags(&target);
    let kept = table.preserver.preserve(target.item);
    for tag in tags {
        if table.destroyed || kept.is_deleted() {
            break;
        }
        let Some(binding) = table.registry.resolve(&tag, event) else {
            continue;
        };
        let invocation = Invocation {
            sequence: binding.pattern.to_string(),
            command: expand(&binding.command, event),
            event: event.clone(),
            tag,
            target,
        };
        trace!(
            "{} on {:?} via {}: {:?}",
            invocation.sequence, target.item, invocation.tag, invocation.command
        );
        match adapter.invoke(table, &invocation) {
            Ok(Outcome::Continue) => {}
            Ok(Outcome::Break) => break,
            Err(e) => adapter.background_error(&e),
        }
    }
}
