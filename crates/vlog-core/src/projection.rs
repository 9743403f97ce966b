//! Normative projection: the DECISION-only view of a stream.

use crate::events::EventKind;
use crate::stream::Stream;

/// Returns the DECISION events of `stream`, in their original relative
/// order, as a fresh stream indexed from zero.
///
/// Events are shared with the source stream, not copied.
pub fn project_normative(stream: &Stream) -> Stream {
    let decisions = stream
        .events()
        .iter()
        .filter(|event| event.kind() == EventKind::Decision)
        .cloned()
        .collect();
    Stream::from_shared(decisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use std::sync::Arc;

    fn ev(kind: EventKind, n: i64) -> Event {
        Event::builder(kind).deterministic("n", n).build()
    }

    #[test]
    fn keeps_only_decisions_in_order() {
        let stream: Stream = vec![
            ev(EventKind::Intent, 0),
            ev(EventKind::Decision, 1),
            ev(EventKind::Execution, 2),
            ev(EventKind::Decision, 3),
            ev(EventKind::Proof, 4),
        ]
        .into_iter()
        .collect();

        let projected = project_normative(&stream);
        assert_eq!(projected.len(), 2);
        assert_eq!(projected.get(0), Some(&ev(EventKind::Decision, 1)));
        assert_eq!(projected.get(1), Some(&ev(EventKind::Decision, 3)));
    }

    #[test]
    fn shares_events_with_source() {
        let stream = Stream::new().append(ev(EventKind::Decision, 1));
        let projected = project_normative(&stream);
        assert!(Arc::ptr_eq(&stream.events()[0], &projected.events()[0]));
    }

    #[test]
    fn empty_when_no_decisions() {
        let stream = Stream::new().append(ev(EventKind::Intent, 0));
        assert!(project_normative(&stream).is_empty());
        assert!(project_normative(&Stream::new()).is_empty());
    }
}
