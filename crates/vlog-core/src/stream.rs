use std::fmt;
use std::sync::Arc;

use vlog_canonical::Digest;

use crate::digest::{event_digest, stream_digest};
use crate::errors::CoreError;
use crate::events::Event;

/// Immutable, append-only sequence of events.
///
/// The index of an event is its position `t(e)`. Appending returns a new
/// stream and leaves the receiver untouched; events are shared between the
/// two through `Arc`, so old snapshots stay cheap and valid for any reader.
#[derive(Clone, Default, PartialEq)]
pub struct Stream {
    events: Vec<Arc<Event>>,
}

impl Stream {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if the stream has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index).map(Arc::as_ref)
    }

    /// Iterates events in stream order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Event> + '_ {
        self.events.iter().map(Arc::as_ref)
    }

    /// Shared handles to the events, in order.
    pub fn events(&self) -> &[Arc<Event>] {
        &self.events
    }

    /// Returns a new stream with `event` at index `self.len()`.
    pub fn append(&self, event: Event) -> Stream {
        self.append_shared(Arc::new(event))
    }

    pub(crate) fn append_shared(&self, event: Arc<Event>) -> Stream {
        let mut events = Vec::with_capacity(self.events.len() + 1);
        events.extend(self.events.iter().cloned());
        events.push(event);
        Stream { events }
    }

    pub(crate) fn from_shared(events: Vec<Arc<Event>>) -> Stream {
        Stream { events }
    }

    /// Digest of every event, in order.
    pub fn event_digests(&self) -> Result<Vec<Digest>, CoreError> {
        self.iter().map(event_digest).collect()
    }

    /// Commitment to the whole stream.
    pub fn digest(&self) -> Result<Digest, CoreError> {
        stream_digest(&self.event_digests()?)
    }

    /// Lowercase hex of [`Stream::digest`].
    pub fn digest_hex(&self) -> Result<String, CoreError> {
        Ok(self.digest()?.to_hex())
    }
}

/// Appends `event` to `stream`, returning the new stream.
pub fn append_event(stream: &Stream, event: Event) -> Stream {
    stream.append(event)
}

impl FromIterator<Event> for Stream {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Stream {
            events: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Stream {
    type Item = &'a Event;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, Arc<Event>>, fn(&Arc<Event>) -> &Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter().map(Arc::as_ref as fn(&Arc<Event>) -> &Event)
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Stream(len=0)");
        }
        match self.digest_hex() {
            Ok(hex) => write!(f, "Stream(len={}, digest={}...)", self.len(), &hex[..8]),
            Err(_) => write!(f, "Stream(len={}, digest=<invalid>)", self.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    fn event(i: i64) -> Event {
        Event::builder(EventKind::Intent).deterministic("i", i).build()
    }

    #[test]
    fn append_leaves_previous_value_intact() {
        let v0 = Stream::new();
        let v1 = v0.append(event(0));
        let v2 = v1.append(event(1));
        assert_eq!(v0.len(), 0);
        assert_eq!(v1.len(), 1);
        assert_eq!(v2.len(), 2);
        assert_eq!(v2.get(0), Some(&event(0)));
        assert_eq!(v2.get(1), Some(&event(1)));
        assert!(v2.get(2).is_none());
    }

    #[test]
    fn append_shares_event_storage() {
        let v1 = Stream::new().append(event(0));
        let v2 = v1.append(event(1));
        assert!(Arc::ptr_eq(&v1.events()[0], &v2.events()[0]));
    }

    #[test]
    fn debug_shows_length_and_digest_prefix() {
        assert_eq!(format!("{:?}", Stream::new()), "Stream(len=0)");
        let v = Stream::new().append(event(0));
        let shown = format!("{:?}", v);
        let prefix = &v.digest_hex().unwrap()[..8];
        assert_eq!(shown, format!("Stream(len=1, digest={}...)", prefix));
    }

    #[test]
    fn streams_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Stream>();
    }

    #[test]
    fn collects_from_events() {
        let v: Stream = (0..3).map(event).collect();
        assert_eq!(v.iter().len(), 3);
        let kinds: Vec<_> = (&v).into_iter().map(Event::kind).collect();
        assert_eq!(kinds, vec![EventKind::Intent; 3]);
    }
}
