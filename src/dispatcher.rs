//! Typed event dispatcher: `on`/`once`/`off`/`remove_all` with in-order
//! fan-out emission.
//!
//! State only ever changes through one serialized entry point (`emit`),
//! the same single-writer discipline as a reducer.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::protocol::{InitResponse, WireMessage};

/// The fixed event vocabulary a [`crate::session::LiveSession`] emits.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Started(InitResponse),
    Connecting { connection: u32, attempt: u32 },
    Connected { connection: u32, attempt: u32 },
    Ending { code: u16, reason: Option<String> },
    Ended { code: u16, reason: Option<String> },
    Message(Box<WireMessage>),
    Error(String),
}

/// Name of an event, used as the registry key. Kept separate from
/// [`SessionEvent`] so `on`/`off` can address an event before a payload of
/// that type exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    Started,
    Connecting,
    Connected,
    Ending,
    Ended,
    Message,
    Error,
}

impl SessionEvent {
    fn name(&self) -> EventName {
        match self {
            SessionEvent::Started(_) => EventName::Started,
            SessionEvent::Connecting { .. } => EventName::Connecting,
            SessionEvent::Connected { .. } => EventName::Connected,
            SessionEvent::Ending { .. } => EventName::Ending,
            SessionEvent::Ended { .. } => EventName::Ended,
            SessionEvent::Message(_) => EventName::Message,
            SessionEvent::Error(_) => EventName::Error,
        }
    }
}

pub type Callback = dyn Fn(&SessionEvent) + Send + Sync;

/// Opaque handle returned by `on`/`once`, used to remove a specific
/// listener via [`EventDispatcher::off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Entry {
    id: ListenerId,
    once: bool,
    callback: Arc<Callback>,
}

#[derive(Default)]
pub struct EventDispatcher {
    listeners: Mutex<HashMap<EventName, Vec<Entry>>>,
    next_id: AtomicU64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, name: EventName, once: bool, callback: Arc<Callback>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap()
            .entry(name)
            .or_default()
            .push(Entry { id, once, callback });
        id
    }

    pub fn on<F>(&self, name: EventName, callback: F) -> ListenerId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.register(name, false, Arc::new(callback))
    }

    pub fn once<F>(&self, name: EventName, callback: F) -> ListenerId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.register(name, true, Arc::new(callback))
    }

    /// Remove a single listener by id, regardless of which event it was
    /// registered for.
    pub fn off(&self, id: ListenerId) {
        let mut listeners = self.listeners.lock().unwrap();
        for entries in listeners.values_mut() {
            entries.retain(|e| e.id != id);
        }
    }

    /// Remove every listener for `name`, or every listener for every event
    /// when `name` is `None`.
    pub fn remove_all(&self, name: Option<EventName>) {
        let mut listeners = self.listeners.lock().unwrap();
        match name {
            Some(name) => {
                listeners.remove(&name);
            }
            None => listeners.clear(),
        }
    }

    /// Dispatch `event` to every listener registered for its name, in
    /// registration order. One-shot listeners are removed before they run,
    /// so a `once` handler that re-registers itself cannot loop. A
    /// listener that panics does not stop delivery to the rest; the panic
    /// is forwarded as an `error` event, unless `event` IS `error`, in
    /// which case it is logged and swallowed to avoid recursing forever.
    pub fn emit(&self, event: SessionEvent) {
        let name = event.name();

        let to_run: Vec<Arc<Callback>> = {
            let mut listeners = self.listeners.lock().unwrap();
            let Some(entries) = listeners.get_mut(&name) else {
                return;
            };
            let to_run = entries.iter().map(|e| e.callback.clone()).collect();
            entries.retain(|e| !e.once);
            to_run
        };

        for callback in to_run {
            let event_ref = &event;
            let result = catch_unwind(AssertUnwindSafe(|| callback(event_ref)));
            if let Err(panic) = result {
                let msg = panic_message(&panic);
                if matches!(name, EventName::Error) {
                    log::error!("listener for 'error' panicked, swallowing: {}", msg);
                } else {
                    log::warn!("listener for {:?} panicked, forwarding to 'error': {}", name, msg);
                    self.emit(SessionEvent::Error(msg));
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "listener panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::InitResponse;
    use std::sync::atomic::AtomicU32;

    fn dummy_init_response() -> InitResponse {
        InitResponse {
            id: "s1".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            url: "wss://example.invalid/socket".to_string(),
        }
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let dispatcher = EventDispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let o1 = order.clone();
        dispatcher.on(EventName::Started, move |_| o1.lock().unwrap().push(1));
        let o2 = order.clone();
        dispatcher.on(EventName::Started, move |_| o2.lock().unwrap().push(2));

        dispatcher.emit(SessionEvent::Started(dummy_init_response()));
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn once_listener_fires_at_most_once() {
        let dispatcher = EventDispatcher::new();
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        dispatcher.once(EventName::Started, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        dispatcher.emit(SessionEvent::Started(dummy_init_response()));
        dispatcher.emit(SessionEvent::Started(dummy_init_response()));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn once_listener_removed_before_invocation_does_not_loop() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let count = Arc::new(AtomicU32::new(0));

        let d = dispatcher.clone();
        let c = count.clone();
        dispatcher.once(EventName::Started, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            let c2 = c.clone();
            d.once(EventName::Started, move |_| {
                c2.fetch_add(1, Ordering::SeqCst);
            });
        });

        dispatcher.emit(SessionEvent::Started(dummy_init_response()));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panic_in_listener_forwards_to_error_and_does_not_stop_delivery() {
        let dispatcher = EventDispatcher::new();
        let ran_second = Arc::new(AtomicU32::new(0));
        let saw_error = Arc::new(AtomicU32::new(0));

        dispatcher.on(EventName::Started, |_| panic!("boom"));
        let r = ran_second.clone();
        dispatcher.on(EventName::Started, move |_| {
            r.fetch_add(1, Ordering::SeqCst);
        });
        let e = saw_error.clone();
        dispatcher.on(EventName::Error, move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.emit(SessionEvent::Started(dummy_init_response()));
        assert_eq!(ran_second.load(Ordering::SeqCst), 1);
        assert_eq!(saw_error.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panic_in_error_listener_is_swallowed() {
        let dispatcher = EventDispatcher::new();
        dispatcher.on(EventName::Error, |_| panic!("boom"));
        // Must not panic the test itself.
        dispatcher.emit(SessionEvent::Error("x".to_string()));
    }

    #[test]
    fn mixed_on_and_once_fire_in_registration_order() {
        let dispatcher = EventDispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let oa = order.clone();
        dispatcher.on(EventName::Started, move |_| oa.lock().unwrap().push('a'));
        let ob = order.clone();
        dispatcher.once(EventName::Started, move |_| ob.lock().unwrap().push('b'));
        let oc = order.clone();
        dispatcher.on(EventName::Started, move |_| oc.lock().unwrap().push('c'));

        dispatcher.emit(SessionEvent::Started(dummy_init_response()));
        assert_eq!(*order.lock().unwrap(), vec!['a', 'b', 'c']);
    }

    #[test]
    fn off_removes_only_the_targeted_listener() {
        let dispatcher = EventDispatcher::new();
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        let id = dispatcher.on(EventName::Started, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        dispatcher.on(EventName::Started, |_| {});
        dispatcher.off(id);
        dispatcher.emit(SessionEvent::Started(dummy_init_response()));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn remove_all_clears_an_event_or_everything() {
        let dispatcher = EventDispatcher::new();
        dispatcher.on(EventName::Started, |_| {});
        dispatcher.on(EventName::Ended, |_| {});
        dispatcher.remove_all(Some(EventName::Started));
        assert!(dispatcher.listeners.lock().unwrap().get(&EventName::Started).is_none());
        assert!(dispatcher.listeners.lock().unwrap().contains_key(&EventName::Ended));
        dispatcher.remove_all(None);
        assert!(dispatcher.listeners.lock().unwrap().is_empty());
    }
}
