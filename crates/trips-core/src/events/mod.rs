//! Cross-view event dispatch
//!
//! All state-changing gestures go through [`EventDispatcher`]; the event
//! set is a closed enum so subscribers match exhaustively instead of
//! registering against event names.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::warn;

/// Every state-changing interaction the dashboard supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// A deliberate click on a map path or scatter point.
    TripSelected { index: usize },
    /// A bar click; `None` clears the filter.
    HourFiltered { hour: Option<u8> },
    /// Escape, Ctrl/Cmd+R, or the reset control.
    Reset,
}

/// Discriminant used by the re-entrancy guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    TripSelected,
    HourFiltered,
    Reset,
}

impl DashboardEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DashboardEvent::TripSelected { .. } => EventKind::TripSelected,
            DashboardEvent::HourFiltered { .. } => EventKind::HourFiltered,
            DashboardEvent::Reset => EventKind::Reset,
        }
    }
}

/// Handler trait for event subscribers.
pub trait EventSubscriber: Send {
    fn on_event(&mut self, event: &DashboardEvent);
}

/// System-wide event bus.
///
/// Subscribers run synchronously in registration order. Publishing an
/// event kind from within a handler for that same kind is dropped with a
/// warning; this is what keeps a state-change handler from re-triggering
/// itself into an infinite redraw loop. A different kind published from a
/// handler is queued and delivered after the current event finishes.
pub struct EventDispatcher {
    subscribers: Arc<Mutex<Vec<Box<dyn EventSubscriber>>>>,
    in_flight: Arc<Mutex<Vec<EventKind>>>,
    pending: Arc<Mutex<VecDeque<DashboardEvent>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(Mutex::new(Vec::new())),
            pending: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Register a subscriber; it is invoked after all earlier registrations.
    pub fn subscribe(&self, subscriber: Box<dyn EventSubscriber>) {
        self.subscribers.lock().push(subscriber);
    }

    /// Deliver an event to every subscriber, in registration order.
    pub fn publish(&self, event: DashboardEvent) {
        let kind = event.kind();
        {
            let mut in_flight = self.in_flight.lock();
            if in_flight.contains(&kind) {
                warn!(?kind, "dropping re-entrant event publish");
                return;
            }
            in_flight.push(kind);
            if in_flight.len() > 1 {
                // A dispatch loop is already running below us on the
                // stack; it drains the queue once the current event is
                // done, preserving delivery order.
                self.pending.lock().push_back(event);
                return;
            }
        }

        self.dispatch(event);
        loop {
            let next = self.pending.lock().pop_front();
            match next {
                Some(event) => self.dispatch(event),
                None => break,
            }
        }
    }

    fn dispatch(&self, event: DashboardEvent) {
        let kind = event.kind();

        // Take the subscriber list so a handler may publish or subscribe
        // without deadlocking on the lock.
        let mut active = std::mem::take(&mut *self.subscribers.lock());
        for subscriber in active.iter_mut() {
            subscriber.on_event(&event);
        }

        // Subscribers registered during dispatch land after the originals.
        let mut subscribers = self.subscribers.lock();
        let registered_during_dispatch = std::mem::take(&mut *subscribers);
        *subscribers = active;
        subscribers.extend(registered_during_dispatch);
        drop(subscribers);

        self.in_flight.lock().retain(|k| *k != kind);
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating subscribers from closures.
struct ClosureSubscriber<F> {
    handler: F,
}

impl<F> EventSubscriber for ClosureSubscriber<F>
where
    F: FnMut(&DashboardEvent) + Send,
{
    fn on_event(&mut self, event: &DashboardEvent) {
        (self.handler)(event);
    }
}

/// Create an event subscriber from a closure.
pub fn subscriber_from_fn<F>(f: F) -> Box<dyn EventSubscriber>
where
    F: FnMut(&DashboardEvent) + Send + 'static,
{
    Box::new(ClosureSubscriber { handler: f })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_run_in_registration_order() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            dispatcher.subscribe(subscriber_from_fn(move |_| {
                seen.lock().push(tag);
            }));
        }

        dispatcher.publish(DashboardEvent::Reset);
        assert_eq!(*seen.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn every_subscriber_sees_every_event() {
        let dispatcher = EventDispatcher::new();
        let count = Arc::new(Mutex::new(0usize));
        let c = count.clone();
        dispatcher.subscribe(subscriber_from_fn(move |_| *c.lock() += 1));

        dispatcher.publish(DashboardEvent::TripSelected { index: 3 });
        dispatcher.publish(DashboardEvent::HourFiltered { hour: Some(7) });
        dispatcher.publish(DashboardEvent::Reset);
        assert_eq!(*count.lock(), 3);
    }

    #[test]
    fn re_entrant_publish_of_same_kind_is_dropped() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let calls = Arc::new(Mutex::new(0usize));

        let inner = dispatcher.clone();
        let c = calls.clone();
        dispatcher.subscribe(subscriber_from_fn(move |event| {
            *c.lock() += 1;
            // A buggy handler echoing its own event must not loop forever.
            inner.publish(event.clone());
        }));

        dispatcher.publish(DashboardEvent::Reset);
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn handler_may_publish_a_different_kind() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner = dispatcher.clone();
        let s = seen.clone();
        dispatcher.subscribe(subscriber_from_fn(move |event| {
            s.lock().push(event.kind());
            if event.kind() == EventKind::HourFiltered {
                inner.publish(DashboardEvent::Reset);
            }
        }));

        dispatcher.publish(DashboardEvent::HourFiltered { hour: None });
        assert_eq!(*seen.lock(), vec![EventKind::HourFiltered, EventKind::Reset]);
    }
}
