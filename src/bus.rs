use crate::aggregator::{EventAggregator, Unsubscriber};
use crate::event::Event;
use crate::handler::EventHandler;

/// The capability of publishing events.
///
/// Components that only produce events should depend on this trait rather than on the whole
/// [`EventAggregator`].
pub trait EventPublisher: Send + Sync {
    /// Publish an event to every handler currently subscribed to its type.
    ///
    /// All the errors raised by handlers are handled by the implementation and never reach the
    /// caller.
    fn publish<E>(&self, event: E)
    where
        E: Event;
}

/// The capability of subscribing to events.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe an asynchronous handler to the event type `E`.
    fn subscribe<E, H>(&self, handler: H) -> Unsubscriber
    where
        E: Event,
        H: EventHandler<E>;

    /// Subscribe a closure to the event type `E`. The closure may block.
    fn subscribe_fn<E, F>(&self, handler: F) -> Unsubscriber
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static;
}

impl EventPublisher for EventAggregator {
    fn publish<E>(&self, event: E)
    where
        E: Event,
    {
        EventAggregator::publish(self, event)
    }
}

impl EventSubscriber for EventAggregator {
    fn subscribe<E, H>(&self, handler: H) -> Unsubscriber
    where
        E: Event,
        H: EventHandler<E>,
    {
        EventAggregator::subscribe(self, handler)
    }

    fn subscribe_fn<E, F>(&self, handler: F) -> Unsubscriber
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        EventAggregator::subscribe_fn(self, handler)
    }
}
