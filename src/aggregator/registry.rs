use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;

use crate::aggregator::subscriber::{Dispatcher, SubscriberRegistration};
use crate::event::Event;
use crate::types::{EventTypeKey, SubscriptionToken};

/// Type-erased view of a [`TypeRegistry`], so registries of every event type can live in one map.
pub(crate) trait ErasedRegistry: Send + Sync {
    fn key(&self) -> EventTypeKey;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and disposes the registration for `token`. Returns the remaining subscriber count.
    fn remove(&self, token: &SubscriptionToken) -> usize;

    fn dispose(&self);

    fn as_any(&self) -> &dyn Any;
}

/// Holds the active subscriber registrations of a single event type.
pub(crate) struct TypeRegistry<E>
where
    E: Event,
{
    key: EventTypeKey,
    subscribers: DashMap<SubscriptionToken, Arc<SubscriberRegistration<E>>>,
}

impl<E> TypeRegistry<E>
where
    E: Event,
{
    pub(crate) fn new() -> Self {
        Self {
            key: EventTypeKey::of::<E>(),
            subscribers: DashMap::new(),
        }
    }

    pub(crate) fn add(&self, registration: Arc<SubscriberRegistration<E>>) {
        let token = registration.token();
        let previous = self.subscribers.insert(token, registration);
        debug_assert!(previous.is_none(), "subscription token {} was reused", token);
    }

    /// Dispatches the event to every registration present when the snapshot is taken.
    pub(crate) fn publish(&self, event: &Arc<E>, dispatcher: &Arc<Dispatcher>) {
        let snapshot: Vec<Arc<SubscriberRegistration<E>>> = self
            .subscribers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        for registration in snapshot {
            tracing::trace!(
                event_type = %self.key,
                token = %registration.token(),
                "publishing event to subscriber"
            );
            registration.handle(event, dispatcher);
        }
    }
}

impl<E> ErasedRegistry for TypeRegistry<E>
where
    E: Event,
{
    fn key(&self) -> EventTypeKey {
        self.key
    }

    fn len(&self) -> usize {
        self.subscribers.len()
    }

    fn remove(&self, token: &SubscriptionToken) -> usize {
        if let Some((_, registration)) = self.subscribers.remove(token) {
            registration.dispose();
        }

        self.subscribers.len()
    }

    fn dispose(&self) {
        let tokens: Vec<SubscriptionToken> =
            self.subscribers.iter().map(|entry| *entry.key()).collect();
        let removed: Vec<Arc<SubscriberRegistration<E>>> = tokens
            .iter()
            .filter_map(|token| self.subscribers.remove(token))
            .map(|(_, registration)| registration)
            .collect();

        // Disposing drops handlers, whose destructors may call back into this registry.
        removed.iter().for_each(|registration| registration.dispose());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
