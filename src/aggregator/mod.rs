use std::sync::Arc;

use dashmap::DashMap;
use tokio::runtime::Handle;

pub use config::EventAggregatorConfig;
pub use unsubscriber::Unsubscriber;

use crate::error::AggregatorError;
use crate::event::Event;
use crate::handler::{EventHandler, Handler};
use crate::types::{EventTypeKey, SubscriptionToken};
use registry::{ErasedRegistry, TypeRegistry};
use subscriber::{Dispatcher, SubscriberRegistration};

mod config;
mod registry;
mod subscriber;
mod unsubscriber;

/// In-process publish/subscribe hub keyed by event type.
///
/// Subscribing to an event type `E` registers a handler; publishing a value of type `E` hands it
/// to every handler registered for `E` at that moment. Each delivery runs in its own task, so
/// [`publish`](Self::publish) returns as soon as the deliveries are handed off and a slow or
/// failing handler never affects the publisher or the other subscribers.
///
/// The aggregator is protected by an [`Arc`] that allows it to be cloneable still sharing the same
/// registries.
///
/// Delivery is best-effort and at-most-once: there is no persistence, replay or retry, and no
/// ordering between handlers.
#[derive(Clone)]
pub struct EventAggregator {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    registries: DashMap<EventTypeKey, Arc<dyn ErasedRegistry>>,
    dispatcher: Arc<Dispatcher>,
}

impl EventAggregator {
    /// Creates a new aggregator from the given configuration.
    ///
    /// Fails with [`AggregatorError::NoRuntime`] when no runtime is configured and this is not
    /// called from within a tokio runtime.
    pub fn new(config: EventAggregatorConfig) -> Result<Self, AggregatorError> {
        let runtime = match config.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current()?,
        };

        Ok(Self::from_parts(runtime, config.error_handler))
    }

    /// Creates a new aggregator dispatching handlers on the given runtime.
    pub fn with_runtime(runtime: Handle) -> Self {
        Self::from_parts(runtime, Box::new(|_| ()))
    }

    fn from_parts(runtime: Handle, error_handler: subscriber::ErrorHandler) -> Self {
        Self {
            inner: Arc::new(Inner {
                registries: DashMap::new(),
                dispatcher: Arc::new(Dispatcher::new(runtime, error_handler)),
            }),
        }
    }

    /// Publishes the event to every handler currently subscribed to its type.
    ///
    /// Publishing an event type nobody subscribed to has no effect.
    pub fn publish<E>(&self, event: E)
    where
        E: Event,
    {
        let key = EventTypeKey::of::<E>();

        let Some(registry) = self.inner.registry(&key) else {
            tracing::trace!(event_type = %key, "no subscriber for event");
            return;
        };

        typed::<E>(&*registry).publish(&Arc::new(event), &self.inner.dispatcher);
    }

    /// Like [`publish`](Self::publish), failing with [`AggregatorError::InvalidArgument`] if the
    /// event is absent.
    pub fn try_publish<E>(&self, event: Option<E>) -> Result<(), AggregatorError>
    where
        E: Event,
    {
        let event = event.ok_or(AggregatorError::InvalidArgument { argument: "event" })?;
        self.publish(event);
        Ok(())
    }

    /// Subscribes an asynchronous [`EventHandler`] to the event type `E`.
    ///
    /// Every subscription is independent: the same handler subscribed twice receives each event
    /// twice.
    pub fn subscribe<E, H>(&self, handler: H) -> Unsubscriber
    where
        E: Event,
        H: EventHandler<E>,
    {
        self.register(Handler::from_handler(handler))
    }

    /// Like [`subscribe`](Self::subscribe), failing with [`AggregatorError::InvalidArgument`] if
    /// the handler is absent.
    pub fn try_subscribe<E, H>(&self, handler: Option<H>) -> Result<Unsubscriber, AggregatorError>
    where
        E: Event,
        H: EventHandler<E>,
    {
        let handler = handler.ok_or(AggregatorError::InvalidArgument { argument: "handler" })?;
        Ok(self.subscribe(handler))
    }

    /// Subscribes a closure to the event type `E`.
    ///
    /// The closure runs on tokio's blocking pool, so it may block without stalling other handlers.
    pub fn subscribe_fn<E, F>(&self, handler: F) -> Unsubscriber
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.register(Handler::from_fn(handler))
    }

    /// Like [`subscribe_fn`](Self::subscribe_fn), failing with
    /// [`AggregatorError::InvalidArgument`] if the handler is absent.
    pub fn try_subscribe_fn<E, F>(
        &self,
        handler: Option<F>,
    ) -> Result<Unsubscriber, AggregatorError>
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let handler = handler.ok_or(AggregatorError::InvalidArgument { argument: "handler" })?;
        Ok(self.subscribe_fn(handler))
    }

    /// Number of active subscriptions for the event type `E`.
    pub fn subscriber_count<E>(&self) -> usize
    where
        E: Event,
    {
        self.inner
            .registries
            .get(&EventTypeKey::of::<E>())
            .map_or(0, |registry| registry.len())
    }

    /// Whether at least one handler is subscribed to the event type `E`.
    pub fn has_subscribers<E>(&self) -> bool
    where
        E: Event,
    {
        self.subscriber_count::<E>() > 0
    }

    /// Number of event types with at least one active subscription.
    pub fn registry_count(&self) -> usize {
        self.inner.registries.len()
    }

    /// Releases every registry and handler.
    ///
    /// Outstanding [`Unsubscriber`]s become no-ops. Deliveries already handed off still complete.
    /// The aggregator can be used again afterwards.
    pub fn dispose(&self) {
        let keys: Vec<EventTypeKey> = self
            .inner
            .registries
            .iter()
            .map(|entry| *entry.key())
            .collect();

        // Handlers are dropped while disposing, so no map guard may be held at that point.
        for key in keys {
            if let Some((_, registry)) = self.inner.registries.remove(&key) {
                tracing::debug!(event_type = %key, "disposing registry");
                registry.dispose();
            }
        }
    }

    fn register<E>(&self, handler: Handler<E>) -> Unsubscriber
    where
        E: Event,
    {
        let key = EventTypeKey::of::<E>();
        let registration = Arc::new(SubscriberRegistration::new(handler));
        let token = registration.token();

        // The entry guard is held while adding, so the registry cannot be retired in between.
        let registry = self.inner.registries.entry(key).or_insert_with(|| {
            tracing::debug!(event_type = %key, "creating registry");
            let registry: Arc<dyn ErasedRegistry> = Arc::new(TypeRegistry::<E>::new());
            registry
        });
        typed::<E>(&**registry).add(registration);
        drop(registry);

        tracing::debug!(event_type = %key, token = %token, "subscriber added");

        Unsubscriber::new(Arc::downgrade(&self.inner), key, token)
    }
}

impl Inner {
    /// Clones the registry out of the map, so no shard lock is held while it is used.
    fn registry(&self, key: &EventTypeKey) -> Option<Arc<dyn ErasedRegistry>> {
        self.registries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn remove(&self, key: &EventTypeKey, token: &SubscriptionToken) {
        tracing::debug!(event_type = %key, token = %token, "removing subscriber");

        let Some(registry) = self.registry(key) else {
            tracing::debug!(event_type = %key, "no subscriber to remove");
            return;
        };

        if registry.remove(token) > 0 {
            return;
        }

        let retired = self.registries.remove_if(key, |_, registry| registry.is_empty());

        if let Some((_, registry)) = retired {
            tracing::debug!(event_type = %registry.key(), "retiring empty registry");
            registry.dispose();
        }
    }
}

impl std::fmt::Debug for EventAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventAggregator")
            .field("registries", &self.registry_count())
            .finish()
    }
}

fn typed<E>(registry: &dyn ErasedRegistry) -> &TypeRegistry<E>
where
    E: Event,
{
    registry
        .as_any()
        .downcast_ref::<TypeRegistry<E>>()
        .expect("registry is keyed by the TypeId of its event")
}
