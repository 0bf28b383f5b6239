use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;

use crate::event::Event;

/// Error type handlers may return from [`EventHandler::handle`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// This trait is used to implement an asynchronous `EventHandler`, subscribed through
/// [`EventAggregator::subscribe`](crate::EventAggregator::subscribe).
///
/// Every delivery runs in its own tokio task: a slow handler never delays the publisher or the
/// other subscribers. Returned errors and panics are caught at that task boundary and reported as
/// [`HandlerFailure`](crate::HandlerFailure); they are never propagated to the publisher.
///
/// A handler should not block the thread it runs on. Blocking work belongs in a closure
/// subscribed with [`EventAggregator::subscribe_fn`](crate::EventAggregator::subscribe_fn).
#[async_trait]
pub trait EventHandler<E>: Send + Sync + 'static
where
    E: Event,
{
    /// Handle an event.
    async fn handle(&self, event: &E) -> Result<(), BoxError>;

    /// The name of the event handler. By default, this is the type name of the event handler,
    /// but it can be overridden to provide a custom name. This name is used as part of tracing
    /// spans and handler failures.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
impl<E, Q, T> EventHandler<E> for T
where
    E: Event,
    Q: EventHandler<E> + ?Sized,
    T: Deref<Target = Q> + Send + Sync + 'static,
{
    /// Deref call to [`EventHandler::handle`].
    async fn handle(&self, event: &E) -> Result<(), BoxError> {
        self.deref().handle(event).await
    }

    /// Deref call to [`EventHandler::name`].
    fn name(&self) -> &'static str {
        self.deref().name()
    }
}

/// A subscriber callback as stored by a registration.
pub(crate) enum Handler<E>
where
    E: Event,
{
    /// Runs on the async worker pool.
    Async(Arc<dyn EventHandler<E>>),
    /// Runs on the blocking pool.
    Blocking {
        name: &'static str,
        callback: Arc<dyn Fn(&E) + Send + Sync>,
    },
}

impl<E> Handler<E>
where
    E: Event,
{
    pub(crate) fn from_handler(handler: impl EventHandler<E>) -> Self {
        Self::Async(Arc::new(handler))
    }

    pub(crate) fn from_fn<F>(callback: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        Self::Blocking {
            name: std::any::type_name::<F>(),
            callback: Arc::new(callback),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Async(handler) => handler.as_ref().name(),
            Self::Blocking { name, .. } => *name,
        }
    }
}

impl<E> Clone for Handler<E>
where
    E: Event,
{
    fn clone(&self) -> Self {
        match self {
            Self::Async(handler) => Self::Async(Arc::clone(handler)),
            Self::Blocking { name, callback } => Self::Blocking {
                name: *name,
                callback: Arc::clone(callback),
            },
        }
    }
}
