use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};

use futures::FutureExt;
use tokio::runtime::Handle;
use tracing::Instrument;

use crate::error::HandlerFailure;
use crate::event::Event;
use crate::handler::{BoxError, Handler};
use crate::types::{EventTypeKey, SubscriptionToken};

pub(crate) type ErrorHandler = Box<dyn Fn(HandlerFailure) + Send + Sync>;

/// Runs handler invocations off the publisher's thread and reports their failures.
pub(crate) struct Dispatcher {
    runtime: Handle,
    error_handler: ErrorHandler,
}

impl Dispatcher {
    pub(crate) fn new(runtime: Handle, error_handler: ErrorHandler) -> Self {
        Self { runtime, error_handler }
    }

    fn settle(&self, handler: &'static str, event_type: &'static str, outcome: Outcome) {
        let failure = match outcome {
            Ok(Ok(())) => {
                tracing::trace!(event_handler = handler, event_type, "event handled");
                return;
            }
            Ok(Err(source)) => HandlerFailure::Failed {
                handler,
                event_type,
                source,
            },
            Err(panic) => HandlerFailure::Panicked {
                handler,
                event_type,
                message: panic_message(panic.as_ref()),
            },
        };

        tracing::error!({
            event_handler = handler,
            event_type,
            failure = failure.as_label(),
            error = %failure,
        }, "event handler failed to handle event");

        (self.error_handler)(failure);
    }
}

type Outcome = Result<Result<(), BoxError>, Box<dyn Any + Send>>;

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Binds a token to a handler for one event type.
///
/// The handler slot is emptied on [`dispose`](Self::dispose); a dispatch that already captured
/// the handler still runs to completion.
pub(crate) struct SubscriberRegistration<E>
where
    E: Event,
{
    token: SubscriptionToken,
    handler: RwLock<Option<Handler<E>>>,
}

impl<E> SubscriberRegistration<E>
where
    E: Event,
{
    pub(crate) fn new(handler: Handler<E>) -> Self {
        Self {
            token: SubscriptionToken::new(),
            handler: RwLock::new(Some(handler)),
        }
    }

    pub(crate) fn token(&self) -> SubscriptionToken {
        self.token
    }

    #[cfg(test)]
    pub(crate) fn is_disposed(&self) -> bool {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Hands the event to an independent task and returns without waiting for it.
    pub(crate) fn handle(&self, event: &Arc<E>, dispatcher: &Arc<Dispatcher>) {
        let handler = self
            .handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let Some(handler) = handler else {
            tracing::trace!(token = %self.token, "skipping dispatch to a disposed subscriber");
            return;
        };

        let event_type = EventTypeKey::of::<E>().name();
        let name = handler.name();
        let span = tracing::debug_span!(
            "eventing.event_handler",
            event_type,
            token = %self.token,
            event_handler = name
        );
        let event = Arc::clone(event);
        let sink = Arc::clone(dispatcher);

        match handler {
            Handler::Async(handler) => {
                dispatcher.runtime.spawn(
                    async move {
                        let outcome = AssertUnwindSafe(handler.handle(&*event))
                            .catch_unwind()
                            .await;
                        sink.settle(name, event_type, outcome);
                    }
                    .instrument(span),
                );
            }
            Handler::Blocking { callback, .. } => {
                dispatcher.runtime.spawn_blocking(move || {
                    let _e = span.enter();
                    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| callback(&*event)));
                    sink.settle(name, event_type, outcome.map(Ok));
                });
            }
        }
    }

    /// Releases the handler so no further dispatch can start.
    ///
    /// The handler is dropped after the slot lock is released.
    pub(crate) fn dispose(&self) {
        let handler = self
            .handler
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(handler);
    }
}
