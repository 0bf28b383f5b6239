use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;

use crate::aggregator::Inner;
use crate::types::{EventTypeKey, SubscriptionToken};

/// The right to cancel one subscription, returned by every subscribe call.
///
/// [`unsubscribe`](Self::unsubscribe) is the only way to revoke the subscription: dropping an
/// `Unsubscriber` leaves the handler subscribed. The handle only refers back to its aggregator and
/// does not keep it alive.
#[must_use = "the subscription can only be revoked through its Unsubscriber"]
pub struct Unsubscriber {
    aggregator: Weak<Inner>,
    key: EventTypeKey,
    token: SubscriptionToken,
    revoked: AtomicBool,
}

impl Unsubscriber {
    pub(crate) fn new(
        aggregator: Weak<Inner>,
        key: EventTypeKey,
        token: SubscriptionToken,
    ) -> Self {
        Self {
            aggregator,
            key,
            token,
            revoked: AtomicBool::new(false),
        }
    }

    /// Removes the subscription from its aggregator. Calling it again is a no-op.
    ///
    /// A delivery already handed to the handler before this call still runs to completion.
    pub fn unsubscribe(&self) {
        if self.revoked.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(aggregator) = self.aggregator.upgrade() {
            aggregator.remove(&self.key, &self.token);
        }
    }

    /// Whether [`unsubscribe`](Self::unsubscribe) has been called on this handle.
    pub fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::Acquire)
    }

    /// The token identifying the subscription.
    pub fn token(&self) -> SubscriptionToken {
        self.token
    }

    /// The event type the subscription was made for.
    pub fn event_type(&self) -> EventTypeKey {
        self.key
    }
}

impl std::fmt::Debug for Unsubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscriber")
            .field("event_type", &self.key)
            .field("token", &self.token)
            .field("revoked", &self.is_revoked())
            .finish()
    }
}
