use std::any::TypeId;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use uuid::Uuid;

use crate::event::Event;

/// Identifies the concrete type of an event. Registries are partitioned by this key.
///
/// Equality and hashing only look at the [`TypeId`]: two types sharing a name in different
/// modules get different keys. The type name is kept for diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct EventTypeKey {
    id: TypeId,
    name: &'static str,
}

impl EventTypeKey {
    /// Returns the key for the event type `E`.
    pub fn of<E>() -> Self
    where
        E: Event,
    {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
        }
    }

    /// The fully qualified name of the event type.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventTypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventTypeKey {}

impl Hash for EventTypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for EventTypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Unique identifier of one subscription, minted at subscribe time and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(Uuid);

impl SubscriptionToken {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for SubscriptionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<SubscriptionToken> for Uuid {
    fn from(token: SubscriptionToken) -> Self {
        token.0
    }
}
