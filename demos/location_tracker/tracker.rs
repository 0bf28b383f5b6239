use eventing::EventPublisher;

use crate::location::{Location, LocationChanged};

pub struct LocationTracker<P> {
    publisher: P,
}

impl<P> LocationTracker<P>
where
    P: EventPublisher,
{
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }

    pub fn track_location(&self, location: Option<Location>) {
        self.publisher.publish(LocationChanged {
            new_location: location,
        });
    }
}
