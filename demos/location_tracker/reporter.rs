use eventing::{EventSubscriber, Unsubscriber};

use crate::location::{Location, LocationChanged};

/// Prints the current location under its source name while subscribed.
pub struct LocationReporter<S> {
    subscriber: S,
    name: String,
    unsubscriber: Option<Unsubscriber>,
}

impl<S> LocationReporter<S>
where
    S: EventSubscriber,
{
    pub fn new(subscriber: S, name: impl Into<String>) -> Self {
        Self {
            subscriber,
            name: name.into(),
            unsubscriber: None,
        }
    }

    pub fn subscribe(&mut self) {
        if self.unsubscriber.is_some() {
            return;
        }

        let name = self.name.clone();
        self.unsubscriber = Some(
            self.subscriber
                .subscribe_fn(move |event: &LocationChanged| report(&name, event.new_location)),
        );
    }

    pub fn unsubscribe(&mut self) {
        if let Some(unsubscriber) = self.unsubscriber.take() {
            unsubscriber.unsubscribe();
        }
    }
}

fn report(name: &str, location: Option<Location>) {
    match location {
        Some(location) => println!("{}: The current location is {}", name, location),
        None => println!("{}: The location cannot be determined.", name),
    }
}
