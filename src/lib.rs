//! In-process publish/subscribe event aggregator.
//!
//! Components subscribe a handler to an event type and get back an [`Unsubscriber`]; any component
//! holding the [`EventAggregator`] can publish a value of that type, which is delivered to every
//! handler subscribed at that moment. Each delivery runs in its own tokio task, so publishers never
//! wait on handlers and a failing handler only affects itself.
//!
//! ```rust
//! use eventing::EventAggregator;
//!
//! #[derive(Debug)]
//! struct LocationChanged {
//!     latitude: f64,
//!     longitude: f64,
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let aggregator = EventAggregator::with_runtime(tokio::runtime::Handle::current());
//!
//! let unsubscriber = aggregator.subscribe_fn(|event: &LocationChanged| {
//!     println!("now at {}, {}", event.latitude, event.longitude);
//! });
//!
//! aggregator.publish(LocationChanged {
//!     latitude: 47.6456,
//!     longitude: -122.1312,
//! });
//!
//! unsubscriber.unsubscribe();
//! aggregator.dispose();
//! # }
//! ```

pub use crate::aggregator::{EventAggregator, EventAggregatorConfig, Unsubscriber};
pub use crate::bus::{EventPublisher, EventSubscriber};
pub use crate::error::{AggregatorError, HandlerFailure};
pub use crate::event::Event;
pub use crate::handler::{BoxError, EventHandler};
pub use crate::types::{EventTypeKey, SubscriptionToken};

mod aggregator;
pub mod bus;
pub mod error;
pub mod event;
pub mod handler;
pub mod types;
