/// Marker for every value that can flow through an [`EventAggregator`](crate::EventAggregator).
///
/// Events are moved into the aggregator on publish and shared with every handler behind an
/// [`Arc`](std::sync::Arc), so they only need to be safe to share across threads.
pub trait Event: Send + Sync + 'static {}

impl<T> Event for T where T: Send + Sync + 'static {}
