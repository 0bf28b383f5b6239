use tokio::runtime::Handle;
use typed_builder::TypedBuilder;

use crate::error::HandlerFailure;

#[derive(TypedBuilder)]
pub struct EventAggregatorConfig {
    /// The runtime event handlers are dispatched on. If not specified, the runtime the aggregator
    /// is created in is used.
    #[builder(default, setter(strip_option))]
    pub(crate) runtime: Option<Handle>,
    /// A boxed anonymous function receiving every handler failure after it has been logged,
    /// commonly used for reporting purposes.
    #[builder(default = Box::new(| _ | ()))]
    pub(crate) error_handler: Box<dyn Fn(HandlerFailure) + Send + Sync>,
}

impl Default for EventAggregatorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
