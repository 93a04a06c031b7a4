//! Relay wiring: inbound events in, rendered messages out.
//!
//! [`Dispatcher`] matches each inbound event against the route table and
//! hands one work item per matching route to the queue. When the queue
//! releases an item, [`DeliveryExecutor`] renders it for every destination,
//! re-uploads its attachment through the destination's media sink and sends
//! it. [`Relay`] builds and owns both.

pub mod compose;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod relay;

pub use {
    compose::{OutboundMessage, compose},
    dispatcher::Dispatcher,
    error::{Error, Result},
    executor::DeliveryExecutor,
    relay::Relay,
};

#[cfg(test)]
mod test_support;
