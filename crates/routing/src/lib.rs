//! Route table: which configured routes apply to an inbound event.
//!
//! A [`RouteTable`] is built once from a validated [`RelayConfig`] and never
//! mutated afterwards. Matching walks the routes in configuration order and
//! keeps every enabled route whose source constraints all hold.
//!
//! [`RelayConfig`]: crossrelay_config::RelayConfig

pub mod error;
pub mod route;
pub mod table;
pub mod throttle;

pub use {
    error::{Error, Result},
    route::{Destination, Route, RouteOptions, SourceMatcher, Target, normalize_handle},
    table::RouteTable,
    throttle::LogThrottle,
};
