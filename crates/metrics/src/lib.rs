//! Metric names for crossrelay, plus re-exports of the `metrics` facade.
//!
//! Crates record through these macros behind their own `metrics` feature.
//! Nothing is exported unless the host process installs a recorder.
//!
//! ```rust,ignore
//! use crossrelay_metrics::{counter, queue};
//!
//! counter!(queue::DELIVERED_TOTAL, "route" => route_id).increment(1);
//! ```

mod definitions;

pub use definitions::*;

pub use metrics::{counter, gauge, histogram};
