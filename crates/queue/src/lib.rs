//! Delay/batch queue.
//!
//! Work items wait until their scheduled time, album parts are coalesced
//! inside a collection window, and a single worker delivers one item at a
//! time in scheduled-time order.
//!
//! [`Scheduler`] holds the state and takes explicit instants, so it can be
//! driven synchronously. [`spawn_queue`] wraps it in an actor task that owns
//! the state and talks to callers through [`QueueHandle`].

pub mod error;
pub mod item;
pub mod scheduler;
pub mod worker;

pub use {
    error::{Error, Result},
    item::{WorkItem, WorkKind, WorkPayload},
    scheduler::{BatchKey, CollectOutcome, QueueStats, Scheduler},
    worker::{Deliver, QueueHandle, spawn_queue},
};
