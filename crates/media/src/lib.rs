//! Attachment resolution: pick the first media reference on a message (or
//! its reply chain) that can be fetched and re-uploaded to a destination.

pub mod candidate;
pub mod error;
pub mod resolver;
pub mod sink;

pub use {
    candidate::{MediaCandidate, SourceLabel, collect_candidates},
    error::{Error, Result},
    resolver::{BatchResolution, Resolution, resolve, resolve_all},
    sink::{Attachment, FetchLocation, MediaSink},
};
