//! Shared types and error definitions used across all crossrelay crates.

pub mod error;
pub mod types;

pub use {
    error::{Error, Result},
    types::{
        InboundEvent, LinkedMessage, MediaKind, MediaRef, Network, Span, SpanKind, StyledText,
    },
};
