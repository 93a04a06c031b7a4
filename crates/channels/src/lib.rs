//! Boundary between the relay core and per-network clients.
//!
//! Each network client (Telegram bot, Discord bot) implements
//! [`ChannelOutbound`] for sending and [`MediaSink`] for re-uploading
//! attachments, and feeds normalized events into a [`ChannelEventSink`].
//! The [`ChannelRegistry`] maps a [`Network`] to its client.
//!
//! [`MediaSink`]: crossrelay_media::MediaSink
//! [`Network`]: crossrelay_common::Network

pub mod error;
pub mod plugin;
pub mod registry;

pub use {
    error::{Error, Result},
    plugin::{ChannelEventSink, ChannelOutbound, DeliveryReceipt},
    registry::{ChannelRegistry, NetworkClient},
};
