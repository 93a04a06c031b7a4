//! Entity-annotated text to destination markup.
//!
//! Source networks deliver text as a body plus a flat list of styling spans.
//! [`render`] rebuilds the span nesting as an [`EntityTree`] and prints it in
//! a destination [`Dialect`]: Discord Markdown or Telegram HTML.

pub mod chunk;
pub mod dialect;
pub mod link;
pub mod render;
pub mod tree;

pub use {
    chunk::{chunk_message, message_len},
    dialect::{Dialect, DiscordMarkdown, TelegramHtml, dialect_for},
    link::normalize_url,
    render::{render, render_chunks},
    tree::{EntityTree, Node},
};
