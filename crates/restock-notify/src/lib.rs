//! Restock alert delivery through the Telegram Bot API.

pub mod client;
pub mod error;
pub mod message;
pub(crate) mod retry;

pub use client::TelegramNotifier;
pub use error::NotifyError;
pub use message::restock_message;
