//! Telegram Bot API client and delivery cascade.
//!
//! The pieces compose bottom-up:
//!
//! - [`TelegramClient`] posts one [`MessagePayload`] over HTTP, retrying
//!   transient transport failures with the same payload.
//! - [`DeliveryCascade`] drives any [`RemoteSend`] implementation through up
//!   to three formatting tiers, reformatting one tier more conservatively per
//!   failure, so some readable form of the message always gets a chance.
//! - [`Messenger`] wires both up from a loaded [`tgram_config::Config`].

mod cascade;
mod client;
mod error;
mod messenger;
mod types;

pub use cascade::{DeliveryCascade, DeliveryTier};
pub use client::{RemoteSend, RetryPolicy, TelegramClient};
pub use error::SendFailure;
pub use messenger::Messenger;
pub use types::{ChatTarget, MessagePayload, ParseMode, RemoteResponse};
