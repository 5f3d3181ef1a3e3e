/// Commonplace - community marketplace core
///
/// Conversation storage over a pluggable key-value store, plus the
/// filter engine used for browsing listings and events.

pub mod error;
pub mod config;
pub mod kv;
pub mod messenger_types;
pub mod message_store;
pub mod filter;
pub mod catalog;
pub mod profile_store;
pub mod watchlist;
pub mod cli_app;

pub use error::{AppError, Result};
pub use config::Config;
pub use kv::{KvStore, MemoryKv, SledKv};
pub use messenger_types::{ConversationSummary, Message, UserId};
pub use message_store::{conversation_key, MessageStore};
pub use filter::{distinct_values, filter, Field, FilterCriteria, Filterable};
pub use catalog::{Catalog, Event, Listing};
