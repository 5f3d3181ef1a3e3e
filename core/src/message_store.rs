/// Conversation persistence: one append-only message list per user pair
/// Frugal: the whole thread is one JSON array under its conversation key
use crate::error::{AppError, Result};
use crate::kv::KvStore;
use crate::messenger_types::{ConversationSummary, Message, UserId};
use chrono::Utc;
use tracing::{debug, warn};

const KEY_PREFIX: &str = "messages";
const KEY_SEPARATOR: char = ':';

/// Canonical key for the conversation between `a` and `b`
///
/// Order-independent: `conversation_key(a, b) == conversation_key(b, a)`.
/// Ids are written through [`UserId::key_segment`], so distinct pairs never
/// share a key. Changing the prefix or separator orphans every stored thread.
pub fn conversation_key(a: &UserId, b: &UserId) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!(
        "{KEY_PREFIX}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
        lo.key_segment(),
        hi.key_segment()
    )
}

pub struct MessageStore<K> {
    kv: K,
}

impl<K: KvStore> MessageStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Load a thread, surfacing a corrupt payload as an error
    pub fn try_load_messages(&self, key: &str) -> Result<Vec<Message>> {
        let raw = match self.kv.get(key)? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };

        serde_json::from_str::<Vec<Message>>(&raw).map_err(|e| AppError::CorruptStore {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// Load a thread; missing or unreadable threads are empty
    pub fn load_messages(&self, key: &str) -> Vec<Message> {
        match self.try_load_messages(key) {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Treating conversation {} as empty: {}", key, e);
                Vec::new()
            }
        }
    }

    /// Append `message` at the tail of the thread and return the new thread
    ///
    /// Blank messages are dropped and the current thread is returned as is.
    /// This is a plain read-modify-write: two writers interleaving on the
    /// same key can lose one append.
    ///
    /// Only a corrupt payload is replaced; a failed read is returned as an
    /// error so the stored thread is never overwritten blind.
    pub fn append_message(&self, key: &str, message: Message) -> Result<Vec<Message>> {
        if message.is_blank() {
            debug!("Dropping blank message {} for {}", message.id, key);
            return Ok(self.load_messages(key));
        }

        let mut messages = match self.try_load_messages(key) {
            Ok(messages) => messages,
            Err(e @ AppError::CorruptStore { .. }) => {
                warn!("Replacing corrupt conversation: {}", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        messages.push(message);
        let json = serde_json::to_string(&messages)?;
        self.kv.set(key, &json)?;

        debug!("Appended message to {} ({} total)", key, messages.len());
        Ok(messages)
    }

    /// Compose and store a message from `from` to `to`, stamped now
    ///
    /// Returns `None` when `text` is blank.
    pub fn send(&self, from: &UserId, to: &UserId, text: &str) -> Result<Option<Message>> {
        let key = conversation_key(from, to);
        let now = Utc::now();

        let last_id = self
            .load_messages(&key)
            .iter()
            .map(|m| m.id)
            .max()
            .unwrap_or(0);
        let id = (now.timestamp_millis().max(0) as u64).max(last_id.saturating_add(1));

        let message = match Message::new(id, from.clone(), to.clone(), text, now) {
            Ok(m) => m,
            Err(AppError::InvalidMessage(reason)) => {
                debug!("Not sending from {} to {}: {}", from, to, reason);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        self.append_message(&key, message.clone())?;
        Ok(Some(message))
    }

    /// Thread between two users, in insertion order
    pub fn thread(&self, a: &UserId, b: &UserId) -> Vec<Message> {
        self.load_messages(&conversation_key(a, b))
    }

    /// Inbox view for `user`: one summary per non-empty thread, newest first
    pub fn list_conversations_for(
        &self,
        user: &UserId,
        others: &[UserId],
    ) -> Vec<ConversationSummary> {
        let mut out = Vec::new();

        for other in others {
            let mut messages = self.load_messages(&conversation_key(user, other));
            if messages.is_empty() {
                continue;
            }

            let message_count = messages.len();
            // Stable sort: equal timestamps keep insertion order, so the later insert wins
            messages.sort_by_key(|m| m.timestamp);
            if let Some(last_message) = messages.pop() {
                out.push(ConversationSummary {
                    other_user: other.clone(),
                    last_message,
                    message_count,
                });
            }
        }

        out.sort_by(|a, b| b.last_message.timestamp.cmp(&a.last_message.timestamp));
        out
    }
}

impl<K: Clone> Clone for MessageStore<K> {
    fn clone(&self) -> Self {
        Self {
            kv: self.kv.clone(),
        }
    }
}
