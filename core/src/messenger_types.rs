/// Shared types for the messaging layer
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Opaque user identifier: numeric or string
///
/// Numeric ids order numerically and string ids lexicographically. A numeric
/// id always orders before a string id so mixed pairs still have a stable
/// canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Num(u64),
    Name(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Num(n) => write!(f, "{}", n),
            UserId::Name(s) => write!(f, "{}", s),
        }
    }
}

impl UserId {
    /// Unambiguous rendering for use inside `:`-separated storage keys
    ///
    /// Numeric ids and ordinary names render as their `Display` form. In a
    /// name, `\` and `:` are backslash-escaped, and a digits-only name gets a
    /// leading `\` so it never reads as a numeric id.
    pub fn key_segment(&self) -> Cow<'_, str> {
        match self {
            UserId::Num(n) => Cow::Owned(n.to_string()),
            UserId::Name(s) => {
                let digits_only = !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
                if !digits_only && !s.contains(['\\', ':']) {
                    return Cow::Borrowed(s.as_str());
                }
                let mut out = String::with_capacity(s.len() + 2);
                if digits_only {
                    out.push('\\');
                }
                for c in s.chars() {
                    if c == '\\' || c == ':' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                Cow::Owned(out)
            }
        }
    }
}

impl From<u64> for UserId {
    fn from(n: u64) -> Self {
        UserId::Num(n)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId::Name(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        UserId::Name(s)
    }
}

/// Digits-only input becomes a numeric id, anything else a string id
impl FromStr for UserId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.parse::<u64>() {
            Ok(n) => UserId::Num(n),
            Err(_) => UserId::Name(s.to_string()),
        })
    }
}

/// One message in a two-party conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a message, rejecting blank text
    pub fn new(
        id: u64,
        sender_id: UserId,
        recipient_id: UserId,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AppError::InvalidMessage(
                "message text is empty".to_string(),
            ));
        }
        Ok(Self {
            id,
            sender_id,
            recipient_id,
            text,
            timestamp,
        })
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Summary of one conversation thread (for the inbox view)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// The other participant
    pub other_user: UserId,
    /// Chronologically last message of the thread
    pub last_message: Message,
    pub message_count: usize,
}
