/// Profile directory: every user profile lives in one JSON array under `users`
use crate::error::Result;
use crate::kv::KvStore;
use crate::messenger_types::UserId;
use serde::{Deserialize, Serialize};
use tracing::warn;

const USERS_KEY: &str = "users";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Profile {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: None,
            bio: None,
            skills: Vec::new(),
        }
    }
}

pub struct ProfileStore<K> {
    kv: K,
}

impl<K: KvStore> ProfileStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// All profiles in directory order; an unreadable directory is empty
    pub fn all(&self) -> Vec<Profile> {
        let raw = match self.kv.get(USERS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read profile directory: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Profile>>(&raw) {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!("Treating profile directory as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Insert or replace the profile with the same id
    pub fn save(&self, profile: Profile) -> Result<()> {
        let mut profiles = self.all();
        match profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile,
            None => profiles.push(profile),
        }
        let json = serde_json::to_string(&profiles)?;
        self.kv.set(USERS_KEY, &json)
    }

    pub fn get(&self, id: &UserId) -> Option<Profile> {
        self.all().into_iter().find(|p| &p.id == id)
    }

    /// Every known user except `id`
    pub fn others(&self, id: &UserId) -> Vec<UserId> {
        self.all()
            .into_iter()
            .map(|p| p.id)
            .filter(|other| other != id)
            .collect()
    }

    pub fn remove(&self, id: &UserId) -> Result<bool> {
        let mut profiles = self.all();
        let before = profiles.len();
        profiles.retain(|p| &p.id != id);
        if profiles.len() == before {
            return Ok(false);
        }
        let json = serde_json::to_string(&profiles)?;
        self.kv.set(USERS_KEY, &json)?;
        Ok(true)
    }
}

impl<K: Clone> Clone for ProfileStore<K> {
    fn clone(&self) -> Self {
        Self { kv: self.kv.clone() }
    }
}
