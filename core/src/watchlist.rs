/// Per-user watchlist of listing ids, stored under `watchlist:{user}`
use crate::catalog::Listing;
use crate::error::Result;
use crate::kv::KvStore;
use crate::messenger_types::UserId;
use tracing::{debug, warn};

fn watchlist_key(user: &UserId) -> String {
    format!("watchlist:{}", user.key_segment())
}

pub struct Watchlist<K> {
    kv: K,
}

impl<K: KvStore> Watchlist<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Watched listing ids in the order they were added
    pub fn list(&self, user: &UserId) -> Vec<u64> {
        let key = watchlist_key(user);
        let raw = match self.kv.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Treating {} as empty: {}", key, e);
            Vec::new()
        })
    }

    pub fn contains(&self, user: &UserId, listing_id: u64) -> bool {
        self.list(user).contains(&listing_id)
    }

    /// Returns false if the listing was already watched
    pub fn add(&self, user: &UserId, listing_id: u64) -> Result<bool> {
        let mut ids = self.list(user);
        if ids.contains(&listing_id) {
            return Ok(false);
        }
        ids.push(listing_id);
        self.write(user, &ids)?;
        Ok(true)
    }

    /// Returns false if the listing was not watched
    pub fn remove(&self, user: &UserId, listing_id: u64) -> Result<bool> {
        let mut ids = self.list(user);
        let before = ids.len();
        ids.retain(|id| *id != listing_id);
        if ids.len() == before {
            return Ok(false);
        }
        self.write(user, &ids)?;
        Ok(true)
    }

    /// Flip membership; returns whether the listing is now watched
    pub fn toggle(&self, user: &UserId, listing_id: u64) -> Result<bool> {
        if self.remove(user, listing_id)? {
            Ok(false)
        } else {
            self.add(user, listing_id)
        }
    }

    /// Watched listings resolved against `listings`; unknown ids are skipped
    pub fn watched_listings<'a>(&self, user: &UserId, listings: &'a [Listing]) -> Vec<&'a Listing> {
        self.list(user)
            .into_iter()
            .filter_map(|id| listings.iter().find(|l| l.id == id))
            .collect()
    }

    fn write(&self, user: &UserId, ids: &[u64]) -> Result<()> {
        let json = serde_json::to_string(ids)?;
        self.kv.set(&watchlist_key(user), &json)?;
        debug!("Watchlist for {} now has {} entries", user, ids.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::kv::MemoryKv;

    #[test]
    fn test_toggle() {
        let wl = Watchlist::new(MemoryKv::new());
        let user = UserId::Num(1);

        assert!(wl.toggle(&user, 3).unwrap());
        assert!(wl.contains(&user, 3));
        assert!(!wl.toggle(&user, 3).unwrap());
        assert!(!wl.contains(&user, 3));
    }

    #[test]
    fn test_add_is_idempotent() {
        let wl = Watchlist::new(MemoryKv::new());
        let user = UserId::from("maya");
        assert!(wl.add(&user, 2).unwrap());
        assert!(!wl.add(&user, 2).unwrap());
        assert!(wl.add(&user, 1).unwrap());
        assert_eq!(wl.list(&user), vec![2, 1]);
    }

    #[test]
    fn test_watchlists_are_per_user() {
        let wl = Watchlist::new(MemoryKv::new());
        wl.add(&UserId::Num(1), 5).unwrap();
        assert!(wl.list(&UserId::Num(2)).is_empty());
    }

    #[test]
    fn test_watched_listings_skip_unknown() {
        let catalog = Catalog::sample();
        let wl = Watchlist::new(MemoryKv::new());
        let user = UserId::Num(1);
        wl.add(&user, 4).unwrap();
        wl.add(&user, 99).unwrap();
        wl.add(&user, 1).unwrap();

        let titles: Vec<&str> = wl
            .watched_listings(&user, &catalog.listings)
            .into_iter()
            .map(|l| l.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Spanish Conversation", "Garden Help"]);
    }

    #[test]
    fn test_corrupt_watchlist_is_empty() {
        let kv = MemoryKv::new();
        kv.set("watchlist:1", "[1, \"two\"]").unwrap();
        let wl = Watchlist::new(kv);
        assert!(wl.list(&UserId::Num(1)).is_empty());
    }
}
