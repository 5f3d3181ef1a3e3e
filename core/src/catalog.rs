/// Listings and events as supplied by the data source
/// The catalog file is read-only from the core's point of view
use crate::error::{AppError, Result};
use crate::filter::{Field, Filterable};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CATALOG_FILE: &str = "catalog.json";
const CATALOG_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Person offering the help or skill
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<String>,
}

impl Filterable for Listing {
    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Title => Some(self.title.as_str()),
            Field::Description => self.description.as_deref(),
            Field::Category => self.category.as_deref(),
            Field::Location => self.location.as_deref(),
            Field::Date => None,
            Field::Actor => self.helper.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curator: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
}

impl Filterable for Event {
    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Title => Some(self.title.as_str()),
            Field::Description => self.description.as_deref(),
            Field::Category => self.category.as_deref(),
            Field::Location => self.location.as_deref(),
            Field::Date => self.date.as_deref(),
            Field::Actor => self.curator.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFileV1 {
    version: u8,
    #[serde(default)]
    listings: Vec<Listing>,
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub listings: Vec<Listing>,
    pub events: Vec<Event>,
}

fn catalog_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CATALOG_FILE)
}

impl Catalog {
    /// Load `catalog.json` from the data dir, falling back to the sample set
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = catalog_path(data_dir);
        if !path.exists() {
            debug!("No catalog at {:?}, using sample catalog", path);
            return Ok(Self::sample());
        }

        let raw = fs::read_to_string(&path)?;
        let parsed: CatalogFileV1 = serde_json::from_str(&raw)?;
        if parsed.version != CATALOG_VERSION {
            return Err(AppError::Config(format!(
                "Unsupported catalog file version: {}",
                parsed.version
            )));
        }

        info!(
            "Loaded catalog: {} listings, {} events",
            parsed.listings.len(),
            parsed.events.len()
        );
        Ok(Self {
            listings: parsed.listings,
            events: parsed.events,
        })
    }

    /// Write the catalog as `catalog.json` in the data dir
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        let file = CatalogFileV1 {
            version: CATALOG_VERSION,
            listings: self.listings.clone(),
            events: self.events.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(catalog_path(data_dir), json)?;
        Ok(())
    }

    pub fn listing(&self, id: u64) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == id)
    }

    /// Built-in mock data used when no catalog file exists
    pub fn sample() -> Self {
        let listing = |id: u64,
                       title: &str,
                       description: &str,
                       category: &str,
                       location: &str,
                       helper: &str,
                       compensation: &str| Listing {
            id,
            title: title.to_string(),
            description: Some(description.to_string()),
            category: Some(category.to_string()),
            location: Some(location.to_string()),
            helper: Some(helper.to_string()),
            compensation: Some(compensation.to_string()),
            last_active: None,
        };

        let event = |id: u64,
                     title: &str,
                     description: &str,
                     date: &str,
                     time: &str,
                     location: &str,
                     category: &str,
                     curator: &str,
                     attendees: &[&str]| Event {
            id,
            title: title.to_string(),
            description: Some(description.to_string()),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            location: Some(location.to_string()),
            category: Some(category.to_string()),
            curator: Some(curator.to_string()),
            attendees: attendees.iter().map(|a| a.to_string()).collect(),
        };

        Self {
            listings: vec![
                listing(
                    1,
                    "Garden Help",
                    "Weeding, planting and seasonal cleanup for small yards",
                    "service",
                    "Downtown",
                    "Maria Lopez",
                    "Free",
                ),
                listing(
                    2,
                    "Guitar Lessons",
                    "Beginner acoustic guitar, chords and strumming",
                    "skill",
                    "Westside",
                    "Dev Patel",
                    "Skill swap",
                ),
                listing(
                    3,
                    "Grocery Runs",
                    "Weekly grocery pickup for neighbours who cannot drive",
                    "service",
                    "Northgate",
                    "Sam Okafor",
                    "Free",
                ),
                listing(
                    4,
                    "Spanish Conversation",
                    "Relaxed practice sessions over coffee",
                    "skill",
                    "Downtown Library",
                    "Lucia Fernandez",
                    "Coffee",
                ),
                listing(
                    5,
                    "Ladder to Lend",
                    "Six-foot step ladder available for short loans",
                    "item",
                    "Eastside",
                    "Tom Becker",
                    "Free",
                ),
            ],
            events: vec![
                event(
                    1,
                    "Community Cleanup",
                    "Bring gloves, bags are provided",
                    "2024-06-15",
                    "09:00",
                    "Riverside Park",
                    "environment",
                    "Maria Lopez",
                    &["Sam Okafor", "Dev Patel"],
                ),
                event(
                    2,
                    "Repair Cafe",
                    "Fix toasters, bikes and torn jackets together",
                    "2024-06-22",
                    "13:00",
                    "Downtown Community Hall",
                    "workshop",
                    "Tom Becker",
                    &["Lucia Fernandez"],
                ),
                event(
                    3,
                    "Seed Swap",
                    "Trade seeds and seedlings for the summer",
                    "2024-06-15",
                    "14:00",
                    "Westside Library",
                    "environment",
                    "Priya Raman",
                    &[],
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{distinct_values, filter, FilterCriteria};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_sample() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = Catalog::load(temp_dir.path()).unwrap();
        assert_eq!(catalog, Catalog::sample());
    }

    #[test]
    fn test_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut catalog = Catalog::sample();
        catalog.listings.truncate(2);
        catalog.save(temp_dir.path()).unwrap();

        let loaded = Catalog::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.listings.len(), 2);
        assert_eq!(loaded.events.len(), 3);
        assert_eq!(loaded.listing(2).map(|l| l.title.as_str()), Some("Guitar Lessons"));
    }

    #[test]
    fn test_unsupported_version() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CATALOG_FILE),
            r#"{"version": 2, "listings": [], "events": []}"#,
        )
        .unwrap();
        assert!(matches!(
            Catalog::load(temp_dir.path()),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_sparse_listing_json() {
        let listing: Listing = serde_json::from_str(r#"{"id": 9, "title": "Bare"}"#).unwrap();
        assert_eq!(listing.field(Field::Category), None);
        assert_eq!(listing.field(Field::Date), None);
    }

    #[test]
    fn test_events_filter_by_date() {
        let catalog = Catalog::sample();
        let hits = filter(&catalog.events, &FilterCriteria::new().date("2024-06-15"));
        let ids: Vec<u64> = hits.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let hits = filter(
            &catalog.events,
            &FilterCriteria::new().date("2024-06-15").search("priya"),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Seed Swap");
    }

    #[test]
    fn test_date_criterion_excludes_listings() {
        let catalog = Catalog::sample();
        assert!(filter(&catalog.listings, &FilterCriteria::new().date("2024-06-15")).is_empty());
    }

    #[test]
    fn test_listing_options() {
        let catalog = Catalog::sample();
        assert_eq!(
            distinct_values(&catalog.listings, Field::Category),
            vec!["item", "service", "skill"]
        );
        assert_eq!(
            distinct_values(&catalog.events, Field::Category),
            vec!["environment", "workshop"]
        );
    }
}
