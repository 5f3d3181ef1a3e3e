/// Entity filter engine: AND-composed predicates over listings and events
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Record fields the filter engine knows how to inspect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Category,
    Location,
    Date,
    /// Helper of a listing, curator of an event
    Actor,
}

impl Field {
    /// Fields concatenated for free-text search
    pub const SEARCH: [Field; 3] = [Field::Title, Field::Description, Field::Actor];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Field::Title),
            "description" => Some(Field::Description),
            "category" => Some(Field::Category),
            "location" => Some(Field::Location),
            "date" => Some(Field::Date),
            "helper" | "curator" | "actor" => Some(Field::Actor),
            _ => None,
        }
    }
}

/// A record the engine can filter; `None` means the record lacks the field
pub trait Filterable {
    fn field(&self, field: Field) -> Option<&str>;
}

/// Current filter values; empty strings count as unset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub date: String,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs; unknown names are ignored
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut criteria = Self::default();
        for (name, value) in pairs {
            criteria.set(name, value);
        }
        criteria
    }

    /// Set one criterion by name; returns false for an unrecognized name
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        let slot = match name {
            "search" => &mut self.search,
            "category" => &mut self.category,
            "location" => &mut self.location,
            "date" => &mut self.date,
            _ => return false,
        };
        *slot = value.to_string();
        true
    }

    pub fn search(mut self, value: impl Into<String>) -> Self {
        self.search = value.into();
        self
    }

    pub fn category(mut self, value: impl Into<String>) -> Self {
        self.category = value.into();
        self
    }

    pub fn location(mut self, value: impl Into<String>) -> Self {
        self.location = value.into();
        self
    }

    pub fn date(mut self, value: impl Into<String>) -> Self {
        self.date = value.into();
        self
    }

    /// No criterion is active
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.category.is_empty()
            && self.location.is_empty()
            && self.date.is_empty()
    }

    /// Every active criterion passes for `record`
    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        if !self.search.is_empty() && !matches_search(record, &self.search) {
            return false;
        }
        if !self.category.is_empty() && record.field(Field::Category) != Some(self.category.as_str()) {
            return false;
        }
        if !self.location.is_empty() && !contains_ignore_case(record.field(Field::Location), &self.location) {
            return false;
        }
        if !self.date.is_empty() && record.field(Field::Date) != Some(self.date.as_str()) {
            return false;
        }
        true
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

fn matches_search<R: Filterable + ?Sized>(record: &R, term: &str) -> bool {
    let parts: Vec<&str> = Field::SEARCH
        .iter()
        .filter_map(|f| record.field(*f))
        .collect();
    if parts.is_empty() {
        return false;
    }
    // Newline-joined so a term cannot straddle two fields
    parts.join("\n").to_lowercase().contains(&term.to_lowercase())
}

/// Records passing every active criterion, in source order
pub fn filter<'a, R: Filterable>(records: &'a [R], criteria: &FilterCriteria) -> Vec<&'a R> {
    records.iter().filter(|r| criteria.matches(*r)).collect()
}

/// Sorted unique values of `field`, for populating option lists
///
/// Records missing the field, or holding an empty value, contribute nothing.
pub fn distinct_values<R: Filterable>(records: &[R], field: Field) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.field(field))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Rec {
        title: Option<&'static str>,
        description: Option<&'static str>,
        category: Option<&'static str>,
        location: Option<&'static str>,
        date: Option<&'static str>,
        actor: Option<&'static str>,
    }

    impl Filterable for Rec {
        fn field(&self, field: Field) -> Option<&str> {
            match field {
                Field::Title => self.title,
                Field::Description => self.description,
                Field::Category => self.category,
                Field::Location => self.location,
                Field::Date => self.date,
                Field::Actor => self.actor,
            }
        }
    }

    fn rec(title: &'static str, category: &'static str, location: &'static str) -> Rec {
        Rec {
            title: Some(title),
            category: Some(category),
            location: Some(location),
            ..Default::default()
        }
    }

    fn sample() -> Vec<Rec> {
        vec![
            rec("Garden Help", "service", "Downtown"),
            rec("Guitar Lessons", "skill", "Westside"),
        ]
    }

    #[test]
    fn test_and_composition() {
        let records = sample();

        let hit = filter(&records, &FilterCriteria::new().search("garden").category("service"));
        assert_eq!(hit, vec![&records[0]]);

        let miss = filter(&records, &FilterCriteria::new().search("garden").category("skill"));
        assert!(miss.is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let records = sample();
        let hit = filter(&records, &FilterCriteria::new().search("GUITAR"));
        assert_eq!(hit, vec![&records[1]]);
    }

    #[test]
    fn test_search_covers_description_and_actor() {
        let mut r = rec("Odd jobs", "service", "Eastside");
        r.description = Some("Fence painting and repairs");
        r.actor = Some("Priya Raman");
        let records = vec![r];

        assert_eq!(filter(&records, &FilterCriteria::new().search("painting")).len(), 1);
        assert_eq!(filter(&records, &FilterCriteria::new().search("raman")).len(), 1);
        // No match across the title/description boundary
        assert!(filter(&records, &FilterCriteria::new().search("jobs fence")).is_empty());
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let records = sample();
        let criteria = FilterCriteria::from_pairs([
            ("search", ""),
            ("category", ""),
            ("location", ""),
            ("date", ""),
        ]);
        assert!(criteria.is_empty());
        assert_eq!(filter(&records, &criteria), vec![&records[0], &records[1]]);
    }

    #[test]
    fn test_category_is_case_sensitive() {
        let records = sample();
        assert!(filter(&records, &FilterCriteria::new().category("Service")).is_empty());
    }

    #[test]
    fn test_location_is_partial_match() {
        let records = sample();
        let hit = filter(&records, &FilterCriteria::new().location("town"));
        assert_eq!(hit, vec![&records[0]]);
    }

    #[test]
    fn test_missing_field_never_matches() {
        let records = vec![Rec {
            title: Some("Untitled"),
            ..Default::default()
        }];
        assert!(filter(&records, &FilterCriteria::new().location("x")).is_empty());
        assert!(filter(&records, &FilterCriteria::new().date("2024-05-01")).is_empty());
        assert!(filter(&records, &FilterCriteria::new().category("service")).is_empty());
        assert_eq!(filter(&records, &FilterCriteria::new()).len(), 1);
    }

    #[test]
    fn test_from_pairs_ignores_unknown_keys() {
        let criteria = FilterCriteria::from_pairs([("category", "skill"), ("colour", "red")]);
        assert_eq!(criteria, FilterCriteria::new().category("skill"));
    }

    #[test]
    fn test_distinct_values_sorted_unique() {
        let records = vec![
            rec("x", "b", ""),
            rec("y", "a", ""),
            rec("z", "b", ""),
        ];
        assert_eq!(distinct_values(&records, Field::Category), vec!["a", "b"]);
        assert!(distinct_values(&records, Field::Location).is_empty());
    }

    #[test]
    fn test_field_parse() {
        assert_eq!(Field::parse("curator"), Some(Field::Actor));
        assert_eq!(Field::parse("location"), Some(Field::Location));
        assert_eq!(Field::parse("price"), None);
    }
}
