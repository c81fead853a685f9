use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::package::{Experience, Mood, Package, StatusBadge};

/// Active tag constraints. An empty set places no constraint on its dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub experience: BTreeSet<Experience>,
    #[serde(default)]
    pub mood: BTreeSet<Mood>,
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        self.experience.is_empty() && self.mood.is_empty()
    }

    /// Checkbox semantics: selects the tag, or deselects it if already selected.
    pub fn toggle_experience(&mut self, tag: Experience) {
        if !self.experience.remove(&tag) {
            self.experience.insert(tag);
        }
    }

    pub fn toggle_mood(&mut self, tag: Mood) {
        if !self.mood.remove(&tag) {
            self.mood.insert(tag);
        }
    }

    pub fn clear(&mut self) {
        self.experience.clear();
        self.mood.clear();
    }

    /// AND across dimensions, OR within one. A missing tag never matches a
    /// non-empty dimension.
    pub fn matches(&self, pkg: &Package) -> bool {
        let experience_ok = self.experience.is_empty()
            || pkg.experience.as_ref().is_some_and(|tag| self.experience.contains(tag));
        let mood_ok =
            self.mood.is_empty() || pkg.mood.as_ref().is_some_and(|tag| self.mood.contains(tag));
        experience_ok && mood_ok
    }
}

/// Stable filter: survivors keep their input order.
pub fn filter(catalog: &[Package], selection: &FilterSelection) -> Vec<Package> {
    catalog.iter().filter(|pkg| selection.matches(pkg)).cloned().collect()
}

/// Case-insensitive substring search over title, location and description.
pub fn search(catalog: &[Package], query: &str) -> Vec<Package> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return catalog.to_vec();
    }

    catalog
        .iter()
        .filter(|pkg| {
            pkg.title.to_lowercase().contains(&needle)
                || pkg.location.as_deref().is_some_and(|l| l.to_lowercase().contains(&needle))
                || pkg.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

// ============================================================================
// Featured category strip
// ============================================================================

/// Category chips on the home page: `All`, the `Bestseller` badge, or a
/// free-form category such as `International` or `Domestic`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FeaturedCategory {
    #[default]
    All,
    Bestseller,
    Category(String),
}

impl FeaturedCategory {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" => FeaturedCategory::All,
            v if v.eq_ignore_ascii_case("all") => FeaturedCategory::All,
            v if v.eq_ignore_ascii_case("bestseller") => FeaturedCategory::Bestseller,
            v => FeaturedCategory::Category(v.to_string()),
        }
    }

    pub fn matches(&self, pkg: &Package) -> bool {
        match self {
            FeaturedCategory::All => true,
            FeaturedCategory::Bestseller => pkg.status == Some(StatusBadge::Bestseller),
            FeaturedCategory::Category(name) => {
                pkg.category.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(name))
            }
        }
    }

    pub fn apply(&self, catalog: &[Package]) -> Vec<Package> {
        catalog.iter().filter(|pkg| self.matches(pkg)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Package> {
        vec![
            Package::new("1", "Goa", 1000.0)
                .with_rating(4.5)
                .with_experience(Experience::Beach)
                .with_mood(Mood::Romantic),
            Package::new("2", "Manali", 500.0)
                .with_rating(4.9)
                .with_experience(Experience::Mountain)
                .with_mood(Mood::SoloAdventure),
            Package::new("3", "Jaipur", 700.0).with_experience(Experience::Cultural),
            Package::new("4", "Untagged", 100.0),
        ]
    }

    fn ids(packages: &[Package]) -> Vec<&str> {
        packages.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_empty_selection_returns_whole_catalog() {
        let catalog = catalog();
        assert_eq!(filter(&catalog, &FilterSelection::default()), catalog);
    }

    #[test]
    fn test_single_experience() {
        let mut selection = FilterSelection::default();
        selection.toggle_experience(Experience::Beach);
        assert_eq!(ids(&filter(&catalog(), &selection)), vec!["1"]);
    }

    #[test]
    fn test_or_within_dimension_preserves_order() {
        let mut selection = FilterSelection::default();
        selection.toggle_experience(Experience::Cultural);
        selection.toggle_experience(Experience::Beach);
        assert_eq!(ids(&filter(&catalog(), &selection)), vec!["1", "3"]);
    }

    #[test]
    fn test_and_across_dimensions() {
        let mut selection = FilterSelection::default();
        selection.toggle_experience(Experience::Beach);
        selection.toggle_experience(Experience::Mountain);
        selection.toggle_mood(Mood::SoloAdventure);
        assert_eq!(ids(&filter(&catalog(), &selection)), vec!["2"]);
    }

    #[test]
    fn test_missing_tag_never_matches_active_dimension() {
        let mut selection = FilterSelection::default();
        selection.toggle_mood(Mood::FamilyFriendly);
        assert!(filter(&catalog(), &selection).is_empty());
    }

    #[test]
    fn test_toggle_twice_clears() {
        let mut selection = FilterSelection::default();
        selection.toggle_mood(Mood::Romantic);
        selection.toggle_mood(Mood::Romantic);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_every_result_satisfies_rule() {
        let catalog = catalog();
        let mut selection = FilterSelection::default();
        selection.toggle_experience(Experience::Mountain);
        selection.toggle_experience(Experience::Beach);
        selection.toggle_mood(Mood::Romantic);

        let result = filter(&catalog, &selection);
        for pkg in &result {
            assert!(catalog.contains(pkg));
            assert!(selection.experience.contains(pkg.experience.as_ref().unwrap()));
            assert!(selection.mood.contains(pkg.mood.as_ref().unwrap()));
        }
        assert_eq!(ids(&result), vec!["1"]);
    }

    #[test]
    fn test_search() {
        let mut catalog = catalog();
        catalog[2].location = Some("Rajasthan, India".to_string());
        assert_eq!(ids(&search(&catalog, "  rajasthan")), vec!["3"]);
        assert_eq!(search(&catalog, "").len(), 4);
    }

    #[test]
    fn test_featured_category() {
        let catalog = vec![
            Package::new("1", "Paris", 95000.0)
                .with_status(StatusBadge::Bestseller)
                .with_category("International"),
            Package::new("2", "Kerala", 45000.0).with_category("Domestic"),
        ];
        assert_eq!(FeaturedCategory::parse("All").apply(&catalog).len(), 2);
        assert_eq!(ids(&FeaturedCategory::parse("Bestseller").apply(&catalog)), vec!["1"]);
        assert_eq!(ids(&FeaturedCategory::parse("domestic").apply(&catalog)), vec!["2"]);
    }
}
