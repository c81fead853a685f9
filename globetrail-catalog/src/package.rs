use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown whenever a package has no image of its own.
pub const FALLBACK_IMAGE: &str =
    "https://images.unsplash.com/photo-1476514525535-07fb3b4ae5f1?q=80&w=2070&auto=format&fit=crop";

// ============================================================================
// Tags
// ============================================================================

/// Experience type of a trip. Open enumeration: unknown labels are kept
/// verbatim in `Other` so they still compare equal to themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Experience {
    Beach,
    Mountain,
    CityBreak,
    Cultural,
    Safari,
    Other(String),
}

impl Experience {
    pub fn as_str(&self) -> &str {
        match self {
            Experience::Beach => "Beach",
            Experience::Mountain => "Mountain",
            Experience::CityBreak => "City Break",
            Experience::Cultural => "Cultural",
            Experience::Safari => "Safari",
            Experience::Other(label) => label,
        }
    }

    pub fn known() -> [Experience; 5] {
        [
            Experience::Beach,
            Experience::Mountain,
            Experience::CityBreak,
            Experience::Cultural,
            Experience::Safari,
        ]
    }
}

impl From<&str> for Experience {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        Experience::known()
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Experience::Other(trimmed.to_string()))
    }
}

impl From<String> for Experience {
    fn from(value: String) -> Self {
        Experience::from(value.as_str())
    }
}

impl From<Experience> for String {
    fn from(value: Experience) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trip mood.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mood {
    Romantic,
    FamilyFriendly,
    SoloAdventure,
    Other(String),
}

impl Mood {
    pub fn as_str(&self) -> &str {
        match self {
            Mood::Romantic => "Romantic",
            Mood::FamilyFriendly => "Family Friendly",
            Mood::SoloAdventure => "Solo Adventure",
            Mood::Other(label) => label,
        }
    }

    pub fn known() -> [Mood; 3] {
        [Mood::Romantic, Mood::FamilyFriendly, Mood::SoloAdventure]
    }
}

impl From<&str> for Mood {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        Mood::known()
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Mood::Other(trimmed.to_string()))
    }
}

impl From<String> for Mood {
    fn from(value: String) -> Self {
        Mood::from(value.as_str())
    }
}

impl From<Mood> for String {
    fn from(value: Mood) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Badge rendered on a package card. Also usable as a filter category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusBadge {
    Bestseller,
    New,
    Limited,
    Honeymoon,
    Adventure,
    Cultural,
    Other(String),
}

impl StatusBadge {
    pub fn as_str(&self) -> &str {
        match self {
            StatusBadge::Bestseller => "Bestseller",
            StatusBadge::New => "New",
            StatusBadge::Limited => "Limited",
            StatusBadge::Honeymoon => "Honeymoon",
            StatusBadge::Adventure => "Adventure",
            StatusBadge::Cultural => "Cultural",
            StatusBadge::Other(label) => label,
        }
    }

    fn known() -> [StatusBadge; 6] {
        [
            StatusBadge::Bestseller,
            StatusBadge::New,
            StatusBadge::Limited,
            StatusBadge::Honeymoon,
            StatusBadge::Adventure,
            StatusBadge::Cultural,
        ]
    }
}

impl From<&str> for StatusBadge {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        StatusBadge::known()
            .into_iter()
            .find(|badge| badge.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| StatusBadge::Other(trimmed.to_string()))
    }
}

impl From<String> for StatusBadge {
    fn from(value: String) -> Self {
        StatusBadge::from(value.as_str())
    }
}

impl From<StatusBadge> for String {
    fn from(value: StatusBadge) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for StatusBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Package
// ============================================================================

/// A bookable travel offering.
///
/// Invariants (enforced where documents are normalized into packages):
/// `price >= 0`, `duration >= 1`, `0 <= rating <= 5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default)]
    pub experience: Option<Experience>,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub status: Option<StatusBadge>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub reviews: Option<u32>,
    #[serde(default)]
    pub highlights: Vec<String>,
    /// Explicit featured position, ascending.
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_duration() -> u32 {
    1
}

impl Package {
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            image: None,
            price,
            rating: 0.0,
            duration: 1,
            experience: None,
            mood: None,
            status: None,
            location: None,
            category: None,
            reviews: None,
            highlights: Vec::new(),
            order: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_duration(mut self, days: u32) -> Self {
        self.duration = days;
        self
    }

    pub fn with_experience(mut self, experience: Experience) -> Self {
        self.experience = Some(experience);
        self
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    pub fn with_status(mut self, status: StatusBadge) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn image_or_fallback(&self) -> &str {
        self.image.as_deref().filter(|url| !url.is_empty()).unwrap_or(FALLBACK_IMAGE)
    }
}
