use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::package::Package;

/// Ordering rule applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Catalog's native order, untouched.
    #[default]
    Featured,
    #[serde(rename = "price_asc")]
    PriceAscending,
    #[serde(rename = "rating_desc")]
    RatingDescending,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Featured => "featured",
            SortMode::PriceAscending => "price_asc",
            SortMode::RatingDescending => "rating_desc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Featured => "Featured",
            SortMode::PriceAscending => "Price (Low-High)",
            SortMode::RatingDescending => "Top Rated",
        }
    }

    pub fn all() -> [SortMode; 3] {
        [SortMode::Featured, SortMode::PriceAscending, SortMode::RatingDescending]
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown sort mode: {0}")]
pub struct UnknownSortMode(pub String);

impl FromStr for SortMode {
    type Err = UnknownSortMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::all()
            .into_iter()
            .find(|mode| {
                mode.as_str().eq_ignore_ascii_case(s) || mode.label().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| UnknownSortMode(s.to_string()))
    }
}

/// Returns a sorted copy; the input is left as it was.
///
/// `slice::sort_by` is stable, so equal keys keep their relative input order
/// and repeated sorts never visibly swap ties.
pub fn sort(packages: &[Package], mode: SortMode) -> Vec<Package> {
    let mut sorted = packages.to_vec();
    match mode {
        SortMode::Featured => {}
        SortMode::PriceAscending => sorted.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortMode::RatingDescending => sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
    }
    sorted
}
