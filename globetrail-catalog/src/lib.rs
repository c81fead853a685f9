pub mod content;
pub mod filter;
pub mod package;
pub mod pricing;
pub mod seed;
pub mod sort;

pub use filter::{filter, search, FeaturedCategory, FilterSelection};
pub use package::{Experience, Mood, Package, StatusBadge, FALLBACK_IMAGE};
pub use pricing::{
    compute_total, parse_guests, validate_guests, GuestCountError, Quote, MAX_GUESTS, MIN_GUESTS,
};
pub use sort::{sort, SortMode};

/// Runs the listing pipeline: filter narrows, then sort orders the narrowed set.
pub fn display(catalog: &[Package], selection: &FilterSelection, mode: SortMode) -> Vec<Package> {
    sort(&filter(catalog, selection), mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_filters_before_sorting() {
        let catalog = vec![
            Package::new("1", "Goa Beaches", 1000.0)
                .with_rating(4.5)
                .with_experience(Experience::Beach),
            Package::new("2", "Manali Peaks", 500.0)
                .with_rating(4.9)
                .with_experience(Experience::Mountain),
            Package::new("3", "Maldives", 300.0)
                .with_rating(4.1)
                .with_experience(Experience::Beach),
        ];
        let mut selection = FilterSelection::default();
        selection.toggle_experience(Experience::Beach);

        let ids: Vec<_> = display(&catalog, &selection, SortMode::PriceAscending)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["3", "1"]);
    }
}
