//! Compiled-in catalog, used by the static-data configuration and for seeding
//! an empty document collection.

use crate::package::{Experience, Mood, Package, StatusBadge};

struct SeedRow {
    id: &'static str,
    title: &'static str,
    location: &'static str,
    description: &'static str,
    image: &'static str,
    price: f64,
    rating: f64,
    duration: u32,
    reviews: u32,
    experience: Experience,
    mood: Mood,
    status: Option<StatusBadge>,
    category: &'static str,
}

fn rows() -> Vec<SeedRow> {
    vec![
        SeedRow {
            id: "1",
            title: "Charming Paris",
            location: "Paris, France",
            description: "Seven days of boulevards, bistros and the Louvre, with a Seine dinner cruise.",
            image: "https://images.unsplash.com/photo-1502602898657-3e91760c0341?q=80&w=2070&auto=format&fit=crop",
            price: 95000.0,
            rating: 4.8,
            duration: 7,
            reviews: 214,
            experience: Experience::CityBreak,
            mood: Mood::Romantic,
            status: Some(StatusBadge::Bestseller),
            category: "International",
        },
        SeedRow {
            id: "2",
            title: "Vibrant Tokyo",
            location: "Tokyo, Japan",
            description: "Neon nights in Shinjuku, temples in Asakusa and a day trip to Mount Fuji.",
            image: "https://images.unsplash.com/photo-1542051841857-5f90071e7989?q=80&w=2070&auto=format&fit=crop",
            price: 180000.0,
            rating: 4.9,
            duration: 10,
            reviews: 167,
            experience: Experience::CityBreak,
            mood: Mood::SoloAdventure,
            status: Some(StatusBadge::New),
            category: "International",
        },
        SeedRow {
            id: "3",
            title: "Idyllic Santorini",
            location: "Santorini, Greece",
            description: "Whitewashed cliffs, caldera sunsets and private beach days.",
            image: "https://images.unsplash.com/photo-1577717903315-1691ae25ab3f?q=80&w=2070&auto=format&fit=crop",
            price: 145000.0,
            rating: 4.7,
            duration: 8,
            reviews: 98,
            experience: Experience::Beach,
            mood: Mood::Romantic,
            status: Some(StatusBadge::Limited),
            category: "Honeymoon",
        },
        SeedRow {
            id: "4",
            title: "Serene Backwaters of Kerala",
            location: "Alleppey, India",
            description: "Houseboat nights on the backwaters with Ayurvedic spa stops.",
            image: "https://images.unsplash.com/photo-1533105079780-52b9be462077?q=80&w=2070&auto=format&fit=crop",
            price: 45000.0,
            rating: 4.8,
            duration: 5,
            reviews: 312,
            experience: Experience::Cultural,
            mood: Mood::FamilyFriendly,
            status: Some(StatusBadge::Bestseller),
            category: "Domestic",
        },
        SeedRow {
            id: "5",
            title: "Romantic Venice",
            location: "Venice, Italy",
            description: "Gondolas, glass-blowing on Murano and candlelit canal-side dinners.",
            image: "https://images.unsplash.com/photo-1567634453399-691552b09337?q=80&w=1974&auto=format&fit=crop",
            price: 130000.0,
            rating: 4.9,
            duration: 6,
            reviews: 143,
            experience: Experience::Cultural,
            mood: Mood::Romantic,
            status: Some(StatusBadge::Honeymoon),
            category: "Honeymoon",
        },
        SeedRow {
            id: "6",
            title: "Bali Island Escape",
            location: "Ubud, Indonesia",
            description: "Rice terraces, surf lessons in Canggu and villa stays with private pools.",
            image: "https://images.unsplash.com/photo-1537996194471-e657df975ab4?q=80&w=2070&auto=format&fit=crop",
            price: 85000.0,
            rating: 4.6,
            duration: 7,
            reviews: 256,
            experience: Experience::Beach,
            mood: Mood::FamilyFriendly,
            status: None,
            category: "International",
        },
        SeedRow {
            id: "7",
            title: "Swiss Alps Explorer",
            location: "Interlaken, Switzerland",
            description: "Glacier trains, Jungfraujoch and lakeside hikes between Interlaken and Zermatt.",
            image: "https://images.unsplash.com/photo-1530122037265-a5f1f91d3b99?q=80&w=2070&auto=format&fit=crop",
            price: 210000.0,
            rating: 4.9,
            duration: 9,
            reviews: 77,
            experience: Experience::Mountain,
            mood: Mood::SoloAdventure,
            status: Some(StatusBadge::Adventure),
            category: "International",
        },
        SeedRow {
            id: "8",
            title: "Serengeti Safari",
            location: "Arusha, Tanzania",
            description: "Game drives through the Great Migration and a night in a tented camp.",
            image: "https://images.unsplash.com/photo-1516426122078-c23e76319801?q=80&w=2068&auto=format&fit=crop",
            price: 240000.0,
            rating: 4.8,
            duration: 8,
            reviews: 61,
            experience: Experience::Safari,
            mood: Mood::FamilyFriendly,
            status: Some(StatusBadge::Limited),
            category: "International",
        },
        SeedRow {
            id: "9",
            title: "Royal Rajasthan",
            location: "Jaipur, India",
            description: "Forts, palaces and desert camps from Jaipur to Jaisalmer.",
            image: "https://images.unsplash.com/photo-1477587458883-47145ed94245?q=80&w=2070&auto=format&fit=crop",
            price: 60000.0,
            rating: 4.7,
            duration: 6,
            reviews: 189,
            experience: Experience::Cultural,
            mood: Mood::FamilyFriendly,
            status: Some(StatusBadge::Cultural),
            category: "Domestic",
        },
    ]
}

/// The nine seed packages, in featured order.
pub fn packages() -> Vec<Package> {
    rows()
        .into_iter()
        .map(|row| {
            let mut pkg = Package::new(row.id, row.title, row.price)
                .with_rating(row.rating)
                .with_duration(row.duration)
                .with_experience(row.experience)
                .with_mood(row.mood)
                .with_location(row.location)
                .with_category(row.category);
            pkg.description = row.description.to_string();
            pkg.image = Some(row.image.to_string());
            pkg.reviews = Some(row.reviews);
            pkg.status = row.status;
            pkg
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_respects_invariants() {
        let packages = packages();
        assert_eq!(packages.len(), 9);

        let ids: HashSet<_> = packages.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids.len(), packages.len());

        for pkg in &packages {
            assert!(pkg.price >= 0.0);
            assert!(pkg.duration >= 1);
            assert!((0.0..=5.0).contains(&pkg.rating));
        }
    }
}
