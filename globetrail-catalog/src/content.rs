use serde::{Deserialize, Serialize};

/// A home-page hero carousel slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSlide {
    pub id: String,
    pub order: i64,
    pub image_url: String,
    pub micro_tagline: String,
    pub headline: String,
    pub subtext: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: String,
    pub quote: String,
    pub name: String,
    pub location: String,
    pub rating: u8,
    pub image_url: String,
}

pub fn hero_slides() -> Vec<HeroSlide> {
    let slide = |id: &str,
                 order: i64,
                 image: &str,
                 tagline: &str,
                 headline: &str,
                 subtext: &str| HeroSlide {
        id: id.to_string(),
        order,
        image_url: image.to_string(),
        micro_tagline: tagline.to_string(),
        headline: headline.to_string(),
        subtext: subtext.to_string(),
    };

    vec![
        slide(
            "slide1",
            1,
            "https://images.unsplash.com/photo-1476514525535-07fb3b4ae5f1?q=80&w=2070&auto=format&fit=crop",
            "Discover • Experience • Remember",
            "Your Journey Begins Here",
            "Discover breathtaking destinations and create unforgettable memories.",
        ),
        slide(
            "slide2",
            2,
            "https://images.unsplash.com/photo-1502602898657-3e91760c0341?q=80&w=2070&auto=format&fit=crop",
            "Iconic City of Light",
            "Experience the Magic of Paris",
            "Walk through charming streets and witness iconic landmarks.",
        ),
        slide(
            "slide3",
            3,
            "https://images.unsplash.com/photo-1542051841857-5f90071e7989?q=80&w=2070&auto=format&fit=crop",
            "Ancient Tradition, Modern Wonder",
            "Explore the Wonders of Tokyo",
            "A perfect blend of ancient tradition and futuristic technology.",
        ),
    ]
}

fn testimonial(
    id: &str,
    quote: &str,
    name: &str,
    location: &str,
    image_url: &str,
) -> Testimonial {
    Testimonial {
        id: id.to_string(),
        quote: quote.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        rating: 5,
        image_url: image_url.to_string(),
    }
}

pub fn testimonials() -> Vec<Testimonial> {
    vec![
        testimonial(
            "testimonial1",
            "GlobeTrails planned the most incredible trip to Japan for us. Every detail was \
             perfect, from the hotels to the tours. Truly a five-star experience!",
            "Aarav Sharma",
            "Mumbai, India",
            "https://images.unsplash.com/photo-1599566150163-29194dcaad36?q=80&w=387&auto=format&fit=crop",
        ),
        testimonial(
            "testimonial2",
            "Our honeymoon in Santorini was a dream come true, all thanks to the GlobeTrails \
             team. The recommendations were spot on. We can't wait to book our next trip!",
            "Priya Patel",
            "London, UK",
            "https://images.unsplash.com/photo-1494790108377-be9c29b29330?q=80&w=387&auto=format&fit=crop",
        ),
        testimonial(
            "testimonial3",
            "The Kerala backwaters tour was absolutely serene and well-organized. It was the \
             perfect relaxing getaway we needed. Highly recommended for a peaceful retreat.",
            "Rohan Das",
            "Bengaluru, India",
            "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?q=80&w=387&auto=format&fit=crop",
        ),
        testimonial(
            "testimonial4",
            "I never thought I'd see the Northern Lights, but GlobeTrails made it happen! The \
             entire trip to Norway was seamless and magical. A life-changing experience.",
            "Ananya Rao",
            "Singapore",
            "https://images.unsplash.com/photo-1580489944761-15a19d654956?q=80&w=461&auto=format&fit=crop",
        ),
    ]
}

/// Carousel order: ascending `order`, ties by id.
pub fn order_slides(mut slides: Vec<HeroSlide>) -> Vec<HeroSlide> {
    slides.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    slides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slides_ordered() {
        let mut slides = hero_slides();
        slides.reverse();
        let ordered = order_slides(slides);
        let ids: Vec<_> = ordered.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["slide1", "slide2", "slide3"]);
    }

    #[test]
    fn test_testimonials_complete() {
        let all = testimonials();
        assert_eq!(all.len(), 4);
        assert_eq!(all[3].name, "Ananya Rao");
        assert!(all[3].quote.contains("Northern Lights"));
        assert!(all[0].quote.ends_with("Truly a five-star experience!"));
        assert!(all.iter().all(|t| t.rating == 5));
    }

    #[test]
    fn test_slide_serializes_camel_case() {
        let json = serde_json::to_value(&hero_slides()[0]).unwrap();
        assert_eq!(json["microTagline"], "Discover • Experience • Remember");
        assert!(json["imageUrl"].as_str().unwrap().starts_with("https://"));
    }
}
