use globetrail_catalog::content::{self, HeroSlide, Testimonial};
use globetrail_core::{CollectionPath, Document, DocumentStore};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{error, warn};

pub const HERO_SLIDES_COLLECTION: &str = "heroSlides";
pub const TESTIMONIALS_COLLECTION: &str = "testimonials";

/// Marketing content for the home page. Falls back to the built-in content
/// when the collection is empty or unreadable.
#[derive(Clone)]
pub struct ContentRepository {
    store: Arc<dyn DocumentStore>,
}

impl ContentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn hero_slides(&self) -> Vec<HeroSlide> {
        let slides = self
            .read(HERO_SLIDES_COLLECTION)
            .await
            .unwrap_or_else(content::hero_slides);
        content::order_slides(slides)
    }

    pub async fn testimonials(&self) -> Vec<Testimonial> {
        self.read(TESTIMONIALS_COLLECTION)
            .await
            .unwrap_or_else(content::testimonials)
    }

    async fn read<T: DeserializeOwned>(&self, collection: &str) -> Option<Vec<T>> {
        let path = CollectionPath::new(collection);
        let documents = match self.store.read_all(&path).await {
            Ok(documents) => documents,
            Err(e) => {
                error!("Failed to fetch {}: {}", path, e);
                return None;
            }
        };

        let items: Vec<T> = documents.into_iter().filter_map(|doc| parse(&path, doc)).collect();
        if items.is_empty() {
            None
        } else {
            Some(items)
        }
    }
}

fn parse<T: DeserializeOwned>(path: &CollectionPath, doc: Document) -> Option<T> {
    let id = doc.id.clone();
    match serde_json::from_value(doc.into_value()) {
        Ok(item) => Some(item),
        Err(e) => {
            warn!("Skipping malformed {} document {}: {}", path, id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocumentStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_store_falls_back_to_builtin() {
        let repo = ContentRepository::new(Arc::new(MemoryDocumentStore::new()));
        assert_eq!(repo.hero_slides().await, content::order_slides(content::hero_slides()));
        assert_eq!(repo.testimonials().await.len(), 4);
    }

    #[tokio::test]
    async fn test_stored_slides_are_ordered() {
        let store = MemoryDocumentStore::new();
        let path = CollectionPath::new(HERO_SLIDES_COLLECTION);
        for (id, order) in [("late", 2), ("early", 1)] {
            let data = json!({
                "order": order,
                "imageUrl": "https://img/x.jpg",
                "microTagline": "Go",
                "headline": id,
                "subtext": "",
            });
            store.set(&path, id, data.as_object().cloned().unwrap()).await.unwrap();
        }

        let slides = ContentRepository::new(Arc::new(store)).hero_slides().await;
        let ids: Vec<_> = slides.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }
}
