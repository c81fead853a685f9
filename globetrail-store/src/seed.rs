use globetrail_catalog::{content, seed};
use globetrail_core::{CollectionPath, DocumentStore, Fields, StoreError};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::content_repo::{HERO_SLIDES_COLLECTION, TESTIMONIALS_COLLECTION};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub packages: usize,
    pub hero_slides: usize,
    pub testimonials: usize,
}

/// Writes the built-in packages, hero slides and testimonials under their own
/// ids. Re-running replaces the same documents.
pub async fn seed_all(
    store: &Arc<dyn DocumentStore>,
    packages_collection: &CollectionPath,
) -> Result<SeedReport, StoreError> {
    let packages = write_all(
        store,
        packages_collection,
        seed::packages().into_iter().map(|p| (p.id.clone(), p)),
    )
    .await?;

    let hero_slides = write_all(
        store,
        &CollectionPath::new(HERO_SLIDES_COLLECTION),
        content::hero_slides().into_iter().map(|s| (s.id.clone(), s)),
    )
    .await?;

    let testimonials = write_all(
        store,
        &CollectionPath::new(TESTIMONIALS_COLLECTION),
        content::testimonials().into_iter().map(|t| (t.id.clone(), t)),
    )
    .await?;

    let report = SeedReport {
        packages,
        hero_slides,
        testimonials,
    };
    info!("Seeded {:?}", report);
    Ok(report)
}

async fn write_all<T: Serialize>(
    store: &Arc<dyn DocumentStore>,
    collection: &CollectionPath,
    items: impl Iterator<Item = (String, T)>,
) -> Result<usize, StoreError> {
    let mut written = 0;
    for (id, item) in items {
        let mut fields = match serde_json::to_value(&item)? {
            serde_json::Value::Object(fields) => fields,
            _ => Fields::new(),
        };
        // the id lives in the document key, not its body
        fields.remove("id");
        store.set(collection, &id, fields).await?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_repo::CatalogStore;
    use crate::memory::MemoryDocumentStore;

    #[tokio::test]
    async fn test_seed_round_trips_through_catalog() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let packages = CollectionPath::new("packages");

        let report = seed_all(&store, &packages).await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                packages: 9,
                hero_slides: 3,
                testimonials: 4
            }
        );

        // seeding twice does not duplicate
        seed_all(&store, &packages).await.unwrap();
        assert_eq!(store.read_all(&packages).await.unwrap().len(), 9);

        let catalog = CatalogStore::from_collection(store.clone(), packages);
        let loaded = catalog.refresh().await;
        assert_eq!(&loaded[..], &seed::packages()[..]);
    }
}
