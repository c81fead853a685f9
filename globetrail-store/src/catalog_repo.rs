use chrono::{DateTime, TimeZone, Utc};
use globetrail_catalog::{seed, Experience, Mood, Package, StatusBadge};
use globetrail_core::{CollectionPath, CoreError, Document, DocumentStore};
use globetrail_shared::CatalogRefreshedEvent;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

const UNTITLED: &str = "Untitled Package";

// ============================================================================
// Document normalization
// ============================================================================

/// Maps one stored document onto a [`Package`].
///
/// This is the only place raw store values are coerced. Numbers may arrive as
/// JSON numbers or numeric strings; values that break the package invariants
/// are clamped rather than rejected, so every document yields a package.
pub fn normalize_document(doc: &Document) -> Package {
    let id = doc.id.as_str();

    let title = ["title", "name", "destination"]
        .iter()
        .find_map(|field| non_empty_str(doc.get(field)))
        .unwrap_or(UNTITLED);

    let mut pkg = Package::new(id, title, price(id, doc.get("price")));
    pkg.description = non_empty_str(doc.get("description")).unwrap_or_default().to_string();
    pkg.image = non_empty_str(doc.get("image"))
        .or_else(|| non_empty_str(doc.get("imageUrl")))
        .map(str::to_string);
    pkg.rating = rating(id, doc.get("rating"));
    pkg.duration = duration(id, doc.get("duration"));
    pkg.experience = non_empty_str(doc.get("experience")).map(Experience::from);
    pkg.mood = non_empty_str(doc.get("mood")).map(Mood::from);
    pkg.status = non_empty_str(doc.get("status")).map(StatusBadge::from);
    pkg.location = non_empty_str(doc.get("location")).map(str::to_string);
    pkg.category = non_empty_str(doc.get("category")).map(str::to_string);
    pkg.reviews = doc
        .get("reviews")
        .and_then(coerce_number)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u32);
    pkg.highlights = match doc.get("highlights") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };
    pkg.order = doc.get("order").and_then(coerce_number).map(|n| n as i64);
    pkg.created_at = doc.get("createdAt").and_then(coerce_timestamp);
    pkg.updated_at = doc.get("updatedAt").and_then(coerce_timestamp);
    pkg
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Number or numeric string. A string with a trailing unit ("7 Days") yields
/// its leading number.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim().replace(',', "");
            s.parse::<f64>().ok().or_else(|| {
                let end = s
                    .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
                    .unwrap_or(s.len());
                s[..end].parse::<f64>().ok()
            })
        }
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn price(id: &str, value: Option<&Value>) -> f64 {
    match value.and_then(coerce_number) {
        Some(p) if p >= 0.0 => p,
        Some(p) => {
            warn!("Package {} has negative price {}, using 0", id, p);
            0.0
        }
        None => {
            warn!("Package {} has no numeric price ({:?}), using 0", id, value);
            0.0
        }
    }
}

fn rating(id: &str, value: Option<&Value>) -> f64 {
    let Some(raw) = value else { return 0.0 };
    match coerce_number(raw) {
        Some(r) if (0.0..=5.0).contains(&r) => r,
        Some(r) => {
            let clamped = r.clamp(0.0, 5.0);
            warn!("Package {} rating {} out of range, clamped to {}", id, r, clamped);
            clamped
        }
        None => {
            warn!("Package {} has non-numeric rating {:?}, using 0", id, raw);
            0.0
        }
    }
}

fn duration(id: &str, value: Option<&Value>) -> u32 {
    let Some(raw) = value else { return 1 };
    match coerce_number(raw).map(f64::round) {
        Some(d) if d >= 1.0 => d.min(u32::MAX as f64) as u32,
        _ => {
            warn!("Package {} has invalid duration {:?}, using 1 day", id, raw);
            1
        }
    }
}

/// RFC 3339 strings, `{seconds, nanos}` objects (with or without leading
/// underscores) and epoch numbers (milliseconds when large enough).
pub fn coerce_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let n = n.as_f64()?;
            if n.abs() >= 1e11 {
                Utc.timestamp_millis_opt(n as i64).single()
            } else {
                Utc.timestamp_opt(n as i64, 0).single()
            }
        }
        Value::Object(map) => {
            let seconds = map.get("seconds").or_else(|| map.get("_seconds"))?.as_i64()?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .or_else(|| map.get("nanos"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, nanos as u32).single()
        }
        _ => None,
    }
}

/// Featured order: ascending `order` when any package carries one (those
/// without go last), otherwise the order the documents were read in.
pub fn native_order(mut packages: Vec<Package>) -> Vec<Package> {
    if packages.iter().any(|p| p.order.is_some()) {
        packages.sort_by_key(|p| (p.order.is_none(), p.order.unwrap_or_default()));
    }
    packages
}

// ============================================================================
// Catalog Store
// ============================================================================

pub enum CatalogSource {
    Collection {
        store: Arc<dyn DocumentStore>,
        collection: CollectionPath,
    },
    /// The compiled-in seed list.
    Static,
}

impl CatalogSource {
    fn label(&self) -> String {
        match self {
            CatalogSource::Collection { collection, .. } => collection.to_string(),
            CatalogSource::Static => "static".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    pub packages: Arc<[Package]>,
    /// Message of the last failed refresh, cleared by the next success.
    pub last_error: Option<String>,
}

/// Read-only snapshot of the package catalog.
///
/// Each refresh replaces the snapshot wholesale; nothing mutates a published
/// snapshot in place.
pub struct CatalogStore {
    source: CatalogSource,
    state: watch::Sender<CatalogState>,
    refreshes: broadcast::Sender<CatalogRefreshedEvent>,
}

impl CatalogStore {
    pub fn new(source: CatalogSource) -> Self {
        let (state, _) = watch::channel(CatalogState::default());
        let (refreshes, _) = broadcast::channel(16);
        Self {
            source,
            state,
            refreshes,
        }
    }

    pub fn from_collection(store: Arc<dyn DocumentStore>, collection: CollectionPath) -> Self {
        Self::new(CatalogSource::Collection { store, collection })
    }

    pub fn static_seed() -> Self {
        Self::new(CatalogSource::Static)
    }

    /// Re-reads the catalog. A failed read yields (and publishes) an empty
    /// catalog and records the error; it never propagates.
    pub async fn refresh(&self) -> Arc<[Package]> {
        match self.load().await {
            Ok(packages) => {
                let packages: Arc<[Package]> = packages.into();
                info!("Catalog {} refreshed: {} packages", self.source.label(), packages.len());
                self.publish(packages.clone(), None);
                packages
            }
            Err(e) => {
                error!("Catalog refresh failed: {}", e);
                let empty: Arc<[Package]> = Arc::from(Vec::new());
                self.publish(empty.clone(), Some(e.to_string()));
                empty
            }
        }
    }

    async fn load(&self) -> Result<Vec<Package>, CoreError> {
        match &self.source {
            CatalogSource::Static => Ok(seed::packages()),
            CatalogSource::Collection { store, collection } => {
                let documents = store
                    .read_all(collection)
                    .await
                    .map_err(|e| CoreError::fetch(collection, e))?;
                Ok(native_order(documents.iter().map(normalize_document).collect()))
            }
        }
    }

    fn publish(&self, packages: Arc<[Package]>, last_error: Option<String>) {
        let event =
            CatalogRefreshedEvent::now(self.source.label(), packages.len(), last_error.is_some());
        self.state.send_replace(CatalogState { packages, last_error });
        let _ = self.refreshes.send(event);
    }

    /// Collection the catalog reads from; `None` for the static source.
    pub fn collection(&self) -> Option<&CollectionPath> {
        match &self.source {
            CatalogSource::Collection { collection, .. } => Some(collection),
            CatalogSource::Static => None,
        }
    }

    pub fn snapshot(&self) -> Arc<[Package]> {
        self.state.borrow().packages.clone()
    }

    pub fn find(&self, id: &str) -> Option<Package> {
        self.state.borrow().packages.iter().find(|p| p.id == id).cloned()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    /// Observes every published snapshot.
    pub fn watch(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    pub fn refresh_events(&self) -> broadcast::Receiver<CatalogRefreshedEvent> {
        self.refreshes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocumentStore;
    use async_trait::async_trait;
    use globetrail_core::{DocumentStream, Fields, StoreError};
    use serde_json::json;

    fn doc(id: &str, value: Value) -> Document {
        Document::new(id, value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_normalize_full_document() {
        let pkg = normalize_document(&doc(
            "1",
            json!({
                "title": "Charming Paris",
                "description": "Eiffel Tower at dusk",
                "imageUrl": "https://img/paris.jpg",
                "price": "95000",
                "rating": 4.8,
                "duration": "7 Days",
                "experience": "City Break",
                "mood": "Romantic",
                "status": "Bestseller",
                "location": "Paris, France",
                "category": "International",
                "reviews": 320,
                "highlights": ["Seine cruise", 4, "Louvre"],
                "createdAt": {"seconds": 1700000000, "nanoseconds": 0}
            }),
        ));

        assert_eq!(pkg.title, "Charming Paris");
        assert_eq!(pkg.price, 95000.0);
        assert_eq!(pkg.rating, 4.8);
        assert_eq!(pkg.duration, 7);
        assert_eq!(pkg.experience, Some(Experience::CityBreak));
        assert_eq!(pkg.mood, Some(Mood::Romantic));
        assert_eq!(pkg.status, Some(StatusBadge::Bestseller));
        assert_eq!(pkg.image.as_deref(), Some("https://img/paris.jpg"));
        assert_eq!(pkg.reviews, Some(320));
        assert_eq!(pkg.highlights, vec!["Seine cruise", "Louvre"]);
        assert_eq!(pkg.created_at.unwrap().timestamp(), 1700000000);
    }

    #[test]
    fn test_normalize_sparse_document() {
        let pkg = normalize_document(&doc("x", json!({"name": "Goa", "experience": ""})));
        assert_eq!(pkg.id, "x");
        assert_eq!(pkg.title, "Goa");
        assert_eq!(pkg.price, 0.0);
        assert_eq!(pkg.duration, 1);
        assert!(pkg.experience.is_none());
        assert!(pkg.mood.is_none());
        assert!(pkg.image.is_none());

        let untitled = normalize_document(&doc("y", json!({})));
        assert_eq!(untitled.title, UNTITLED);
    }

    #[test]
    fn test_normalize_clamps_invalid_numbers() {
        let pkg = normalize_document(&doc(
            "z",
            json!({"title": "Bad", "price": -20, "rating": "9.5", "duration": 0}),
        ));
        assert_eq!(pkg.price, 0.0);
        assert_eq!(pkg.rating, 5.0);
        assert_eq!(pkg.duration, 1);

        let garbled = normalize_document(&doc("w", json!({"price": "call us", "rating": "great"})));
        assert_eq!(garbled.price, 0.0);
        assert_eq!(garbled.rating, 0.0);
    }

    #[test]
    fn test_numeric_strings_sort_numerically() {
        // "900" < "1000" only once coerced
        let cheap = normalize_document(&doc("a", json!({"price": "900"})));
        let dear = normalize_document(&doc("b", json!({"price": "1,000"})));
        assert!(cheap.price < dear.price);
    }

    #[test]
    fn test_coerce_timestamp_forms() {
        let rfc = coerce_timestamp(&json!("2026-10-19T08:00:00Z")).unwrap();
        let millis = coerce_timestamp(&json!(1_792_396_800_000i64)).unwrap();
        let secs = coerce_timestamp(&json!(1_792_396_800i64)).unwrap();
        let object =
            coerce_timestamp(&json!({"_seconds": 1_792_396_800i64, "_nanoseconds": 5})).unwrap();
        assert_eq!(rfc.timestamp(), 1_792_396_800);
        assert_eq!(millis, secs);
        assert_eq!(object.timestamp(), secs.timestamp());
        assert!(coerce_timestamp(&json!(true)).is_none());
    }

    #[test]
    fn test_native_order_prefers_explicit_order() {
        let packages = vec![
            Package::new("a", "A", 1.0),
            Package::new("b", "B", 1.0).with_order(2),
            Package::new("c", "C", 1.0),
            Package::new("d", "D", 1.0).with_order(1),
        ];
        let ids: Vec<_> = native_order(packages).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["d", "b", "a", "c"]);

        let unordered = vec![Package::new("b", "B", 1.0), Package::new("a", "A", 1.0)];
        let ids: Vec<_> = native_order(unordered).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn read_all(&self, _c: &CollectionPath) -> Result<Vec<Document>, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }
        async fn read_one(
            &self,
            _c: &CollectionPath,
            _id: &str,
        ) -> Result<Option<Document>, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }
        async fn create(&self, _c: &CollectionPath, _d: Fields) -> Result<String, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }
        async fn set(&self, _c: &CollectionPath, _id: &str, _d: Fields) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }
        async fn update(
            &self,
            _c: &CollectionPath,
            _id: &str,
            _p: Fields,
        ) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }
        async fn delete(&self, _c: &CollectionPath, _id: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }
        async fn subscribe(&self, _c: &CollectionPath) -> Result<DocumentStream, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }
    }

    #[tokio::test]
    async fn test_refresh_failure_yields_empty_catalog() {
        let catalog =
            CatalogStore::from_collection(Arc::new(FailingStore), CollectionPath::new("packages"));
        let mut events = catalog.refresh_events();

        let packages = catalog.refresh().await;
        assert!(packages.is_empty());
        assert!(catalog.snapshot().is_empty());
        assert!(catalog.last_error().unwrap().contains("packages"));

        let event = events.recv().await.unwrap();
        assert!(event.failed);
        assert_eq!(event.package_count, 0);
    }

    #[tokio::test]
    async fn test_refresh_from_collection_then_recover() {
        let store = MemoryDocumentStore::new();
        let packages = CollectionPath::new("packages");
        let tokyo = doc("2", json!({"title": "Tokyo", "price": 120000}));
        store.set(&packages, "2", tokyo.data).await.unwrap();
        let paris = doc("1", json!({"title": "Paris", "price": "95000"}));
        store.set(&packages, "1", paris.data).await.unwrap();

        let catalog = CatalogStore::from_collection(Arc::new(store.clone()), packages.clone());
        let snapshot = catalog.refresh().await;
        let ids: Vec<_> = snapshot.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert!(catalog.last_error().is_none());
        assert_eq!(catalog.find("1").unwrap().price, 95000.0);
        assert!(catalog.find("404").is_none());

        // earlier snapshots are untouched by later refreshes
        store.delete(&packages, "2").await.unwrap();
        let next = catalog.refresh().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(next.len(), 1);
    }

    #[tokio::test]
    async fn test_static_source_serves_seed() {
        let catalog = CatalogStore::static_seed();
        let mut watcher = catalog.watch();
        assert_eq!(catalog.refresh().await.len(), 9);
        assert!(watcher.has_changed().unwrap());
        assert_eq!(watcher.borrow_and_update().packages.len(), 9);
    }
}
