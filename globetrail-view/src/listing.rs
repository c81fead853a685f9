use globetrail_catalog::{
    display, search, Experience, FeaturedCategory, FilterSelection, Mood, Package, SortMode,
};
use globetrail_store::CatalogStore;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{update_if_alive, Shared};

/// Results shown per page of the listing.
pub const PAGE_SIZE: usize = 6;

/// Everything the user has chosen on the listing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub selection: FilterSelection,
    pub sort: SortMode,
    pub search: String,
    pub category: FeaturedCategory,
}

impl ListingQuery {
    /// Search and category narrow the catalog first, then the tag filter,
    /// then the sort.
    pub fn apply(&self, catalog: &[Package]) -> Vec<Package> {
        let narrowed = self.category.apply(&search(catalog, &self.search));
        display(&narrowed, &self.selection, self.sort)
    }
}

#[derive(Debug, Clone)]
pub struct ListingState {
    pub catalog: Arc<[Package]>,
    pub query: ListingQuery,
    pub visible: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            catalog: Arc::from(Vec::new()),
            query: ListingQuery::default(),
            visible: PAGE_SIZE,
            loading: false,
            error: None,
        }
    }
}

impl ListingState {
    /// Full filtered and sorted result list.
    pub fn results(&self) -> Vec<Package> {
        self.query.apply(&self.catalog)
    }

    pub fn result_count(&self) -> usize {
        self.results().len()
    }

    /// The page currently on screen.
    pub fn displayed(&self) -> Vec<Package> {
        let mut results = self.results();
        results.truncate(self.visible);
        results
    }

    pub fn has_more(&self) -> bool {
        self.result_count() > self.visible
    }
}

pub struct ListingController {
    catalog: Arc<CatalogStore>,
    state: Shared<ListingState>,
}

impl ListingController {
    pub fn new(catalog: Arc<CatalogStore>) -> Self {
        let initial = ListingState {
            catalog: catalog.snapshot(),
            ..ListingState::default()
        };
        let (state, _) = watch::channel(initial);
        Self {
            catalog,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> ListingState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListingState> {
        self.state.subscribe()
    }

    /// Reloads the catalog in the background.
    pub fn refresh(&self) -> JoinHandle<()> {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let catalog = self.catalog.clone();
        let state = Arc::downgrade(&self.state);
        tokio::spawn(async move {
            let packages = catalog.refresh().await;
            let error = catalog.last_error();
            update_if_alive(&state, |s| {
                s.catalog = packages;
                s.error = error;
                s.loading = false;
            });
        })
    }

    pub fn toggle_experience(&self, tag: Experience) {
        self.edit_query(|q| q.selection.toggle_experience(tag));
    }

    pub fn toggle_mood(&self, tag: Mood) {
        self.edit_query(|q| q.selection.toggle_mood(tag));
    }

    pub fn reset_filters(&self) {
        self.edit_query(|q| q.selection.clear());
    }

    pub fn set_sort(&self, mode: SortMode) {
        self.state.send_modify(|s| s.query.sort = mode);
    }

    pub fn set_search(&self, text: &str) {
        let text = text.to_string();
        self.edit_query(|q| q.search = text);
    }

    pub fn set_category(&self, category: FeaturedCategory) {
        self.edit_query(|q| q.category = category);
    }

    pub fn show_more(&self) {
        self.state.send_modify(|s| s.visible += PAGE_SIZE);
    }

    // a narrower result set starts again from the first page
    fn edit_query(&self, f: impl FnOnce(&mut ListingQuery)) {
        self.state.send_modify(|s| {
            f(&mut s.query);
            s.visible = PAGE_SIZE;
        });
    }
}
