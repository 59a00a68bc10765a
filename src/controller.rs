// Destinations page controller
// Owns the filter state and redraws from it; the UI layer talks to the core
// only through FilterEvent messages

use std::sync::Arc;

use tracing::{debug, info};

use crate::fetch::DataFetcher;
use crate::filter::{filter_and_sort, FilterState, SortKey};
use crate::notify::{Notify, Severity};
use crate::render::{DestinationGrid, RenderSurface};
use crate::store::{DataStore, LoadError};

#[derive(Debug, Clone, PartialEq)]
pub enum FilterEvent {
    SearchChanged(String),
    ClearSearch,
    // Empty string selects all provinces / all categories
    ProvinceSelected(String),
    CategorySelected(String),
    SortChanged(SortKey),
    Reset,
}

pub struct DestinationsPage<F: DataFetcher, S: RenderSurface> {
    store: DataStore<F>,
    filters: FilterState,
    grid: DestinationGrid,
    grid_surface: S,
    count_surface: S,
    notifier: Option<Arc<dyn Notify>>,
}

impl<F: DataFetcher, S: RenderSurface> DestinationsPage<F, S> {
    pub fn new(store: DataStore<F>, grid_surface: S, count_surface: S) -> Self {
        Self {
            store,
            filters: FilterState::default(),
            grid: DestinationGrid,
            grid_surface,
            count_surface,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notify>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn grid_surface(&self) -> &S {
        &self.grid_surface
    }

    pub fn count_surface(&self) -> &S {
        &self.count_surface
    }

    // First load plus initial draw. A failed load surfaces both as a
    // notification and as the returned error; the page stays usable and a
    // later init can retry.
    pub async fn init(&mut self) -> Result<(), LoadError> {
        match self.store.load().await {
            Ok(_) => {
                self.refresh();
                info!("destinations page initialized");
                Ok(())
            }
            Err(error) => {
                self.notify("Error loading data. Please refresh the page.", Severity::Error);
                Err(error)
            }
        }
    }

    pub fn apply(&mut self, event: FilterEvent) {
        match event {
            FilterEvent::SearchChanged(term) => self.filters.search = term,
            FilterEvent::ClearSearch => self.filters.search.clear(),
            FilterEvent::ProvinceSelected(id) => self.filters.province = id,
            FilterEvent::CategorySelected(tag) => self.filters.category = tag,
            FilterEvent::SortChanged(key) => self.filters.sort = key,
            FilterEvent::Reset => {
                self.filters = FilterState::default();
                self.notify("Filters reset", Severity::Success);
            }
        }

        self.refresh();
    }

    fn refresh(&mut self) {
        let visible = filter_and_sort(&self.store.destinations(), &self.filters);
        debug!("showing {} destination cards", visible.len());
        self.grid
            .render(&mut self.grid_surface, &mut self.count_surface, &visible);
    }

    fn notify(&self, message: &str, severity: Severity) {
        if let Some(notifier) = &self.notifier {
            notifier.notify(message, severity);
        }
    }
}
