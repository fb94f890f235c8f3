//! State holder for the film stock list. The full set is loaded once and
//! filtered in memory; the held list is always the subset of the full set
//! matching every active predicate, in the active sort order.

use std::sync::Arc;

use anyhow::Result;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::warn;

use shared::{
    domain::{FilmStock, FilmStockSortMode},
    error::ValidationError,
    filters::{map_distinct, FilmStockFilterSet},
    sort::sort_film_stocks,
};
use storage::Storage;

use crate::{events::AppEvent, EVENT_CHANNEL_CAPACITY};

pub struct FilmStocksController {
    storage: Storage,
    inner: Mutex<FilmStocksState>,
    events: broadcast::Sender<AppEvent>,
}

struct FilmStocksState {
    all: Vec<FilmStock>,
    filtered: Vec<FilmStock>,
    filter_set: FilmStockFilterSet,
    sort_mode: FilmStockSortMode,
}

impl FilmStocksController {
    pub fn new(storage: Storage) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            storage,
            inner: Mutex::new(FilmStocksState {
                all: Vec::new(),
                filtered: Vec::new(),
                filter_set: FilmStockFilterSet::default(),
                sort_mode: FilmStockSortMode::Name,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    pub async fn film_stocks(&self) -> Vec<FilmStock> {
        self.inner.lock().await.filtered.clone()
    }

    pub async fn filter_set(&self) -> FilmStockFilterSet {
        self.inner.lock().await.filter_set.clone()
    }

    pub async fn sort_mode(&self) -> FilmStockSortMode {
        self.inner.lock().await.sort_mode
    }

    pub fn spawn_load(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            match controller.storage.list_film_stocks().await {
                Ok(stocks) => {
                    let snapshot = {
                        let mut inner = controller.inner.lock().await;
                        inner.all = stocks;
                        recompute_filtered(&mut inner);
                        inner.filtered.clone()
                    };
                    let _ = controller.events.send(AppEvent::FilmStocksUpdated(snapshot));
                }
                Err(err) => {
                    warn!("film stocks: load failed error={err:#}");
                    let _ = controller.events.send(AppEvent::Error(err.to_string()));
                }
            }
        })
    }

    /// Recomputes the held list as exactly the subset of the full set
    /// satisfying every active predicate.
    pub async fn set_filter_set(&self, filter_set: FilmStockFilterSet) {
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.filter_set = filter_set;
            recompute_filtered(&mut inner);
            inner.filtered.clone()
        };
        let _ = self.events.send(AppEvent::FilmStocksUpdated(snapshot));
    }

    /// Re-sorts the held list in place; no reload.
    pub async fn set_sort_mode(&self, mode: FilmStockSortMode) {
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.sort_mode = mode;
            sort_film_stocks(&mut inner.filtered, mode);
            inner.filtered.clone()
        };
        let _ = self.events.send(AppEvent::FilmStocksUpdated(snapshot));
    }

    /// Upsert with the same held-list rule as rolls: the stock stays in the
    /// filtered list only while it matches the active filter set. The full
    /// set is updated either way.
    pub async fn submit_film_stock(&self, mut stock: FilmStock) -> Result<FilmStock> {
        if stock.make.trim().is_empty() || stock.model.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.storage.update_film_stock(&stock).await? == 0 {
            stock.id = self.storage.add_film_stock(&stock).await?;
        }
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.all.retain(|s| s.id != stock.id);
            inner.all.push(stock.clone());
            inner.filtered.retain(|s| s.id != stock.id);
            if inner.filter_set.matches(&stock) {
                inner.filtered.push(stock.clone());
                let mode = inner.sort_mode;
                sort_film_stocks(&mut inner.filtered, mode);
            }
            inner.filtered.clone()
        };
        let _ = self.events.send(AppEvent::FilmStocksUpdated(snapshot));
        Ok(stock)
    }

    pub async fn delete_film_stock(&self, stock: &FilmStock) -> Result<()> {
        self.storage.delete_film_stock(stock.id).await?;
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.all.retain(|s| s.id != stock.id);
            inner.filtered.retain(|s| s.id != stock.id);
            inner.filtered.clone()
        };
        let _ = self.events.send(AppEvent::FilmStocksUpdated(snapshot));
        Ok(())
    }

    /// Distinct ISO values with every predicate applied except the ISO
    /// filter itself, for building the ISO picker.
    pub async fn filtered_iso_values(&self) -> Vec<i32> {
        let inner = self.inner.lock().await;
        let set = &inner.filter_set;
        let matching: Vec<FilmStock> = inner
            .all
            .iter()
            .filter(|s| {
                set.manufacturer_matches(s)
                    && set.type_matches(s)
                    && set.process_matches(s)
                    && set.added_by_matches(s)
            })
            .cloned()
            .collect();
        map_distinct(&matching, |s| s.iso)
    }

    /// Distinct manufacturers with every predicate applied except the
    /// manufacturer filter itself.
    pub async fn filtered_manufacturers(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        let set = &inner.filter_set;
        let matching: Vec<FilmStock> = inner
            .all
            .iter()
            .filter(|s| {
                set.type_matches(s)
                    && set.process_matches(s)
                    && set.iso_matches(s)
                    && set.added_by_matches(s)
            })
            .cloned()
            .collect();
        map_distinct(&matching, |s| s.make.clone())
    }
}

fn recompute_filtered(state: &mut FilmStocksState) {
    let mut filtered: Vec<FilmStock> = state
        .all
        .iter()
        .filter(|s| state.filter_set.matches(s))
        .cloned()
        .collect();
    sort_film_stocks(&mut filtered, state.sort_mode);
    state.filtered = filtered;
}

#[cfg(test)]
#[path = "tests/film_stocks_tests.rs"]
mod tests;
