//! Controllers that keep in-memory list views synchronized with the store.
//!
//! Each controller owns its lists behind a single mutex and republishes a
//! snapshot over a broadcast channel after every mutation. Background loads
//! never touch shared state directly; they compute a new snapshot and apply
//! it under the lock, guarded by a sequence number so a stale load can never
//! overwrite a newer one.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::Result;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::warn;

use shared::{
    domain::{Camera, Roll, RollFilterMode, RollSortMode},
    error::ValidationError,
    sort::sort_rolls,
};

pub mod events;
pub mod export;
pub mod film_stocks;
pub mod frames;
pub mod gear;
pub mod prefs;
pub mod store;

pub use events::AppEvent;
pub use film_stocks::FilmStocksController;
pub use frames::FramesController;
pub use gear::GearController;
pub use prefs::{Preferences, PreferencesStore};
pub use store::RollStore;

pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// State holder for the roll list: mirrors a filtered, sorted view of the
/// rolls held by the store, plus the camera list the roll editor needs.
pub struct RollsController {
    store: Arc<dyn RollStore>,
    prefs: Arc<PreferencesStore>,
    inner: Mutex<RollsState>,
    events: broadcast::Sender<AppEvent>,
    load_seq: AtomicU64,
}

struct RollsState {
    rolls: Vec<Roll>,
    cameras: Vec<Camera>,
    filter_mode: RollFilterMode,
    sort_mode: RollSortMode,
    // Sequence number of the newest load whose result has been applied.
    applied_seq: u64,
}

impl RollsController {
    /// Initial filter and sort modes come from the preferences store.
    pub fn new(store: Arc<dyn RollStore>, prefs: Arc<PreferencesStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let filter_mode = prefs.roll_filter_mode();
        let sort_mode = prefs.roll_sort_mode();
        Arc::new(Self {
            store,
            prefs,
            inner: Mutex::new(RollsState {
                rolls: Vec::new(),
                cameras: Vec::new(),
                filter_mode,
                sort_mode,
                applied_seq: 0,
            }),
            events,
            load_seq: AtomicU64::new(0),
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    pub async fn rolls(&self) -> Vec<Roll> {
        self.inner.lock().await.rolls.clone()
    }

    pub async fn cameras(&self) -> Vec<Camera> {
        self.inner.lock().await.cameras.clone()
    }

    pub async fn filter_mode(&self) -> RollFilterMode {
        self.inner.lock().await.filter_mode
    }

    pub async fn sort_mode(&self) -> RollSortMode {
        self.inner.lock().await.sort_mode
    }

    /// Persists the selection and re-issues a full background reload, which
    /// replaces the held list. Returns the handle of the spawned load.
    pub async fn set_filter_mode(self: &Arc<Self>, mode: RollFilterMode) -> Result<JoinHandle<()>> {
        self.prefs.set_roll_filter_mode(mode)?;
        let sort_mode = {
            let mut inner = self.inner.lock().await;
            inner.filter_mode = mode;
            inner.sort_mode
        };
        let _ = self.events.send(AppEvent::RollFilterChanged(mode));
        Ok(self.spawn_rolls_load_for(mode, sort_mode))
    }

    /// Persists the selection and re-sorts the held list in place; no
    /// reload.
    pub async fn set_sort_mode(&self, mode: RollSortMode) -> Result<()> {
        self.prefs.set_roll_sort_mode(mode)?;
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.sort_mode = mode;
            sort_rolls(&mut inner.rolls, mode);
            inner.rolls.clone()
        };
        let _ = self.events.send(AppEvent::RollSortChanged(mode));
        let _ = self.events.send(AppEvent::RollsUpdated(snapshot));
        Ok(())
    }

    /// Upsert: an update affecting zero rows means the roll is not stored
    /// yet, so it is inserted instead. Afterwards the roll stays in the held
    /// list only while it satisfies the active filter; either way it stays
    /// in the store. Returns the roll with its assigned id.
    pub async fn submit_roll(self: &Arc<Self>, mut roll: Roll) -> Result<Roll> {
        if roll.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.store.update_roll(&roll).await? == 0 {
            roll.id = self.store.add_roll(&roll).await?;
        }
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.rolls.retain(|r| r.id != roll.id);
            if inner.filter_mode.matches(&roll) {
                inner.rolls.push(roll.clone());
                let mode = inner.sort_mode;
                sort_rolls(&mut inner.rolls, mode);
            }
            inner.rolls.clone()
        };
        let _ = self.events.send(AppEvent::RollsUpdated(snapshot));
        self.spawn_counts_load();
        Ok(roll)
    }

    pub async fn delete_roll(self: &Arc<Self>, roll: &Roll) -> Result<()> {
        self.store.delete_roll(roll.id).await?;
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.rolls.retain(|r| r.id != roll.id);
            inner.rolls.clone()
        };
        let _ = self.events.send(AppEvent::RollsUpdated(snapshot));
        self.spawn_counts_load();
        Ok(())
    }

    pub async fn add_camera(&self, mut camera: Camera) -> Result<Camera> {
        if camera.make.trim().is_empty() && camera.model.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        camera.id = self.store.add_camera(&camera).await?;
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.cameras.retain(|c| c.id != camera.id);
            inner.cameras.push(camera.clone());
            inner
                .cameras
                .sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
            inner.cameras.clone()
        };
        let _ = self.events.send(AppEvent::CamerasUpdated(snapshot));
        Ok(camera)
    }

    pub async fn load_all(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        vec![
            self.spawn_cameras_load(),
            self.spawn_rolls_load().await,
            self.spawn_counts_load(),
        ]
    }

    /// Spawns a background load of the roll list for the currently active
    /// selection.
    pub async fn spawn_rolls_load(self: &Arc<Self>) -> JoinHandle<()> {
        let (filter_mode, sort_mode) = {
            let inner = self.inner.lock().await;
            (inner.filter_mode, inner.sort_mode)
        };
        self.spawn_rolls_load_for(filter_mode, sort_mode)
    }

    /// Spawns a background load carrying the selection that triggered it.
    /// Every load takes the next sequence number; a finished load applies
    /// only if no newer load has applied yet, so overlapping loads converge
    /// on the newest selection and a stale result never overwrites it.
    fn spawn_rolls_load_for(
        self: &Arc<Self>,
        filter_mode: RollFilterMode,
        sort_mode: RollSortMode,
    ) -> JoinHandle<()> {
        let seq = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let _ = controller.events.send(AppEvent::RollsLoading);
            match controller.store.get_rolls(filter_mode).await {
                Ok(mut rolls) => {
                    sort_rolls(&mut rolls, sort_mode);
                    controller.apply_loaded_rolls(seq, rolls).await;
                }
                Err(err) => {
                    warn!("rolls: load failed filter={filter_mode:?} error={err:#}");
                    let _ = controller.events.send(AppEvent::Error(err.to_string()));
                }
            }
        })
    }

    pub fn spawn_counts_load(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            match controller.store.roll_counts().await {
                Ok((active, archived)) => {
                    let _ = controller
                        .events
                        .send(AppEvent::RollCountsUpdated { active, archived });
                }
                Err(err) => {
                    warn!("rolls: count load failed error={err:#}");
                    let _ = controller.events.send(AppEvent::Error(err.to_string()));
                }
            }
        })
    }

    pub fn spawn_cameras_load(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            match controller.store.list_cameras().await {
                Ok(cameras) => {
                    let snapshot = {
                        let mut inner = controller.inner.lock().await;
                        inner.cameras = cameras;
                        inner.cameras.clone()
                    };
                    let _ = controller.events.send(AppEvent::CamerasUpdated(snapshot));
                }
                Err(err) => {
                    warn!("rolls: camera load failed error={err:#}");
                    let _ = controller.events.send(AppEvent::Error(err.to_string()));
                }
            }
        })
    }

    async fn apply_loaded_rolls(&self, seq: u64, rolls: Vec<Roll>) {
        let mut inner = self.inner.lock().await;
        if seq <= inner.applied_seq {
            // A newer load already applied; this result is stale.
            return;
        }
        inner.applied_seq = seq;
        inner.rolls = rolls.clone();
        drop(inner);
        let _ = self.events.send(AppEvent::RollsUpdated(rolls));
    }
}

#[cfg(test)]
#[path = "tests/rolls_tests.rs"]
mod tests;
