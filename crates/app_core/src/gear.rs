//! State holder for the gear lists (cameras, lenses, filters) and the
//! camera/lens mountability links. Cameras and lenses refuse deletion while
//! a roll or frame still references them; filters delete freely, their
//! frame links go with them.

use std::sync::Arc;

use anyhow::Result;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::warn;

use shared::{
    domain::{Camera, CameraId, Filter, Lens, LensId},
    error::{GearInUseError, ValidationError},
};
use storage::Storage;

use crate::{events::AppEvent, EVENT_CHANNEL_CAPACITY};

pub struct GearController {
    storage: Storage,
    inner: Mutex<GearState>,
    events: broadcast::Sender<AppEvent>,
}

#[derive(Default)]
struct GearState {
    cameras: Vec<Camera>,
    lenses: Vec<Lens>,
    filters: Vec<Filter>,
}

impl GearController {
    pub fn new(storage: Storage) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            storage,
            inner: Mutex::new(GearState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    pub async fn cameras(&self) -> Vec<Camera> {
        self.inner.lock().await.cameras.clone()
    }

    pub async fn lenses(&self) -> Vec<Lens> {
        self.inner.lock().await.lenses.clone()
    }

    pub async fn filters(&self) -> Vec<Filter> {
        self.inner.lock().await.filters.clone()
    }

    pub fn spawn_load(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let loaded = async {
                let cameras = controller.storage.list_cameras().await?;
                let lenses = controller.storage.list_lenses().await?;
                let filters = controller.storage.list_filters().await?;
                anyhow::Ok((cameras, lenses, filters))
            }
            .await;
            match loaded {
                Ok((cameras, lenses, filters)) => {
                    let mut inner = controller.inner.lock().await;
                    inner.cameras = cameras;
                    inner.lenses = lenses;
                    inner.filters = filters;
                    let cameras = inner.cameras.clone();
                    let lenses = inner.lenses.clone();
                    let filters = inner.filters.clone();
                    drop(inner);
                    let _ = controller.events.send(AppEvent::CamerasUpdated(cameras));
                    let _ = controller.events.send(AppEvent::LensesUpdated(lenses));
                    let _ = controller.events.send(AppEvent::FiltersUpdated(filters));
                }
                Err(err) => {
                    warn!("gear: load failed error={err:#}");
                    let _ = controller.events.send(AppEvent::Error(err.to_string()));
                }
            }
        })
    }

    pub async fn submit_camera(&self, mut camera: Camera) -> Result<Camera> {
        if camera.make.trim().is_empty() && camera.model.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.storage.update_camera(&camera).await? == 0 {
            camera.id = self.storage.add_camera(&camera).await?;
        }
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.cameras.retain(|c| c.id != camera.id);
            inner.cameras.push(camera.clone());
            sort_by_name(&mut inner.cameras, |c| c.name());
            inner.cameras.clone()
        };
        let _ = self.events.send(AppEvent::CamerasUpdated(snapshot));
        Ok(camera)
    }

    pub async fn delete_camera(&self, camera: &Camera) -> Result<()> {
        if self.storage.camera_in_use(camera.id).await? {
            return Err(GearInUseError::Camera.into());
        }
        self.storage.delete_camera(camera.id).await?;
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.cameras.retain(|c| c.id != camera.id);
            inner.cameras.clone()
        };
        let _ = self.events.send(AppEvent::CamerasUpdated(snapshot));
        Ok(())
    }

    pub async fn submit_lens(&self, mut lens: Lens) -> Result<Lens> {
        if lens.make.trim().is_empty() && lens.model.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.storage.update_lens(&lens).await? == 0 {
            lens.id = self.storage.add_lens(&lens).await?;
        }
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.lenses.retain(|l| l.id != lens.id);
            inner.lenses.push(lens.clone());
            sort_by_name(&mut inner.lenses, |l| l.name());
            inner.lenses.clone()
        };
        let _ = self.events.send(AppEvent::LensesUpdated(snapshot));
        Ok(lens)
    }

    pub async fn delete_lens(&self, lens: &Lens) -> Result<()> {
        if self.storage.lens_in_use(lens.id).await? {
            return Err(GearInUseError::Lens.into());
        }
        self.storage.delete_lens(lens.id).await?;
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.lenses.retain(|l| l.id != lens.id);
            inner.lenses.clone()
        };
        let _ = self.events.send(AppEvent::LensesUpdated(snapshot));
        Ok(())
    }

    pub async fn submit_filter(&self, mut filter: Filter) -> Result<Filter> {
        if filter.make.trim().is_empty() && filter.model.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.storage.update_filter(&filter).await? == 0 {
            filter.id = self.storage.add_filter(&filter).await?;
        }
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.filters.retain(|f| f.id != filter.id);
            inner.filters.push(filter.clone());
            sort_by_name(&mut inner.filters, |f| f.name());
            inner.filters.clone()
        };
        let _ = self.events.send(AppEvent::FiltersUpdated(snapshot));
        Ok(filter)
    }

    pub async fn delete_filter(&self, filter: &Filter) -> Result<()> {
        self.storage.delete_filter(filter.id).await?;
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.filters.retain(|f| f.id != filter.id);
            inner.filters.clone()
        };
        let _ = self.events.send(AppEvent::FiltersUpdated(snapshot));
        Ok(())
    }

    pub async fn add_mountable(&self, camera_id: CameraId, lens_id: LensId) -> Result<()> {
        self.storage.add_mountable(camera_id, lens_id).await
    }

    pub async fn remove_mountable(&self, camera_id: CameraId, lens_id: LensId) -> Result<()> {
        self.storage.delete_mountable(camera_id, lens_id).await?;
        Ok(())
    }

    pub async fn mountable_lenses(&self, camera_id: CameraId) -> Result<Vec<Lens>> {
        self.storage.mountable_lenses(camera_id).await
    }

    pub async fn mountable_cameras(&self, lens_id: LensId) -> Result<Vec<Camera>> {
        self.storage.mountable_cameras(lens_id).await
    }
}

fn sort_by_name<T>(items: &mut [T], name: impl Fn(&T) -> String) {
    items.sort_by(|a, b| name(a).to_lowercase().cmp(&name(b).to_lowercase()));
}

#[cfg(test)]
#[path = "tests/gear_tests.rs"]
mod tests;
