//! State holder for the frame list of one roll.

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
    domain::{Frame, FrameSortMode, RollId},
    error::ValidationError,
    sort::sort_frames,
};
use storage::Storage;

use crate::{events::AppEvent, prefs::PreferencesStore, EVENT_CHANNEL_CAPACITY};

pub struct FramesController {
    storage: Storage,
    prefs: Arc<PreferencesStore>,
    roll_id: RollId,
    inner: Mutex<FramesState>,
    events: broadcast::Sender<AppEvent>,
    load_seq: AtomicU64,
}

struct FramesState {
    frames: Vec<Frame>,
    sort_mode: FrameSortMode,
    applied_seq: u64,
}

impl FramesController {
    pub fn new(storage: Storage, prefs: Arc<PreferencesStore>, roll_id: RollId) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let sort_mode = prefs.frame_sort_mode();
        Arc::new(Self {
            storage,
            prefs,
            roll_id,
            inner: Mutex::new(FramesState {
                frames: Vec::new(),
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

    pub fn roll_id(&self) -> RollId {
        self.roll_id
    }

    pub async fn frames(&self) -> Vec<Frame> {
        self.inner.lock().await.frames.clone()
    }

    pub async fn sort_mode(&self) -> FrameSortMode {
        self.inner.lock().await.sort_mode
    }

    pub fn spawn_load(self: &Arc<Self>) -> JoinHandle<()> {
        let seq = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let sort_mode = controller.inner.lock().await.sort_mode;
            match controller.storage.get_frames(controller.roll_id).await {
                Ok(mut frames) => {
                    sort_frames(&mut frames, sort_mode);
                    let snapshot = {
                        let mut inner = controller.inner.lock().await;
                        if seq <= inner.applied_seq {
                            return;
                        }
                        inner.applied_seq = seq;
                        inner.frames = frames;
                        inner.frames.clone()
                    };
                    let _ = controller.events.send(AppEvent::FramesUpdated {
                        roll_id: controller.roll_id,
                        frames: snapshot,
                    });
                }
                Err(err) => {
                    warn!(
                        "frames: load failed roll={} error={err:#}",
                        controller.roll_id.0
                    );
                    let _ = controller.events.send(AppEvent::Error(err.to_string()));
                }
            }
        })
    }

    /// Persists the selection and re-sorts the held list in place.
    pub async fn set_sort_mode(&self, mode: FrameSortMode) -> Result<()> {
        self.prefs.set_frame_sort_mode(mode)?;
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.sort_mode = mode;
            sort_frames(&mut inner.frames, mode);
            inner.frames.clone()
        };
        let _ = self.events.send(AppEvent::FramesUpdated {
            roll_id: self.roll_id,
            frames: snapshot,
        });
        Ok(())
    }

    /// Upsert; the frame always belongs to this controller's roll.
    pub async fn submit_frame(&self, mut frame: Frame) -> Result<Frame> {
        if frame.count <= 0 {
            return Err(ValidationError::InvalidFrameCount.into());
        }
        frame.roll_id = self.roll_id;
        if self.storage.update_frame(&frame).await? == 0 {
            frame.id = self.storage.add_frame(&frame).await?;
        }
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.frames.retain(|f| f.id != frame.id);
            inner.frames.push(frame.clone());
            let mode = inner.sort_mode;
            sort_frames(&mut inner.frames, mode);
            inner.frames.clone()
        };
        let _ = self.events.send(AppEvent::FramesUpdated {
            roll_id: self.roll_id,
            frames: snapshot,
        });
        Ok(frame)
    }

    pub async fn delete_frame(&self, frame: &Frame) -> Result<()> {
        self.storage.delete_frame(frame.id).await?;
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.frames.retain(|f| f.id != frame.id);
            inner.frames.clone()
        };
        let _ = self.events.send(AppEvent::FramesUpdated {
            roll_id: self.roll_id,
            frames: snapshot,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/frames_tests.rs"]
mod tests;
