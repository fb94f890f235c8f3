use std::{
    fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, PoisonError},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use shared::domain::{FrameSortMode, RollFilterMode, RollSortMode};

/// Persisted user preferences. Modes are stored as their integer wire
/// values; unknown values fall back to the mode defaults on load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Preferences {
    pub roll_filter_mode: i32,
    pub roll_sort_mode: i32,
    pub frame_sort_mode: i32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            roll_filter_mode: RollFilterMode::Active.value(),
            roll_sort_mode: RollSortMode::Date.value(),
            frame_sort_mode: FrameSortMode::FrameCount.value(),
        }
    }
}

pub struct PreferencesStore {
    path: PathBuf,
    state: Mutex<Preferences>,
}

impl PreferencesStore {
    /// A missing or unreadable file means defaults; the file is created on
    /// the first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| toml::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    pub fn roll_filter_mode(&self) -> RollFilterMode {
        RollFilterMode::from_value(self.locked().roll_filter_mode)
    }

    pub fn set_roll_filter_mode(&self, mode: RollFilterMode) -> Result<()> {
        let mut prefs = self.locked();
        prefs.roll_filter_mode = mode.value();
        self.save(&prefs)
    }

    pub fn roll_sort_mode(&self) -> RollSortMode {
        RollSortMode::from_value(self.locked().roll_sort_mode)
    }

    pub fn set_roll_sort_mode(&self, mode: RollSortMode) -> Result<()> {
        let mut prefs = self.locked();
        prefs.roll_sort_mode = mode.value();
        self.save(&prefs)
    }

    pub fn frame_sort_mode(&self) -> FrameSortMode {
        FrameSortMode::from_value(self.locked().frame_sort_mode)
    }

    pub fn set_frame_sort_mode(&self, mode: FrameSortMode) -> Result<()> {
        let mut prefs = self.locked();
        prefs.frame_sort_mode = mode.value();
        self.save(&prefs)
    }

    fn locked(&self) -> MutexGuard<'_, Preferences> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create preferences directory '{}'", parent.display())
                })?;
            }
        }
        let raw = toml::to_string_pretty(prefs)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write preferences '{}'", self.path.display()))
    }
}
