use anyhow::Result;
use async_trait::async_trait;

use shared::domain::{Camera, CameraId, Roll, RollFilterMode, RollId};
use storage::Storage;

/// The slice of the external store the rolls controller consumes. Mutations
/// report affected-row counts; reads return full entity snapshots.
#[async_trait]
pub trait RollStore: Send + Sync {
    async fn add_roll(&self, roll: &Roll) -> Result<RollId>;
    async fn update_roll(&self, roll: &Roll) -> Result<u64>;
    async fn delete_roll(&self, roll_id: RollId) -> Result<u64>;
    async fn get_rolls(&self, filter: RollFilterMode) -> Result<Vec<Roll>>;
    async fn roll_counts(&self) -> Result<(i64, i64)>;
    async fn list_cameras(&self) -> Result<Vec<Camera>>;
    async fn add_camera(&self, camera: &Camera) -> Result<CameraId>;
}

#[async_trait]
impl RollStore for Storage {
    async fn add_roll(&self, roll: &Roll) -> Result<RollId> {
        Storage::add_roll(self, roll).await
    }

    async fn update_roll(&self, roll: &Roll) -> Result<u64> {
        Storage::update_roll(self, roll).await
    }

    async fn delete_roll(&self, roll_id: RollId) -> Result<u64> {
        Storage::delete_roll(self, roll_id).await
    }

    async fn get_rolls(&self, filter: RollFilterMode) -> Result<Vec<Roll>> {
        Storage::get_rolls(self, filter).await
    }

    async fn roll_counts(&self) -> Result<(i64, i64)> {
        Storage::roll_counts(self).await
    }

    async fn list_cameras(&self) -> Result<Vec<Camera>> {
        Storage::list_cameras(self).await
    }

    async fn add_camera(&self, camera: &Camera) -> Result<CameraId> {
        Storage::add_camera(self, camera).await
    }
}
