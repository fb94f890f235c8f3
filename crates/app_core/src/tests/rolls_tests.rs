use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use tokio::time::{sleep, timeout};

use super::*;
use shared::domain::{CameraId, RollId};
use storage::Storage;

fn date(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 6, day)
        .expect("date")
        .and_hms_opt(12, 0, 0)
        .expect("time")
}

struct Fixture {
    storage: Storage,
    prefs: Arc<PreferencesStore>,
    controller: Arc<RollsController>,
    _temp: tempfile::TempDir,
}

async fn fixture() -> Fixture {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let temp = tempfile::tempdir().expect("temp dir");
    let prefs = Arc::new(PreferencesStore::open(temp.path().join("prefs.toml")));
    let controller = RollsController::new(Arc::new(storage.clone()), Arc::clone(&prefs));
    Fixture {
        storage,
        prefs,
        controller,
        _temp: temp,
    }
}

async fn wait_for_counts(rx: &mut broadcast::Receiver<AppEvent>) -> (i64, i64) {
    timeout(Duration::from_secs(5), async {
        loop {
            if let AppEvent::RollCountsUpdated { active, archived } =
                rx.recv().await.expect("event stream open")
            {
                return (active, archived);
            }
        }
    })
    .await
    .expect("counts event")
}

#[tokio::test]
async fn submit_new_roll_inserts_and_appears_once() {
    let fx = fixture().await;
    let submitted = fx
        .controller
        .submit_roll(Roll::new("First roll", date(1)))
        .await
        .expect("submit");
    assert!(submitted.id.0 > 0);

    let rolls = fx.controller.rolls().await;
    assert_eq!(rolls.len(), 1);
    assert_eq!(rolls[0], submitted);
}

#[tokio::test]
async fn submit_existing_roll_keeps_single_occurrence() {
    let fx = fixture().await;
    let mut roll = fx
        .controller
        .submit_roll(Roll::new("Original name", date(1)))
        .await
        .expect("submit");

    roll.name = "Renamed".into();
    roll.iso = 400;
    let resubmitted = fx.controller.submit_roll(roll.clone()).await.expect("resubmit");
    assert_eq!(resubmitted.id, roll.id);

    let rolls = fx.controller.rolls().await;
    let occurrences: Vec<&Roll> = rolls.iter().filter(|r| r.id == roll.id).collect();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].name, "Renamed");
    assert_eq!(occurrences[0].iso, 400);

    let stored = fx
        .storage
        .get_rolls(RollFilterMode::All)
        .await
        .expect("stored rolls");
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn submit_archived_roll_under_active_filter_drops_from_list() {
    let fx = fixture().await;
    let mut roll = fx
        .controller
        .submit_roll(Roll::new("To archive", date(1)))
        .await
        .expect("submit");
    assert_eq!(fx.controller.rolls().await.len(), 1);

    roll.archived = true;
    fx.controller.submit_roll(roll.clone()).await.expect("archive");

    // Gone from the held list, still in the store.
    assert!(fx.controller.rolls().await.is_empty());
    let stored = fx
        .storage
        .get_rolls(RollFilterMode::Archived)
        .await
        .expect("stored rolls");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, roll.id);
}

#[tokio::test]
async fn delete_removes_single_occurrence() {
    let fx = fixture().await;
    let keep = fx
        .controller
        .submit_roll(Roll::new("Keep", date(1)))
        .await
        .expect("submit");
    let gone = fx
        .controller
        .submit_roll(Roll::new("Gone", date(2)))
        .await
        .expect("submit");

    fx.controller.delete_roll(&gone).await.expect("delete");

    let rolls = fx.controller.rolls().await;
    assert_eq!(rolls.len(), 1);
    assert_eq!(rolls[0].id, keep.id);
    assert!(fx
        .storage
        .get_roll(gone.id)
        .await
        .expect("get roll")
        .is_none());
}

#[tokio::test]
async fn sort_mode_change_reorders_held_list_stably() {
    let fx = fixture().await;
    // Equal dates, submitted as b, a, c.
    for name in ["b-roll", "a-roll", "c-roll"] {
        fx.controller
            .submit_roll(Roll::new(name, date(5)))
            .await
            .expect("submit");
    }

    fx.controller
        .set_sort_mode(RollSortMode::Name)
        .await
        .expect("sort by name");
    let names: Vec<String> = fx.controller.rolls().await.iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, vec!["a-roll", "b-roll", "c-roll"]);

    // All dates equal: the stable sort keeps the name order.
    fx.controller
        .set_sort_mode(RollSortMode::Date)
        .await
        .expect("sort by date");
    let names: Vec<String> = fx.controller.rolls().await.iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, vec!["a-roll", "b-roll", "c-roll"]);

    assert_eq!(fx.prefs.roll_sort_mode(), RollSortMode::Date);
}

#[tokio::test]
async fn set_filter_mode_persists_and_reloads() {
    let fx = fixture().await;
    fx.controller
        .submit_roll(Roll::new("Active roll", date(1)))
        .await
        .expect("submit");
    let mut archived = Roll::new("Archived roll", date(2));
    archived.archived = true;
    fx.storage.add_roll(&archived).await.expect("seed archived");

    let load = fx
        .controller
        .set_filter_mode(RollFilterMode::Archived)
        .await
        .expect("set filter");
    load.await.expect("load");

    let names: Vec<String> = fx.controller.rolls().await.iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, vec!["Archived roll"]);
    assert_eq!(fx.prefs.roll_filter_mode(), RollFilterMode::Archived);
}

#[tokio::test]
async fn persisted_modes_survive_controller_restart() {
    let temp = tempfile::tempdir().expect("temp dir");
    let prefs_path = temp.path().join("prefs.toml");
    let storage = Storage::new("sqlite::memory:").await.expect("db");

    {
        let prefs = Arc::new(PreferencesStore::open(&prefs_path));
        let controller = RollsController::new(Arc::new(storage.clone()), prefs);
        controller
            .set_filter_mode(RollFilterMode::All)
            .await
            .expect("set filter")
            .await
            .expect("load");
        controller
            .set_sort_mode(RollSortMode::Camera)
            .await
            .expect("set sort");
    }

    let prefs = Arc::new(PreferencesStore::open(&prefs_path));
    let controller = RollsController::new(Arc::new(storage), prefs);
    assert_eq!(controller.filter_mode().await, RollFilterMode::All);
    assert_eq!(controller.sort_mode().await, RollSortMode::Camera);
}

#[tokio::test]
async fn empty_roll_name_is_rejected() {
    let fx = fixture().await;
    let err = fx
        .controller
        .submit_roll(Roll::new("   ", date(1)))
        .await
        .expect_err("validation failure");
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::EmptyName)
    );
    assert!(fx.controller.rolls().await.is_empty());
}

#[tokio::test]
async fn submit_publishes_refreshed_counts() {
    let fx = fixture().await;
    let mut events = fx.controller.subscribe_events();

    fx.controller
        .submit_roll(Roll::new("Counted", date(1)))
        .await
        .expect("submit");
    assert_eq!(wait_for_counts(&mut events).await, (1, 0));

    let mut archived = Roll::new("Counted", date(1));
    archived.id = fx.controller.rolls().await[0].id;
    archived.archived = true;
    fx.controller.submit_roll(archived).await.expect("archive");
    assert_eq!(wait_for_counts(&mut events).await, (0, 1));
}

#[tokio::test]
async fn add_camera_keeps_camera_list_sorted() {
    let fx = fixture().await;
    fx.controller
        .add_camera(Camera {
            make: "Nikon".into(),
            model: "FM2".into(),
            ..Camera::default()
        })
        .await
        .expect("camera");
    fx.controller
        .add_camera(Camera {
            make: "Canon".into(),
            model: "A-1".into(),
            ..Camera::default()
        })
        .await
        .expect("camera");

    let makes: Vec<String> = fx
        .controller
        .cameras()
        .await
        .iter()
        .map(|c| c.make.clone())
        .collect();
    assert_eq!(makes, vec!["Canon", "Nikon"]);
}

struct SlowActiveLoads {
    storage: Storage,
    delay: Duration,
}

#[async_trait]
impl RollStore for SlowActiveLoads {
    async fn add_roll(&self, roll: &Roll) -> Result<RollId> {
        self.storage.add_roll(roll).await
    }

    async fn update_roll(&self, roll: &Roll) -> Result<u64> {
        self.storage.update_roll(roll).await
    }

    async fn delete_roll(&self, roll_id: RollId) -> Result<u64> {
        self.storage.delete_roll(roll_id).await
    }

    async fn get_rolls(&self, filter: RollFilterMode) -> Result<Vec<Roll>> {
        // Loads for the Active filter lag behind everything else.
        if filter == RollFilterMode::Active {
            sleep(self.delay).await;
        }
        self.storage.get_rolls(filter).await
    }

    async fn roll_counts(&self) -> Result<(i64, i64)> {
        self.storage.roll_counts().await
    }

    async fn list_cameras(&self) -> Result<Vec<Camera>> {
        self.storage.list_cameras().await
    }

    async fn add_camera(&self, camera: &Camera) -> Result<CameraId> {
        self.storage.add_camera(camera).await
    }
}

#[tokio::test]
async fn stale_load_result_is_dropped() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .add_roll(&Roll::new("active roll", date(1)))
        .await
        .expect("seed active");
    let mut archived = Roll::new("archived roll", date(2));
    archived.archived = true;
    storage.add_roll(&archived).await.expect("seed archived");

    let temp = tempfile::tempdir().expect("temp dir");
    let prefs = Arc::new(PreferencesStore::open(temp.path().join("prefs.toml")));
    let controller = RollsController::new(
        Arc::new(SlowActiveLoads {
            storage,
            delay: Duration::from_millis(100),
        }),
        prefs,
    );

    // Rapid successive filter changes: the first load is still in flight
    // when the second completes.
    let slow = controller
        .set_filter_mode(RollFilterMode::Active)
        .await
        .expect("set active");
    let fast = controller
        .set_filter_mode(RollFilterMode::Archived)
        .await
        .expect("set archived");
    fast.await.expect("fast load");
    slow.await.expect("slow load");

    let names: Vec<String> = controller.rolls().await.iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, vec!["archived roll"]);
    assert_eq!(controller.filter_mode().await, RollFilterMode::Archived);
}

#[tokio::test]
async fn load_guard_ignores_older_sequence() {
    let fx = fixture().await;
    let newer = Roll::new("newer", date(2));
    let older = Roll::new("older", date(1));

    fx.controller.apply_loaded_rolls(2, vec![newer.clone()]).await;
    fx.controller.apply_loaded_rolls(1, vec![older]).await;

    let rolls = fx.controller.rolls().await;
    assert_eq!(rolls.len(), 1);
    assert_eq!(rolls[0].name, "newer");
}
