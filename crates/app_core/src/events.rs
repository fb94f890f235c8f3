use shared::domain::{
    Camera, FilmStock, Filter, Frame, Lens, Roll, RollFilterMode, RollId, RollSortMode,
};

/// Events published by the controllers. Subscribers re-render from the
/// carried snapshots; they never reach into controller state.
#[derive(Debug, Clone)]
pub enum AppEvent {
    RollsLoading,
    RollsUpdated(Vec<Roll>),
    RollFilterChanged(RollFilterMode),
    RollSortChanged(RollSortMode),
    RollCountsUpdated { active: i64, archived: i64 },
    CamerasUpdated(Vec<Camera>),
    LensesUpdated(Vec<Lens>),
    FiltersUpdated(Vec<Filter>),
    FilmStocksUpdated(Vec<FilmStock>),
    FramesUpdated { roll_id: RollId, frames: Vec<Frame> },
    Error(String),
}
