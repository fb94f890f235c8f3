use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("frame count must be positive")]
    InvalidFrameCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GearInUseError {
    #[error("camera is referenced by at least one roll")]
    Camera,
    #[error("lens is referenced by at least one frame")]
    Lens,
    #[error("film stock is referenced by at least one roll")]
    FilmStock,
}
