pub mod domain;
pub mod error;
pub mod filters;
pub mod location;
pub mod sort;
