pub mod config;
pub mod types;

pub use config::{DepotVolumeKind, LocalStorage, TargetSpec};
pub use types::*;
