//! Preset persistence: records, the store interface, and its backends.

pub mod types;
pub use types::*;
pub mod store;
pub use store::*;
pub mod memory;
pub use memory::*;

#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::SqlitePresetStore;
#[cfg(feature = "remote")]
pub mod client;
#[cfg(feature = "remote")]
pub use client::{AsyncPresetStore, PresetClient};
