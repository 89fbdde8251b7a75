//! Tiered content storage.
//!
//! Reads resolve through the remote document cache, then the remote document store, then the
//! local JSON files. Writes always land in the local files first and are then merged into the
//! remote document.

mod cache;
mod clock;
mod local;
mod localize;
mod remote;
mod settings;
mod sync;
mod tiered;

pub use settings::AdminSettingsStore;
pub use sync::{LocalePairSync, SyncAction};
pub use tiered::TieredStore;

#[cfg(test)]
pub use remote::MASTER_KEY_HEADER;
