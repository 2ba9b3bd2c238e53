//! Traits and structs for courier cache store interaction.
//!
//! If you want to implement your own store, you are in the right place:
//! implement [`Store`] for raw entries and the typed [`CacheStore`] operations
//! come for free.
mod entry;
mod error;
pub mod format;
mod label;
mod store;

pub use entry::StoredEntry;
pub use error::StoreError;
pub use format::{Format, FormatError, FormatExt, JsonFormat};
pub use label::StoreLabel;
pub use store::{CacheStore, Store, StoreResult};

/// Status of deleting result.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
