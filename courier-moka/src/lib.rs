#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod builder;
mod store;

pub use builder::{ByteCapacity, EntryCapacity, MokaStoreBuilder, NoCapacity};
pub use moka::policy::EvictionPolicy;
pub use store::MokaStore;
