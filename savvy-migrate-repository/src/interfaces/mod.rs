//! This module defines and re-exports the interfaces for the target store.
mod target_store;

pub use target_store::TargetStore;
