//! Cache persistence

mod snapshot;

pub use snapshot::SnapshotStore;
