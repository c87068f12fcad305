pub mod snapshot;

pub use snapshot::SnapshotRecord;
