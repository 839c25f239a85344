//! Line directory.
//!
//! Stores station records and line aggregates, hands out their ids, and
//! enforces name uniqueness. Lines are loaded as copies, changed, and saved
//! back whole; optionally every change is written to a JSON snapshot file.

mod error;
mod record;
mod snapshot;
mod store;

pub use error::DirectoryError;
pub use record::{DirectorySnapshot, LineRecord, SectionRecord, StationRecord};
pub use snapshot::SnapshotStore;
pub use store::LineDirectory;
