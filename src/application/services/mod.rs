pub mod action_queue;
pub mod guarded_write;
pub mod sync_service;

pub use action_queue::ActionQueue;
pub use guarded_write::{GuardedWriteService, WriteOutcome};
pub use sync_service::{ReplayReport, SyncService, SyncStatusSnapshot};
