pub mod action;

pub use action::{ActionDraft, ActionKind, ActionPayload, OfflineAction};
