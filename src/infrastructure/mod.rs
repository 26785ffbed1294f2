pub mod connectivity;
pub mod events;
pub mod storage;
