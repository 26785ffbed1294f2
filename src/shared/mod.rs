pub mod classify;
pub mod config;
pub mod error;
pub mod retry;
pub mod timeout;
