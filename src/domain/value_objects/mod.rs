pub mod action_id;
pub mod user_id;

pub use action_id::ActionId;
pub use user_id::UserId;
