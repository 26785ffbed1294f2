pub mod error_bus;

pub use error_bus::{
    Channel, ErrorBus, ListenerId, OperationKind, PermissionErrorEvent, Subscription,
};
