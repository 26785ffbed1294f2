pub mod connectivity;
pub mod key_value_store;
pub mod replay;

pub use connectivity::ConnectivityProbe;
pub use key_value_store::KeyValueStore;
pub use replay::ActionReplayer;
