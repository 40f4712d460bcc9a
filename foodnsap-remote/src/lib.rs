//! HTTP side of the foodnsap offline queue: a PostgREST table client used to
//! apply mutations, and a reachability probe that drives auto flush.

pub mod config;
mod error;
pub mod probe;
pub mod store;

pub use config::RemoteConfig;
pub use probe::HttpProbe;
pub use store::RestStore;
