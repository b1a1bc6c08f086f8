//! Saved integration profiles: on-disk store and the service the wizard talks to.

pub mod service;
pub mod store;

pub use service::LocalProfileService;
pub use store::{ProfileStore, StoredProfile};
