//! Client for the Stash GraphQL API.

mod client;
mod types;

pub use client::HostClient;
pub use types::{Scene, SceneFile};
