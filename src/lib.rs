//! stash-haptics - Stash plugin that fetches haptic pattern data and
//! converts it to funscripts.
//!
//! This library crate exposes the core functionality for integration testing.

pub mod associate;
pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod host;
pub mod plugin;
pub mod processor;
pub mod provider;
