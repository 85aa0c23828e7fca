//! Typed async client for the NS1 `/zones` API.

pub mod config;
pub mod error;
pub mod nsone;
pub mod validation;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use nsone::client::NsOneClient;
pub use nsone::types::{
    Zone, ZoneMode, ZonePrimary, ZoneRecord, ZoneSecondary, ZoneSecondaryServer,
};
