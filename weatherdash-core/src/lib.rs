//! Core library for the `weatherdash` terminal weather widget.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - The Weatherbit current-conditions client
//! - The cancellable fetch state machine that drives the UI
//!
//! It is used by `weatherdash-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod source;

pub use config::Config;
pub use error::FetchError;
pub use fetch::{FetcherHandle, RequestState};
pub use model::{QueryTarget, WeatherSnapshot};
pub use source::{WeatherSource, source_from_config, weatherbit::WeatherbitClient};
