//! Core library for the `rtweather` tool.
//!
//! This crate defines:
//! - The current-weather data model and request state
//! - A client for the provider's `current.json` endpoint
//! - An observable view model holding the state of the last search
//! - Configuration & credentials handling
//!
//! It is used by `rtweather-cli`, but any front end can watch the view model.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod state;

pub use client::{WeatherApiClient, WeatherClient};
pub use config::Config;
pub use error::RequestFailed;
pub use model::{Condition, Current, Location, Reading, RequestState, WeatherQuery, WeatherRecord};
pub use state::WeatherViewModel;
