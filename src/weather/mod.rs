//! Weather polling against NOAA's Climate Data Online v2 API.
//!
//! Looks up stations by ZIP code, lists the datasets a station offers and
//! fetches a window of readings, one request at a time.

pub mod client;
pub mod types;

pub use self::client::{NcdcClient, WeatherReport};
pub use self::types::{Dataset, Observation, Station};
