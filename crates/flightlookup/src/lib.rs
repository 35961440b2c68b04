//! `flightlookup` - Flight status lookup with airport autocomplete
//!
//! This library provides flight-number and route lookups backed by a live
//! flight-data provider or a built-in mock dataset, an airport search over the
//! same dataset, an HTTP surface for both, and a debounced interactive lookup
//! client.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod airports;
pub mod cli;
pub mod client;
pub mod config;
pub mod dataset;
pub mod display;
pub mod error;
pub mod flights;
pub mod logging;
pub mod model;
pub mod server;
pub mod services;
pub mod upstream;

pub use config::Config;
pub use error::{Error, Result};
pub use flights::{FlightQuery, RouteQuery};
pub use logging::init_logging;
pub use model::{Airport, Flight};
pub use services::Services;
