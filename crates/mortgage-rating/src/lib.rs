//! Credit rating for mortgage applications.
//!
//! The [`mortgages`] module holds the domain types, the risk rules, the record repository
//! contract, and the HTTP router. Configuration and telemetry bootstrap live alongside so
//! the API service binary only has to wire them together.

pub mod config;
pub mod error;
pub mod mortgages;
pub mod telemetry;
