//! Client layer for the monitoring server's HTTP API
//!
//! One file per API surface: check results/catalog/settings, the SAP
//! system health summary, the paginated resource lists and the tag
//! endpoints. All calls are blocking (`ureq`) and must run on a
//! background thread; the UI modules poll their results over mpsc.

pub mod checks;
pub mod client;
pub mod health;
pub mod lists;
pub mod tags;

pub use client::{ApiError, ApiResult, Client};
