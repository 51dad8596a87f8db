//! Client-side state layer of the Transparent Talent job-search dashboard.
//!
//! Every store is a thin, stateful client over the Remote API: it fetches
//! JSON, holds it in memory for the session, and sends mutations back.

pub mod api_client;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod profile;
pub mod recommendations;
pub mod state;
pub mod tracking;

#[cfg(test)]
pub(crate) mod testing;

pub use api_client::{HttpApi, RemoteApi};
pub use config::Config;
pub use errors::ApiError;
pub use state::Dashboard;
