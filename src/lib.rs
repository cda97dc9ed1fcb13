//! Bearer access-token gate for axum services.
//!
//! `services::auth` holds the validation pipeline (parse → signature →
//! time window → revocation → claims); `middleware::auth::access` plugs it
//! into a Router. The rest (`app`, `config`, `api`) is the demo resource
//! server the binary runs.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
