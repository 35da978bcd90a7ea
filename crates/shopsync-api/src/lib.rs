//! # shopsync-api
//!
//! HTTP transport of the ERP gateway built on Axum.
//!
//! Extracts sync and RPC requests from form or multipart bodies, hands
//! them to the dispatcher, renders the resulting values and captures
//! errors the dispatcher lets through.

pub mod app;
pub mod error;
pub mod form;
pub mod handlers;
pub mod middleware;
pub mod render;
pub mod router;
pub mod state;

pub use app::{GatewayStores, build_app, build_runner, build_state};
pub use state::AppState;
