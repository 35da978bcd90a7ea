//! Middleware for the sync routes.

pub mod capture;
pub mod logging;
