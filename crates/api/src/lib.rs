//! Carte API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! the bundle engine, and the approval authorizer) so integration tests
//! and the binary entrypoint can both access them.

pub mod app;
pub mod auth;
pub mod authz;
pub mod bundle;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
