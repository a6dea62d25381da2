//! Core domain logic for the carte catalog onboarding backend.
//!
//! Owns the entity model (restaurants and their menu items), the two-pass
//! payload parser, the moderation status state machine, the per-caller
//! staging store, and the [`store::CatalogStore`] seam that durable
//! persistence plugs into. No HTTP and no SQL live here.

pub mod catalog;
pub mod error;
pub mod import;
pub mod staging;
pub mod status;
pub mod store;
pub mod types;
