//! Domain layer: journey models, errors and ports.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CatalogError, CatalogResult, ListenerError};
