//! Middleware for the HTTP interface.

pub mod cors;

pub use cors::create_cors_layer;
