//! HTTP surface: health, registry listing and per-identifier status

pub mod routes;

pub use routes::build_router;
