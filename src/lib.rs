//! Geofence users
//!
//! Tracks point-located users and answers which of them fall inside an
//! arbitrary simple polygon. Containment is delegated to the store's
//! geometric predicate (PostGIS `ST_Covers`, or `geo` for the in-memory
//! store); this crate builds the operands and owns the unit-of-work
//! boundaries around them.

pub mod config;
pub mod error;
pub mod geometry;
pub mod models;
pub mod services;
pub mod store;
pub mod store_memory;

#[cfg(feature = "database")]
pub mod database;

#[cfg(feature = "server")]
pub mod api;

pub use error::{ConfigError, GeofenceError, Result, ValidationError};
pub use geometry::{decode_point, encode_point, encode_polygon, Point, Polygon};
pub use models::{GeoFence, NewUser, User};
pub use services::FenceQueryService;
pub use store::UserStore;
pub use store_memory::MemoryUserStore;
