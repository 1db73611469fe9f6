//! API Module
//!
//! HTTP handlers and routing for the cache admin API.
//!
//! # Endpoints
//! - `PUT /set` - Cache a JSON value under a key
//! - `GET /get/:key` - Retrieve a cached value
//! - `DELETE /del/:key` - Remove a key
//! - `POST /purge` - Remove all purgeable secondary metadata
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
