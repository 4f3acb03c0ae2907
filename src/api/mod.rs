//! API Module
//!
//! HTTP handlers and routing for the cache admin API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /caches` - List registered caches
//! - `GET /caches/:name/stats` - Snapshot of one cache
//! - `POST /caches/:name/cleanup` - Remove expired entries
//! - `POST /caches/:name/invalidate` - Remove entries matching a pattern
//! - `DELETE /caches/:name/keys/:key` - Delete one key
//! - `DELETE /caches/:name` - Clear a cache

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
