//! Background Tasks Module
//!
//! Fire-and-forget work run alongside the caches.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired entries at a fixed interval
//! - Preload: Warms caches with commonly needed data

mod cleanup;
mod preload;

pub use cleanup::spawn_cleanup_task;
pub use preload::{PreloadReport, Preloader};
