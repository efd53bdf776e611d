//! WebSocket infrastructure for real-time viewers.
//!
//! Provides group-aware connection management, heartbeat pings, and the
//! HTTP upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::skybox_updates_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
