//! Interio real-time event bus.
//!
//! - [`EventBus`] - in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`RealtimeEvent`] - a tagged message addressed to one named group of
//!   real-time clients.
//!
//! Delivery is at-most-once: events published while nobody is subscribed,
//! or while a subscriber lags past the buffer, are gone.

pub mod bus;
pub mod groups;

pub use bus::{EventBus, RealtimeEvent};
