//! Bridges the event bus to connected real-time clients.

mod relay;

pub use relay::NotificationRelay;
