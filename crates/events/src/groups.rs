//! Well-known broadcast groups and event tags.

/// Group joined by every viewer on `/ws/skybox-updates/`.
pub const SKYBOX_GROUP: &str = "skybox-updates";

/// Event tag published after the current skybox was replaced.
pub const SKYBOX_UPDATE: &str = "skybox_update";

/// Text relayed to viewers with [`SKYBOX_UPDATE`].
pub const SKYBOX_UPDATED_MESSAGE: &str = "Skybox updated";
