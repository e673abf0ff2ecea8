//! Error taxonomy for the placement stack.

use thiserror::Error;

/// Errors surfaced by the placement controller and its configuration.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// The placed entity's parent chain is missing the anchor the commit
    /// step requires. This is a structural setup mistake by the
    /// integrating application, not a runtime condition.
    #[error("placed entity must have an anchor as a parent")]
    InvalidParentHierarchy,

    #[error("could not determine home directory")]
    NoHomeDirectory,

    #[error("settings io error: {0}")]
    SettingsIo(#[from] std::io::Error),

    #[error("settings format error: {0}")]
    SettingsFormat(#[from] serde_json::Error),
}
