//! Error types for the access layer

use spacedock_core::CoreError;
use thiserror::Error;

/// Access layer errors
///
/// Request handlers turn these into structured error responses; [`code`]
/// gives the numeric code the site API reports alongside the message.
///
/// [`code`]: AuthzError::code
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The stored parameter map is not well-formed
    #[error("Malformed parameter map: {0}")]
    MalformedParams(String),

    /// Authorization denied; deliberately says nothing about why
    #[error("You don't have access to this page. You need to have the abilities: {ability}")]
    Forbidden { ability: String },

    /// Role is unknown or not held by the user
    #[error("The user doesn't have this role: {0}")]
    NotAssigned(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid regular expression supplied by a caller
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("The modid is invalid.")]
    ModNotFound(u64),

    #[error("The gameshort is invalid.")]
    InvalidGame(String),

    #[error("The mod must be published first.")]
    NotPublished,

    #[error("The mod is already featured")]
    AlreadyFeatured,

    #[error("This mod isn't featured.")]
    NotFeatured,

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(#[from] CoreError),
}

impl AuthzError {
    /// Site API error code, where one is defined
    pub fn code(&self) -> Option<u32> {
        match self {
            AuthzError::InvalidGame(_) => Some(2125),
            AuthzError::ModNotFound(_) => Some(2130),
            AuthzError::AlreadyFeatured | AuthzError::NotFeatured => Some(3015),
            AuthzError::NotPublished => Some(3022),
            _ => None,
        }
    }

    /// Whether the error is an authorization denial
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthzError::Forbidden { .. })
    }
}

/// Result type for access operations
pub type Result<T> = std::result::Result<T, AuthzError>;
