//! Moderation status state machine for catalog entities.
//!
//! Every entity is created `Pending` and can move to `Approved` exactly
//! once. `Approved` is terminal; there is no rejection or rollback state.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status name stored for newly staged/persisted entities.
pub const STATUS_PENDING: &str = "pending";

/// Status name after a successful moderation pass.
pub const STATUS_APPROVED: &str = "approved";

/// Moderation status of a catalog entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Pending,
    Approved,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Approved => STATUS_APPROVED,
        }
    }

    /// Parse a stored status name.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_APPROVED => Ok(Self::Approved),
            other => Err(CoreError::Parse(format!("Unknown entity status '{other}'"))),
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// The only legal move is `Pending -> Approved`.
    pub fn can_transition_to(&self, next: EntityStatus) -> bool {
        matches!((self, next), (Self::Pending, Self::Approved))
    }
}

impl std::fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
