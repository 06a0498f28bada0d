//! Viewer domain model.
//!
//! # Responsibility
//! - Define the locally cached profile of the signed-in user.
//! - Provide validation for profiles arriving from login or account switch.
//!
//! # Invariants
//! - `user_id` is the stable identity of the record.
//! - At most one stored viewer exists per `user_id`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identifier of a viewer, as issued by the account backend.
pub type ViewerId = String;

/// Locally known profile of an authenticated user.
///
/// Field names serialize to the account payload naming (`userID`,
/// `profileImageURL`, ...), which is also the column naming of the
/// `viewer` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    #[serde(rename = "userID")]
    pub user_id: ViewerId,
    /// Display name.
    pub name: String,
    /// Account handle.
    pub username: String,
    #[serde(rename = "profileImageURL", default)]
    pub profile_image_url: Option<String>,
    /// Support-chat verification token.
    #[serde(rename = "intercomHash", default)]
    pub intercom_hash: Option<String>,
}

/// Validation failures for incoming account profiles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerValidationError {
    #[error("viewer user id must not be empty")]
    EmptyUserId,
}

impl Viewer {
    /// Creates a viewer without optional profile fields.
    pub fn new(
        user_id: impl Into<ViewerId>,
        name: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            username: username.into(),
            profile_image_url: None,
            intercom_hash: None,
        }
    }

    /// Sets the profile image URL.
    pub fn with_profile_image_url(mut self, url: impl Into<String>) -> Self {
        self.profile_image_url = Some(url.into());
        self
    }

    /// Sets the support-chat verification hash.
    pub fn with_intercom_hash(mut self, hash: impl Into<String>) -> Self {
        self.intercom_hash = Some(hash.into());
        self
    }

    /// Checks an incoming account profile is usable.
    ///
    /// # Errors
    /// - `EmptyUserId` when `user_id` is empty or whitespace-only.
    pub fn validate(&self) -> Result<(), ViewerValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ViewerValidationError::EmptyUserId);
        }
        Ok(())
    }
}
