//! Viewer use-case service.
//!
//! # Responsibility
//! - Map account lifecycle events (login, refresh, logout, account switch)
//!   onto viewer repository calls.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Login and account-switch entry points reject blank user ids; the
//!   repository itself stores any id.
//! - Service layer remains storage-agnostic.

use crate::model::viewer::{Viewer, ViewerId};
use crate::repo::viewer_repo::{RepoError, RepoResult, ViewerRepository};
use log::info;
use std::collections::BTreeSet;

/// Use-case service wrapper for viewer storage.
pub struct ViewerService<R: ViewerRepository> {
    repo: R,
}

impl<R: ViewerRepository> ViewerService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns every cached viewer in first-insert order.
    pub fn get_all(&self) -> RepoResult<Vec<Viewer>> {
        self.repo.get_all()
    }

    /// Returns cached viewers whose id is in `ids`.
    pub fn load_by_ids(&self, ids: &BTreeSet<ViewerId>) -> RepoResult<Vec<Viewer>> {
        self.repo.load_by_ids(ids)
    }

    /// Inserts or replaces viewers as-is, without account-level validation.
    pub fn upsert_all(&self, viewers: &[Viewer]) -> RepoResult<()> {
        self.repo.upsert_all(viewers)
    }

    /// Deletes one viewer; returns `NotFound` when it is not cached.
    pub fn delete(&self, viewer: &Viewer) -> RepoResult<()> {
        self.repo.delete(viewer)
    }

    /// Stores the profile returned by login or profile refresh.
    ///
    /// # Errors
    /// - `Validation` when the profile carries a blank user id.
    pub fn save_viewer(&self, viewer: &Viewer) -> RepoResult<()> {
        viewer.validate()?;
        self.repo.upsert_all(std::slice::from_ref(viewer))?;
        info!("event=viewer_save module=service status=ok");
        Ok(())
    }

    /// Returns the viewer shown on app start, if any is cached.
    pub fn current_viewer(&self) -> RepoResult<Option<Viewer>> {
        Ok(self.repo.get_all()?.into_iter().next())
    }

    /// Removes the cached viewer on logout.
    ///
    /// Returns `false` when nothing was stored for `user_id`.
    pub fn sign_out(&self, user_id: &str) -> RepoResult<bool> {
        match self.repo.delete_by_id(user_id) {
            Ok(()) => {
                info!("event=viewer_sign_out module=service status=ok");
                Ok(true)
            }
            Err(RepoError::NotFound(_)) => {
                info!("event=viewer_sign_out module=service status=noop");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Replaces every cached viewer with `viewer`.
    ///
    /// Removal of other accounts and the upsert commit together; on failure
    /// the previously cached viewers stay in place.
    pub fn switch_account(&self, viewer: &Viewer) -> RepoResult<()> {
        viewer.validate()?;
        let removed = self.repo.replace_all_with(viewer)?;
        info!("event=viewer_switch module=service status=ok removed={removed}");
        Ok(())
    }
}
