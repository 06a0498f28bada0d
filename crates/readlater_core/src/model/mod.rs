//! Domain model for locally cached account state.
//!
//! # Responsibility
//! - Define canonical data structures persisted by core.
//!
//! # Invariants
//! - Every viewer is identified by its backend-issued `ViewerId`.

pub mod viewer;
