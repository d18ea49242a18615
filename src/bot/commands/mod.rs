//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Game registration commands
pub mod game;

/// General utility commands
pub mod general;

/// Voting commands
pub mod vote;

/// Vote counter management commands
pub mod votecount;

// Export commands
pub use game::*;
pub use general::*;
pub use vote::*;
pub use votecount::*;
