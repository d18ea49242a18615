//! Core business logic for `Votekeeper`.
//!
//! Everything in this module is framework-agnostic: functions take a
//! database connection and entity data, and return structured results that
//! the bot layer formats for Discord. The vote-count aggregation itself
//! ([`tally::replay`]) is a pure function over the event ledger.

/// Vote counter lifecycle - creation, lookups, activation, tick scheduling
pub mod counter;
/// Registered game operations
pub mod game;
/// Event ledger appends
pub mod ledger;
/// Ledger replay and vote-count aggregation
pub mod tally;
