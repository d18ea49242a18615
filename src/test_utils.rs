//! Shared test utilities for `Votekeeper`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{counter, ledger},
    entities::{vote_counter, vote_event},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A fixed timestamp `secs` seconds after the epoch, for deterministic
/// ledger ordering in tests.
#[must_use]
pub fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Creates a test vote counter with sensible defaults.
///
/// # Defaults
/// * `guild_id`: `"guild"`
/// * `living_role_id`: `"living-role"`
/// * `locked_votes`: false
/// * `majority`: false
/// * no close deadline
pub async fn create_test_counter(
    db: &DatabaseConnection,
    channel_id: &str,
) -> Result<vote_counter::Model> {
    create_custom_counter(db, channel_id, false, false).await
}

/// Creates a test vote counter with specific voting-mode flags.
pub async fn create_custom_counter(
    db: &DatabaseConnection,
    channel_id: &str,
    locked_votes: bool,
    majority: bool,
) -> Result<vote_counter::Model> {
    counter::create_vote_counter(
        db,
        counter::NewVoteCounter {
            guild_id: "guild".to_string(),
            channel_id: channel_id.to_string(),
            living_role_id: "living-role".to_string(),
            locked_votes,
            majority,
            plurality: false,
            close_at: None,
        },
    )
    .await
}

/// An unsaved counter model for pure replay tests that never touch a store.
#[must_use]
pub fn counter_model(locked_votes: bool, majority: bool) -> vote_counter::Model {
    vote_counter::Model {
        id: 1,
        guild_id: "guild".to_string(),
        channel_id: "channel".to_string(),
        living_role_id: "living-role".to_string(),
        locked_votes,
        majority,
        plurality: false,
        active: true,
        close_at: None,
        last_period: None,
        voters: vote_counter::VoterList::default(),
    }
}

/// A vote draft for `player` targeting `target`, with `created_at` unset.
#[must_use]
pub fn vote_draft(player: &str, target: Option<&str>) -> ledger::EventDraft {
    ledger::EventDraft {
        player_id: Some(player.to_string()),
        is_voting_for: target.map(String::from),
        ..Default::default()
    }
}

/// An unsaved event model built from a draft, for pure replay tests.
/// The draft's `created_at` defaults to the epoch when unset.
#[must_use]
pub fn test_event(draft: ledger::EventDraft) -> vote_event::Model {
    vote_event::Model {
        id: 0,
        vote_counter_id: 1,
        player_id: draft.player_id.unwrap_or_default(),
        can_vote: draft.can_vote,
        can_be_voted: draft.can_be_voted,
        counts_for_majority: draft.counts_for_majority,
        vote_weight: draft.vote_weight,
        is_voting_for: draft.is_voting_for,
        is_unvoting: draft.is_unvoting,
        created_at: draft.created_at.unwrap_or(DateTime::UNIX_EPOCH),
    }
}

/// Sets up a complete test environment with a vote counter.
/// Returns (db, counter) for common test scenarios.
pub async fn setup_with_counter() -> Result<(DatabaseConnection, vote_counter::Model)> {
    let db = setup_test_db().await?;
    let counter = create_test_counter(&db, "channel-1").await?;
    Ok((db, counter))
}
