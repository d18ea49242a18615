//! Event ledger appends.
//!
//! The ledger is append-only: every vote, unvote, and admin adjustment
//! becomes one immutable [`vote_event`] row, and current state is always
//! derived by replay ([`crate::core::tally`]). Appending also maintains the
//! counter's denormalized `voters` cache; both writes happen in a single
//! database transaction so the cache cannot race with concurrent appends.

use crate::{
    entities::{VoteCounter, vote_counter, vote_event},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};

/// A partial event submitted by a command handler.
///
/// Every `None` field means "no change to this attribute". `player_id` is
/// the one field that must be present at append time; it is optional here
/// because admin-facing commands assemble drafts from optional inputs.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    /// Acting player; required
    pub player_id: Option<String>,
    /// Whether the player may cast votes
    pub can_vote: Option<bool>,
    /// Whether the player may be voted for
    pub can_be_voted: Option<bool>,
    /// Whether the player counts toward the majority threshold
    pub counts_for_majority: Option<bool>,
    /// Weight the player's vote carries
    pub vote_weight: Option<i32>,
    /// Target the player is voting for
    pub is_voting_for: Option<String>,
    /// Whether this event removes the player's vote
    pub is_unvoting: bool,
    /// Ledger position; defaults to now, admins may backdate
    pub created_at: Option<DateTime<Utc>>,
}

/// Appends one event to a counter's ledger.
///
/// Side effect: the counter's `voters` cache is updated in the same
/// transaction — the player is removed when unvoting and added (once)
/// otherwise. Failure is non-fatal by design; callers surface a "vote
/// failed" message to the user and nothing is retried.
///
/// # Errors
/// [`Error::MissingPlayerId`] when the draft carries no player,
/// [`Error::CounterNotFound`] when the counter does not exist, and
/// [`Error::Database`] when a write fails (the transaction rolls back).
pub async fn create_new_event(
    db: &DatabaseConnection,
    counter_id: i64,
    draft: EventDraft,
) -> Result<vote_event::Model> {
    let Some(player_id) = draft.player_id else {
        return Err(Error::MissingPlayerId);
    };

    let txn = db.begin().await?;

    let counter = VoteCounter::find_by_id(counter_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::CounterNotFound {
            channel_id: counter_id.to_string(),
        })?;

    let mut voters = counter.voters.0.clone();
    if draft.is_unvoting {
        voters.retain(|voter| voter != &player_id);
    } else if !voters.contains(&player_id) {
        voters.push(player_id.clone());
    }

    let event = vote_event::ActiveModel {
        vote_counter_id: Set(counter.id),
        player_id: Set(player_id),
        can_vote: Set(draft.can_vote),
        can_be_voted: Set(draft.can_be_voted),
        counts_for_majority: Set(draft.counts_for_majority),
        vote_weight: Set(draft.vote_weight),
        is_voting_for: Set(draft.is_voting_for),
        is_unvoting: Set(draft.is_unvoting),
        created_at: Set(draft.created_at.unwrap_or_else(Utc::now)),
        ..Default::default()
    };

    let result = event.insert(&txn).await?;

    let mut model: vote_counter::ActiveModel = counter.into();
    model.voters = Set(vote_counter::VoterList(voters));
    model.update(&txn).await?;

    txn.commit().await?;

    Ok(result)
}

/// Fetches a counter's full ledger in replay order (`created_at` ascending).
pub async fn get_events_for_counter(
    db: &DatabaseConnection,
    counter_id: i64,
) -> Result<Vec<vote_event::Model>> {
    use sea_orm::QueryOrder;

    vote_event::Entity::find()
        .filter(vote_event::Column::VoteCounterId.eq(counter_id))
        .order_by_asc(vote_event::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{create_test_counter, setup_with_counter, ts, vote_draft};

    #[tokio::test]
    async fn test_missing_player_id_appends_nothing() -> Result<()> {
        let (db, counter) = setup_with_counter().await?;

        let result = create_new_event(&db, counter.id, EventDraft::default()).await;
        assert!(matches!(result, Err(Error::MissingPlayerId)));

        let events = get_events_for_counter(&db, counter.id).await?;
        assert!(events.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_counter() -> Result<()> {
        let (db, _counter) = setup_with_counter().await?;

        let result = create_new_event(&db, 999, vote_draft("p1", Some("p2"))).await;
        assert!(matches!(result, Err(Error::CounterNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_append_defaults_created_at_to_now() -> Result<()> {
        let (db, counter) = setup_with_counter().await?;

        let before = Utc::now();
        let event = create_new_event(&db, counter.id, vote_draft("p1", Some("p2"))).await?;
        let after = Utc::now();

        assert!(event.created_at >= before);
        assert!(event.created_at <= after);
        assert_eq!(event.is_voting_for.as_deref(), Some("p2"));
        assert!(!event.is_unvoting);

        Ok(())
    }

    #[tokio::test]
    async fn test_append_honors_backdated_timestamp() -> Result<()> {
        let (db, counter) = setup_with_counter().await?;

        let mut draft = vote_draft("p1", Some("p2"));
        draft.created_at = Some(ts(100));
        create_new_event(&db, counter.id, draft).await?;

        let mut backdated = vote_draft("p1", Some("p3"));
        backdated.created_at = Some(ts(50));
        create_new_event(&db, counter.id, backdated).await?;

        // Replay order is by timestamp, not insertion order
        let events = get_events_for_counter(&db, counter.id).await?;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].is_voting_for.as_deref(), Some("p3"));
        assert_eq!(events[1].is_voting_for.as_deref(), Some("p2"));

        Ok(())
    }

    #[tokio::test]
    async fn test_voters_cache_add_and_remove() -> Result<()> {
        let (db, counter) = setup_with_counter().await?;

        create_new_event(&db, counter.id, vote_draft("p1", Some("p2"))).await?;
        create_new_event(&db, counter.id, vote_draft("p3", Some("p2"))).await?;

        let reloaded = crate::core::counter::get_vote_counter_by_id(&db, counter.id)
            .await?
            .unwrap();
        assert_eq!(reloaded.voters.0, vec!["p1".to_string(), "p3".to_string()]);

        let unvote = EventDraft {
            player_id: Some("p1".to_string()),
            is_unvoting: true,
            created_at: Some(ts(300)),
            ..Default::default()
        };
        create_new_event(&db, counter.id, unvote).await?;

        let reloaded = crate::core::counter::get_vote_counter_by_id(&db, counter.id)
            .await?
            .unwrap();
        assert_eq!(reloaded.voters.0, vec!["p3".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn test_voters_cache_has_set_semantics() -> Result<()> {
        let (db, counter) = setup_with_counter().await?;

        create_new_event(&db, counter.id, vote_draft("p1", Some("p2"))).await?;
        create_new_event(&db, counter.id, vote_draft("p1", Some("p3"))).await?;

        let reloaded = crate::core::counter::get_vote_counter_by_id(&db, counter.id)
            .await?
            .unwrap();
        assert_eq!(reloaded.voters.0, vec!["p1".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn test_ledgers_are_per_counter() -> Result<()> {
        let (db, first) = setup_with_counter().await?;
        let second = create_test_counter(&db, "channel-2").await?;

        create_new_event(&db, first.id, vote_draft("p1", Some("p2"))).await?;
        create_new_event(&db, second.id, vote_draft("p9", Some("p2"))).await?;

        let events = get_events_for_counter(&db, first.id).await?;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].player_id, "p1");

        Ok(())
    }
}
