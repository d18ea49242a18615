//! Vote counter business logic.
//!
//! Provides creation and lookup of vote counters plus the small state
//! transitions driven by commands and the background ticker: pausing and
//! resuming, deactivation on day close, and advancing the repost schedule.
//! The time checks (`close_due`, `period_due`) are pure so the ticker's
//! decisions can be tested without a clock.

use crate::{
    entities::{VoteCounter, vote_counter},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Set, prelude::*};

/// Parameters for registering a new vote counter in a channel.
#[derive(Debug, Clone)]
pub struct NewVoteCounter {
    /// Guild the counter belongs to
    pub guild_id: String,
    /// Channel to monitor; at most one counter per channel
    pub channel_id: String,
    /// Living role, used when locking the channel on close
    pub living_role_id: String,
    /// First vote per player is permanent
    pub locked_votes: bool,
    /// Stop aggregating once a wagon reaches majority
    pub majority: bool,
    /// Reserved flag
    pub plurality: bool,
    /// Optional hard close deadline
    pub close_at: Option<DateTime<Utc>>,
}

/// Creates a vote counter for a channel.
///
/// The counter starts `active` with an empty voters cache, and `last_period`
/// is seeded to now so automated posting begins with the next tick. Creating
/// a second counter for the same channel fails on the unique index; callers
/// check with [`get_vote_counter_by_channel`] first to give a friendlier
/// message.
pub async fn create_vote_counter(
    db: &DatabaseConnection,
    params: NewVoteCounter,
) -> Result<vote_counter::Model> {
    if params.channel_id.trim().is_empty() {
        return Err(Error::Config {
            message: "Vote counter channel id cannot be empty".to_string(),
        });
    }

    let counter = vote_counter::ActiveModel {
        guild_id: Set(params.guild_id),
        channel_id: Set(params.channel_id),
        living_role_id: Set(params.living_role_id),
        locked_votes: Set(params.locked_votes),
        majority: Set(params.majority),
        plurality: Set(params.plurality),
        active: Set(true),
        close_at: Set(params.close_at),
        last_period: Set(Some(Utc::now())),
        voters: Set(vote_counter::VoterList::default()),
        ..Default::default()
    };

    let result = counter.insert(db).await?;
    Ok(result)
}

/// Finds a vote counter by its unique ID.
pub async fn get_vote_counter_by_id(
    db: &DatabaseConnection,
    counter_id: i64,
) -> Result<Option<vote_counter::Model>> {
    VoteCounter::find_by_id(counter_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the vote counter monitoring a channel, returning `None` if the
/// channel has no counter.
pub async fn get_vote_counter_by_channel(
    db: &DatabaseConnection,
    channel_id: &str,
) -> Result<Option<vote_counter::Model>> {
    VoteCounter::find()
        .filter(vote_counter::Column::ChannelId.eq(channel_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all counters the background ticker should process.
pub async fn list_active_vote_counters(
    db: &DatabaseConnection,
) -> Result<Vec<vote_counter::Model>> {
    VoteCounter::find()
        .filter(vote_counter::Column::Active.eq(true))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets a counter's `active` flag, used by `/votecount manage` and by the
/// ticker when a day closes.
pub async fn set_active(
    db: &DatabaseConnection,
    counter_id: i64,
    active: bool,
) -> Result<vote_counter::Model> {
    let counter = VoteCounter::find_by_id(counter_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::CounterNotFound {
            channel_id: counter_id.to_string(),
        })?;

    let mut model: vote_counter::ActiveModel = counter.into();
    model.active = Set(active);
    model.update(db).await.map_err(Into::into)
}

/// Persists the next scheduled repost time.
///
/// The ticker calls this *before* posting, so the schedule stays monotonic
/// even when the post itself fails.
pub async fn schedule_next_repost(
    db: &DatabaseConnection,
    counter_id: i64,
    next_at: DateTime<Utc>,
) -> Result<vote_counter::Model> {
    let counter = VoteCounter::find_by_id(counter_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::CounterNotFound {
            channel_id: counter_id.to_string(),
        })?;

    let mut model: vote_counter::ActiveModel = counter.into();
    model.last_period = Set(Some(next_at));
    model.update(db).await.map_err(Into::into)
}

/// Whether the counter's hard close deadline has elapsed.
#[must_use]
pub fn close_due(counter: &vote_counter::Model, now: DateTime<Utc>) -> bool {
    counter.close_at.is_some_and(|close_at| now > close_at)
}

/// Whether the counter's scheduled repost time has elapsed.
#[must_use]
pub fn period_due(counter: &vote_counter::Model, now: DateTime<Utc>) -> bool {
    counter.last_period.is_some_and(|last_period| now > last_period)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{create_test_counter, setup_test_db, ts};
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_and_find_by_channel() -> Result<()> {
        let db = setup_test_db().await?;
        let counter = create_test_counter(&db, "channel-1").await?;

        assert!(counter.active);
        assert!(counter.voters.0.is_empty());
        assert!(counter.last_period.is_some());

        let found = get_vote_counter_by_channel(&db, "channel-1").await?;
        assert_eq!(found, Some(counter));

        let absent = get_vote_counter_by_channel(&db, "channel-2").await?;
        assert!(absent.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_channel_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_counter(&db, "channel-1").await?;

        let duplicate = create_test_counter(&db, "channel-1").await;
        assert!(duplicate.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_set_active_and_listing() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_counter(&db, "channel-1").await?;
        let second = create_test_counter(&db, "channel-2").await?;

        set_active(&db, first.id, false).await?;

        let active = list_active_vote_counters(&db).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);

        set_active(&db, first.id, true).await?;
        let active = list_active_vote_counters(&db).await?;
        assert_eq!(active.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_active_missing_counter() -> Result<()> {
        let db = setup_test_db().await?;

        let result = set_active(&db, 999, false).await;
        assert!(matches!(result, Err(Error::CounterNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_schedule_next_repost_persists() -> Result<()> {
        let db = setup_test_db().await?;
        let counter = create_test_counter(&db, "channel-1").await?;

        let next = ts(5000);
        let updated = schedule_next_repost(&db, counter.id, next).await?;
        assert_eq!(updated.last_period, Some(next));

        let reloaded = get_vote_counter_by_id(&db, counter.id).await?.unwrap();
        assert_eq!(reloaded.last_period, Some(next));

        Ok(())
    }

    #[tokio::test]
    async fn test_close_due() -> Result<()> {
        let db = setup_test_db().await?;
        let mut counter = create_test_counter(&db, "channel-1").await?;
        let now = Utc::now();

        // No deadline set
        assert!(!close_due(&counter, now));

        counter.close_at = Some(now + Duration::hours(1));
        assert!(!close_due(&counter, now));

        counter.close_at = Some(now - Duration::seconds(1));
        assert!(close_due(&counter, now));

        Ok(())
    }

    #[tokio::test]
    async fn test_period_due() -> Result<()> {
        let db = setup_test_db().await?;
        let mut counter = create_test_counter(&db, "channel-1").await?;
        let now = Utc::now();

        counter.last_period = None;
        assert!(!period_due(&counter, now));

        counter.last_period = Some(now + Duration::minutes(30));
        assert!(!period_due(&counter, now));

        counter.last_period = Some(now - Duration::minutes(30));
        assert!(period_due(&counter, now));

        Ok(())
    }
}
