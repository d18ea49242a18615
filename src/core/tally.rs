//! Ledger replay and vote-count aggregation.
//!
//! Current voting state is never stored; it is derived by folding a
//! counter's full event ledger, ordered by `created_at`, into per-player
//! state and wagon groupings. Full replay keeps the result consistent with
//! the ledger and lets an admin backdate a correction that the next
//! aggregation picks up naturally, at O(events) per query.
//!
//! [`replay`] is a pure function so the fold semantics are testable without
//! a database; [`calculate_vote_count`] is the thin fetching wrapper the
//! rest of the crate uses.

use crate::{
    core::ledger,
    entities::{VoteCounter, vote_counter, vote_event},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use std::collections::BTreeMap;

/// Wagon groupings: target player id -> ids of players voting for them.
///
/// A `BTreeMap` so scan order (and therefore the majority early-exit
/// tie-break) is deterministic.
pub type Wagons = BTreeMap<String, Vec<String>>;

/// Per-player derived state, keyed by player id.
pub type PlayerStats = BTreeMap<String, PlayerState>;

/// A player's current state as derived from the ledger.
///
/// Materialized fresh on every aggregation and discarded after the response
/// is sent; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    /// Discord user ID of the player
    pub player_id: String,
    /// Whether the player may cast votes
    pub can_vote: bool,
    /// Whether the player may be voted for
    pub can_be_voted: bool,
    /// Whether the player counts toward the majority threshold
    pub counts_for_majority: bool,
    /// Weight the player's vote carries
    pub vote_weight: i32,
    /// Who the player is currently voting for, if anyone
    pub is_voting_for: Option<String>,
    /// Whether the player's latest ledger action was an unvote
    pub is_unvoting: bool,
    /// When the player first appeared in the ledger
    pub created_at: DateTime<Utc>,
}

impl PlayerState {
    /// Default state for a player first seen at `created_at`: may vote, may
    /// be voted, counts for majority, weight 1, not voting for anyone.
    #[must_use]
    pub const fn new(player_id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            player_id,
            can_vote: true,
            can_be_voted: true,
            counts_for_majority: true,
            vote_weight: 1,
            is_voting_for: None,
            is_unvoting: false,
            created_at,
        }
    }
}

/// The result of aggregating one counter's ledger.
#[derive(Debug, Clone)]
pub struct VoteTally {
    /// Wagon groupings, target id -> voter ids
    pub wagons: Wagons,
    /// Per-player derived state
    pub player_stats: PlayerStats,
    /// The counter the tally was computed for
    pub counter: vote_counter::Model,
}

impl VoteTally {
    /// Number of tracked players who count toward majority.
    #[must_use]
    pub fn majority_player_count(&self) -> usize {
        counted_players(&self.player_stats)
    }

    /// The vote-weight threshold that ends the day when `majority` is
    /// enabled: `floor(count / 2) + 1`.
    #[must_use]
    pub fn majority_threshold(&self) -> i64 {
        majority_threshold(counted_players(&self.player_stats))
    }

    /// Total vote weight currently on a wagon (members default to weight 1).
    #[must_use]
    pub fn wagon_weight(&self, members: &[String]) -> i64 {
        wagon_weight(&self.player_stats, members)
    }

    /// Players with no vote down, in id order.
    #[must_use]
    pub fn non_voting_player_ids(&self) -> Vec<&str> {
        self.player_stats
            .values()
            .filter(|state| state.is_voting_for.is_none())
            .map(|state| state.player_id.as_str())
            .collect()
    }
}

fn counted_players(stats: &PlayerStats) -> usize {
    stats
        .values()
        .filter(|state| state.counts_for_majority)
        .count()
}

fn majority_threshold(player_count: usize) -> i64 {
    i64::try_from(player_count / 2 + 1).unwrap_or(i64::MAX)
}

fn wagon_weight(stats: &PlayerStats, members: &[String]) -> i64 {
    members
        .iter()
        .map(|member| {
            stats
                .get(member)
                .map_or(1, |state| i64::from(state.vote_weight))
        })
        .sum()
}

/// Folds a counter's ledger into `(wagons, player_stats)`.
///
/// Events must be in replay order (`created_at` ascending). For each event:
/// the acting player's state is created on first sight and updated from the
/// event's non-`None` fields; the vote target follows the counter's
/// locked-vote mode; a wagon entry is ensured for the current target; and
/// the acting player's membership is reconciled across every known wagon.
/// When the counter runs under `majority`, the fold returns as soon as any
/// wagon's total weight reaches `floor(counted/2) + 1` — events after that
/// point are not applied.
#[must_use]
pub fn replay(counter: &vote_counter::Model, events: &[vote_event::Model]) -> (Wagons, PlayerStats) {
    let mut wagons = Wagons::new();
    let mut stats = PlayerStats::new();

    for event in events {
        wagons.entry(event.player_id.clone()).or_default();
        let state = stats
            .entry(event.player_id.clone())
            .or_insert_with(|| PlayerState::new(event.player_id.clone(), event.created_at));

        if let Some(can_be_voted) = event.can_be_voted {
            state.can_be_voted = can_be_voted;
        }
        if let Some(can_vote) = event.can_vote {
            state.can_vote = can_vote;
        }
        if let Some(counts) = event.counts_for_majority {
            state.counts_for_majority = counts;
        }
        if let Some(weight) = event.vote_weight {
            state.vote_weight = weight;
        }

        if counter.locked_votes {
            // First vote sticks forever; later targets and unvotes are ignored.
            if state.is_voting_for.is_none() {
                state.is_voting_for = event.is_voting_for.clone();
            }
        } else {
            if let Some(target) = &event.is_voting_for {
                state.is_voting_for = Some(target.clone());
            }
            if event.is_unvoting {
                state.is_voting_for = None;
            }
        }

        let target = state.is_voting_for.clone();
        let actor_can_vote = state.can_vote;

        // A wagon forms for the target even before the target acts.
        if let Some(target_id) = &target {
            wagons.entry(target_id.clone()).or_default();
            stats
                .entry(target_id.clone())
                .or_insert_with(|| PlayerState::new(target_id.clone(), event.created_at));
        }

        // Reconcile the acting player's membership across every known wagon.
        let wagon_keys: Vec<String> = wagons.keys().cloned().collect();
        for key in wagon_keys {
            let target_can_be_voted = stats.get(&key).map_or(true, |s| s.can_be_voted);

            if target.is_none() || !(target_can_be_voted && actor_can_vote) {
                if let Some(members) = wagons.get_mut(&key) {
                    members.retain(|member| member != &event.player_id);
                }
                if !target_can_be_voted {
                    wagons.remove(&key);
                }
            } else if target.as_deref() == Some(key.as_str()) {
                if let Some(members) = wagons.get_mut(&key) {
                    if !members.iter().any(|member| member == &event.player_id) {
                        members.push(event.player_id.clone());
                    }
                }
            } else if let Some(members) = wagons.get_mut(&key) {
                members.retain(|member| member != &event.player_id);
            }
        }

        if counter.majority {
            let threshold = majority_threshold(counted_players(&stats));
            let reached = wagons
                .values()
                .any(|members| wagon_weight(&stats, members) >= threshold);
            if reached {
                return (wagons, stats);
            }
        }
    }

    (wagons, stats)
}

/// Aggregates a counter's ledger into a [`VoteTally`].
///
/// Returns `Ok(None)` when the counter does not exist.
pub async fn calculate_vote_count(
    db: &DatabaseConnection,
    counter_id: i64,
) -> Result<Option<VoteTally>> {
    let Some(counter) = VoteCounter::find_by_id(counter_id).one(db).await? else {
        return Ok(None);
    };

    let events = ledger::get_events_for_counter(db, counter_id).await?;
    let (wagons, player_stats) = replay(&counter, &events);

    Ok(Some(VoteTally {
        wagons,
        player_stats,
        counter,
    }))
}
