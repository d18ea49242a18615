//! Vote event entity - One row per entry in the append-only ledger.
//!
//! Events are never mutated or deleted; current state is always derived by
//! replaying a counter's events ordered by `created_at`. The optional columns
//! are tri-state: `None` means "no change to this attribute", `Some(v)` sets
//! it. `created_at` defaults to insertion time but may be backdated by an
//! admin to correct history retroactively.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vote event database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote_events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Counter whose ledger this event belongs to
    pub vote_counter_id: i64,
    /// Discord user ID of the acting player
    pub player_id: String,
    /// Whether the player may cast votes (`None` = no change)
    pub can_vote: Option<bool>,
    /// Whether the player may be voted for (`None` = no change)
    pub can_be_voted: Option<bool>,
    /// Whether the player counts toward the majority threshold (`None` = no change)
    pub counts_for_majority: Option<bool>,
    /// Weight this player's vote carries (`None` = no change, default weight 1)
    pub vote_weight: Option<i32>,
    /// Discord user ID the player is voting for (`None` = no change)
    pub is_voting_for: Option<String>,
    /// Whether this event removes the player's vote
    pub is_unvoting: bool,
    /// Ledger position; replay orders by this, ascending
    pub created_at: DateTimeUtc,
}

/// Defines relationships between vote events and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each event belongs to one vote counter
    #[sea_orm(
        belongs_to = "super::vote_counter::Entity",
        from = "Column::VoteCounterId",
        to = "super::vote_counter::Column::Id"
    )]
    VoteCounter,
}

impl Related<super::vote_counter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoteCounter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
