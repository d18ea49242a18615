//! Vote counter entity - One automated vote count per monitored channel.
//!
//! Each counter carries the voting-mode flags (`locked_votes`, `majority`,
//! `plurality`), scheduling state for the background ticker (`active`,
//! `close_at`, `last_period`), and a denormalized `voters` cache. The cache
//! is convenience state only; the event ledger is always ground truth.

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Denormalized list of player ids that currently have a vote down.
///
/// Stored as a JSON column. Maintained with set semantics inside the same
/// transaction as each ledger append; never read by the aggregator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct VoterList(pub Vec<String>);

/// Vote counter database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote_counters")]
pub struct Model {
    /// Unique identifier for the vote counter
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild the counter belongs to
    pub guild_id: String,
    /// Discord channel being monitored; one counter per channel
    #[sea_orm(unique)]
    pub channel_id: String,
    /// Role identifying living players, used when locking the channel on close
    pub living_role_id: String,
    /// Once a player votes, their target can never change
    pub locked_votes: bool,
    /// Stop aggregating as soon as a wagon reaches majority
    pub majority: bool,
    /// Reserved flag, currently unused
    pub plurality: bool,
    /// Whether the background ticker processes this counter
    pub active: bool,
    /// Hard close deadline; the day ends once this passes
    pub close_at: Option<DateTimeUtc>,
    /// Next scheduled automatic repost of the tally
    pub last_period: Option<DateTimeUtc>,
    /// Cache of players with a vote down (not authoritative)
    #[sea_orm(column_type = "Json")]
    pub voters: VoterList,
}

/// Defines relationships between vote counters and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One counter owns many ledger events
    #[sea_orm(has_many = "super::vote_event::Entity")]
    VoteEvents,
}

impl Related<super::vote_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoteEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
