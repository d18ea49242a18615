//! Game entity - A registered game category and its role trio.
//!
//! Registering a category ties it to the living/dead/missing roles used by
//! game-management commands. Vote counters live in channels under a
//! registered category.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Registered game database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "games")]
pub struct Model {
    /// Unique identifier for the game
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord category channel the game lives under; one game per category
    #[sea_orm(unique)]
    pub category_id: String,
    /// Role held by living players
    pub living_role_id: String,
    /// Role given to eliminated players
    pub dead_role_id: String,
    /// Role given to players removed from the game
    pub missing_role_id: String,
    /// When the game was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between games and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
