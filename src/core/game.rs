//! Registered game business logic.
//!
//! A game ties a Discord category to the living/dead/missing role trio used
//! by the game-management commands. Vote counters are created in channels
//! under a registered category.

use crate::{
    entities::{Game, game},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Registers a new game for a category with its role trio.
///
/// Each category can hold at most one game; inserting a second registration
/// for the same category fails on the unique index.
pub async fn create_game(
    db: &DatabaseConnection,
    category_id: String,
    living_role_id: String,
    dead_role_id: String,
    missing_role_id: String,
) -> Result<game::Model> {
    if category_id.trim().is_empty() {
        return Err(Error::Config {
            message: "Game category id cannot be empty".to_string(),
        });
    }

    let game = game::ActiveModel {
        category_id: Set(category_id),
        living_role_id: Set(living_role_id),
        dead_role_id: Set(dead_role_id),
        missing_role_id: Set(missing_role_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = game.insert(db).await?;
    Ok(result)
}

/// Finds the game registered for a category, returning `None` if the
/// category has no game.
pub async fn get_game_by_category(
    db: &DatabaseConnection,
    category_id: &str,
) -> Result<Option<game::Model>> {
    Game::find()
        .filter(game::Column::CategoryId.eq(category_id))
        .one(db)
        .await
        .map_err(Into::into)
}
