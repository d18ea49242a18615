//! Database configuration module for `Votekeeper`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{Game, VoteCounter, VoteEvent};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
/// This function handles connection errors and provides a clean interface for database access
/// throughout the application.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/votekeeper.sqlite?mode=rwc".to_string());

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation, ensuring the database schema matches the Rust struct definitions.
/// It creates tables for games, vote counters, and vote events.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let game_table = schema.create_table_from_entity(Game).if_not_exists().take();
    let counter_table = schema
        .create_table_from_entity(VoteCounter)
        .if_not_exists()
        .take();
    let event_table = schema
        .create_table_from_entity(VoteEvent)
        .if_not_exists()
        .take();

    db.execute(builder.build(&game_table)).await?;
    db.execute(builder.build(&counter_table)).await?;
    db.execute(builder.build(&event_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        game::Model as GameModel, vote_counter::Model as VoteCounterModel,
        vote_event::Model as VoteEventModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<GameModel> = Game::find().limit(1).all(&db).await?;
        let _: Vec<VoteCounterModel> = VoteCounter::find().limit(1).all(&db).await?;
        let _: Vec<VoteEventModel> = VoteEvent::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<VoteCounterModel> = VoteCounter::find().limit(1).all(&db).await?;
        Ok(())
    }
}
