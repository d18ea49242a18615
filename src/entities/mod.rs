//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod game;
pub mod vote_counter;
pub mod vote_event;

// Re-export specific types to avoid conflicts
pub use game::{Column as GameColumn, Entity as Game, Model as GameModel};
pub use vote_counter::{
    Column as VoteCounterColumn, Entity as VoteCounter, Model as VoteCounterModel,
};
pub use vote_event::{Column as VoteEventColumn, Entity as VoteEvent, Model as VoteEventModel};
