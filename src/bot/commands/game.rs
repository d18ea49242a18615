//! Game registration - `/game register`.
//!
//! Ties the current channel's category to the living/dead/missing role trio
//! so vote counters created under it know which roles to work with.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::game,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::error;

    /// Manage game registrations.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands("register"),
        subcommand_required
    )]
    pub async fn game(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Registers this channel's category as a game.
    #[poise::command(slash_command, guild_only)]
    pub async fn register(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Role which players have while alive"] alive: serenity::Role,
        #[description = "Role given to eliminated players"] dead: serenity::Role,
        #[description = "Role given to players removed from the game"] missing: serenity::Role,
    ) -> Result<()> {
        ctx.defer_ephemeral().await?;

        let Some(channel) = ctx.guild_channel().await else {
            return Ok(());
        };
        let Some(category_id) = channel.parent_id else {
            ctx.say("This channel is not in a category").await?;
            return Ok(());
        };

        let db = &ctx.data().database;
        if game::get_game_by_category(db, &category_id.to_string())
            .await?
            .is_some()
        {
            ctx.say("A game is already registered for this category")
                .await?;
            return Ok(());
        }

        match game::create_game(
            db,
            category_id.to_string(),
            alive.id.to_string(),
            dead.id.to_string(),
            missing.id.to_string(),
        )
        .await
        {
            Ok(_) => {
                ctx.say("Game registered").await?;
            }
            Err(err) => {
                error!("Failed to register game: {err}");
                ctx.say("An error has occurred; the game was not registered")
                    .await?;
            }
        }

        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
