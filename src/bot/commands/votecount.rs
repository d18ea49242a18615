//! Vote counter management - `/votecount` and its subcommands.
//!
//! `create` registers a counter in the current channel, `event` lets a host
//! append arbitrary (optionally backdated) ledger events, `manage` pauses
//! or resumes automated posting, and `show` posts the current tally.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, post},
        core::{counter, ledger, tally},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::error;

    const NO_COUNTER: &str = "Vote counter does not exist in this channel";

    /// Manage the automated vote counter in this channel.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands("create", "event", "manage", "show"),
        subcommand_required
    )]
    pub async fn votecount(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Creates a vote counter in this channel.
    #[poise::command(slash_command, guild_only)]
    pub async fn create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Role which players have while alive"] alive: serenity::Role,
        #[description = "Enable majority"] majority: Option<bool>,
        #[description = "Enable plurality"] plurality: Option<bool>,
        #[description = "Lock votes. Votes cannot be changed once they have been made"]
        locked: Option<bool>,
        #[description = "EPOCH timestamp in seconds to close the vote count at"] closeat: Option<
            i64,
        >,
    ) -> Result<()> {
        ctx.defer_ephemeral().await?;

        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let Some(channel) = ctx.guild_channel().await else {
            return Ok(());
        };
        if channel.parent_id.is_none() {
            ctx.say("Channel needs to be in a category registered as a game")
                .await?;
            return Ok(());
        }

        let db = &ctx.data().database;
        let channel_id = ctx.channel_id().to_string();
        if counter::get_vote_counter_by_channel(db, &channel_id)
            .await?
            .is_some()
        {
            ctx.say("A vote counter already exists in this channel")
                .await?;
            return Ok(());
        }

        let params = counter::NewVoteCounter {
            guild_id: guild_id.to_string(),
            channel_id,
            living_role_id: alive.id.to_string(),
            locked_votes: locked.unwrap_or(false),
            majority: majority.unwrap_or(false),
            plurality: plurality.unwrap_or(true),
            close_at: closeat.and_then(|secs| chrono::DateTime::from_timestamp(secs, 0)),
        };

        match counter::create_vote_counter(db, params).await {
            Ok(_) => {
                ctx.say("Created").await?;
            }
            Err(err) => {
                error!("Failed to create vote counter: {err}");
                ctx.say("Unable to create a new vote count here").await?;
            }
        }

        Ok(())
    }

    /// Appends an event to the ledger. Omitted values are left unchanged.
    #[poise::command(slash_command, guild_only)]
    #[allow(clippy::too_many_arguments)]
    pub async fn event(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Player you are updating a value for"] player: serenity::User,
        #[description = "EPOCH timestamp in seconds. Defaults to now"] timestamp: Option<i64>,
        #[description = "Can this player vote?"] vote: Option<bool>,
        #[description = "Can this player be voted?"] recipient: Option<bool>,
        #[description = "Does this player count towards majority?"] majority: Option<bool>,
        #[description = "What is the vote weight this player has?"] weight: Option<i32>,
        #[description = "Who is this player voting for?"] voting: Option<serenity::User>,
        #[description = "Remove the vote from this player"] unvote: Option<bool>,
    ) -> Result<()> {
        ctx.defer_ephemeral().await?;

        let db = &ctx.data().database;
        let channel_id = ctx.channel_id().to_string();
        let Some(vote_counter) = counter::get_vote_counter_by_channel(db, &channel_id).await?
        else {
            ctx.say(NO_COUNTER).await?;
            return Ok(());
        };

        let draft = ledger::EventDraft {
            player_id: Some(player.id.to_string()),
            can_vote: vote,
            can_be_voted: recipient,
            counts_for_majority: majority,
            vote_weight: weight,
            is_voting_for: voting.map(|user| user.id.to_string()),
            is_unvoting: unvote.unwrap_or(false),
            created_at: timestamp.and_then(|secs| chrono::DateTime::from_timestamp(secs, 0)),
        };

        match ledger::create_new_event(db, vote_counter.id, draft).await {
            Ok(_) => {
                ctx.say("Event created").await?;
            }
            Err(err) => {
                error!("Failed to append admin event: {err}");
                ctx.say("An error has occurred; the event was not recorded")
                    .await?;
            }
        }

        Ok(())
    }

    /// Pauses or resumes the counter's automated posting.
    #[poise::command(slash_command, guild_only)]
    pub async fn manage(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Pause the vote count's auto posting"] pause: bool,
    ) -> Result<()> {
        ctx.defer_ephemeral().await?;

        let db = &ctx.data().database;
        let channel_id = ctx.channel_id().to_string();
        let Some(vote_counter) = counter::get_vote_counter_by_channel(db, &channel_id).await?
        else {
            ctx.say(NO_COUNTER).await?;
            return Ok(());
        };

        match counter::set_active(db, vote_counter.id, !pause).await {
            Ok(_) => {
                let verb = if pause { "paused" } else { "resumed" };
                ctx.say(format!("Automated posting {verb}")).await?;
            }
            Err(err) => {
                error!("Failed to update vote counter {}: {err}", vote_counter.id);
                ctx.say("An error has occurred; the counter was not updated")
                    .await?;
            }
        }

        Ok(())
    }

    /// Posts the current tally in this channel.
    #[poise::command(slash_command, guild_only)]
    pub async fn show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let channel_id = ctx.channel_id().to_string();
        let Some(vote_counter) = counter::get_vote_counter_by_channel(db, &channel_id).await?
        else {
            ctx.send(
                poise::CreateReply::default()
                    .content(NO_COUNTER)
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        };

        let (Some(result), Some(guild_id)) = (
            tally::calculate_vote_count(db, vote_counter.id).await?,
            ctx.guild_id(),
        ) else {
            ctx.send(
                poise::CreateReply::default()
                    .content(NO_COUNTER)
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        };

        let embed =
            post::build_vote_count_embed(&ctx.serenity_context().http, guild_id, &result).await;
        ctx.send(poise::CreateReply::default().embed(embed)).await?;

        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
