//! Voting commands - `vote` and `unvote`.
//!
//! Both commands append to the channel's event ledger through the core
//! module, announce the action publicly, and follow up with an ephemeral
//! refreshed tally for the voter.

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

    const NO_COUNTER: &str =
        "You cannot vote with the bot in a channel without an automated vote counter";
    const VOTE_FAILED: &str =
        "Vote failed to occur. Please contact the host ASAP with who you wanted to vote if this continues.";

    /// Votes for a player in this channel's automated vote count.
    #[poise::command(slash_command, guild_only)]
    pub async fn vote(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Player you wish to vote"] player: Option<serenity::User>,
        #[description = "Remove your current vote instead"] unvote: Option<bool>,
    ) -> Result<()> {
        if unvote.unwrap_or(false) {
            return submit_unvote(ctx).await;
        }

        let Some(player) = player else {
            ctx.send(
                poise::CreateReply::default()
                    .content("Pick a player to vote, or pass `unvote: True` to remove your vote")
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        };

        let author_name = author_display_name(&ctx).await;
        let draft = ledger::EventDraft {
            player_id: Some(ctx.author().id.to_string()),
            is_voting_for: Some(player.id.to_string()),
            ..Default::default()
        };
        let announcement = format!(
            "**{author_name}** has voted for **{}**",
            player.display_name()
        );

        submit(ctx, draft, announcement).await
    }

    /// Removes your vote in this channel's automated vote count.
    #[poise::command(slash_command, guild_only)]
    pub async fn unvote(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        submit_unvote(ctx).await
    }

    async fn submit_unvote(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let author_name = author_display_name(&ctx).await;
        let draft = ledger::EventDraft {
            player_id: Some(ctx.author().id.to_string()),
            is_unvoting: true,
            ..Default::default()
        };
        let announcement = format!("**{author_name}** has removed their vote");

        submit(ctx, draft, announcement).await
    }

    /// Shared path for vote and unvote: append the event, announce it, then
    /// follow up with the refreshed tally visible to the voter only.
    async fn submit(
        ctx: poise::Context<'_, BotData, Error>,
        draft: ledger::EventDraft,
        announcement: String,
    ) -> Result<()> {
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

        if let Err(err) = ledger::create_new_event(db, vote_counter.id, draft).await {
            error!("Failed to append vote event: {err}");
            ctx.send(
                poise::CreateReply::default()
                    .content(VOTE_FAILED)
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }

        ctx.say(announcement).await?;

        if let (Some(result), Some(guild_id)) = (
            tally::calculate_vote_count(db, vote_counter.id).await?,
            ctx.guild_id(),
        ) {
            let embed =
                post::build_vote_count_embed(&ctx.serenity_context().http, guild_id, &result)
                    .await;
            ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
                .await?;
        }

        Ok(())
    }

    async fn author_display_name(ctx: &poise::Context<'_, BotData, Error>) -> String {
        match ctx.author_member().await {
            Some(member) => member.display_name().to_string(),
            None => ctx.author().name.clone(),
        }
    }
}

// Re-export all commands
pub use inner::*;
