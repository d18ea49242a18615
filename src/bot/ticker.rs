//! Background ticker - sweeps active vote counters for closes and reposts.
//!
//! One task, spawned at startup, polls every `tick_interval_secs` over all
//! counters flagged active. Per counter the close check runs before the
//! repost check; both may fire in the same tick. Failures are logged per
//! counter and never abort the sweep. There is no lock between overlapping
//! ticks; the interval is assumed larger than per-tick processing time.

use crate::{
    bot::post,
    config::settings::Settings,
    core::{counter, tally},
    entities::vote_counter,
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

/// Runs the sweep loop for the lifetime of the process.
pub async fn run(ctx: serenity::Context, db: DatabaseConnection, settings: Settings) {
    let period = std::time::Duration::from_secs(settings.tick_interval_secs.max(1));
    let mut interval = tokio::time::interval(period);
    info!("Vote count ticker sweeping every {}s", period.as_secs());

    loop {
        interval.tick().await;
        if let Err(err) = sweep(&ctx, &db, &settings).await {
            error!("Vote count sweep failed: {err}");
        }
    }
}

async fn sweep(
    ctx: &serenity::Context,
    db: &DatabaseConnection,
    settings: &Settings,
) -> Result<()> {
    let counters = counter::list_active_vote_counters(db).await?;

    for vc in &counters {
        if let Err(err) = check_on_close(ctx, db, vc).await {
            error!("Close check failed for counter {}: {err}", vc.id);
        }
        if let Err(err) = check_for_regular_vote_count(ctx, db, vc, settings).await {
            error!("Repost check failed for counter {}: {err}", vc.id);
        }
    }

    Ok(())
}

/// Ends the day for a counter whose close deadline has elapsed.
///
/// Deactivates the counter, tries to revoke Send Messages from the living
/// role (posting a fallback warning when that fails), then posts the final
/// tally under a "Day has ended" banner. A future or unset `close_at`
/// changes nothing and posts nothing.
pub async fn check_on_close(
    ctx: &serenity::Context,
    db: &DatabaseConnection,
    vc: &vote_counter::Model,
) -> Result<()> {
    if !counter::close_due(vc, Utc::now()) {
        return Ok(());
    }

    counter::set_active(db, vc.id, false).await?;

    let channel_id = parse_channel(&vc.channel_id)?;
    if let Err(err) = lock_channel(ctx, channel_id, &vc.living_role_id).await {
        warn!("Failed to lock channel {channel_id}: {err}");
        if let Err(send_err) = channel_id
            .say(&ctx.http, "Failed to lock channel. Do not post")
            .await
        {
            error!("Failed to post lock warning in {channel_id}: {send_err}");
        }
    }

    if let Some(result) = tally::calculate_vote_count(db, vc.id).await? {
        let guild_id = parse_guild(&vc.guild_id)?;
        let embed = post::build_vote_count_embed(&ctx.http, guild_id, &result).await;
        channel_id
            .send_message(
                &ctx.http,
                serenity::CreateMessage::new()
                    .content("Day has ended")
                    .embed(embed),
            )
            .await?;
    }

    Ok(())
}

/// Posts the scheduled tally refresh for a counter whose repost time has
/// elapsed.
///
/// The next slot is persisted *before* posting, so the schedule stays
/// monotonic even when the post fails.
pub async fn check_for_regular_vote_count(
    ctx: &serenity::Context,
    db: &DatabaseConnection,
    vc: &vote_counter::Model,
    settings: &Settings,
) -> Result<()> {
    if !counter::period_due(vc, Utc::now()) {
        return Ok(());
    }

    let next = Utc::now() + Duration::hours(settings.repost_period_hours);
    counter::schedule_next_repost(db, vc.id, next).await?;

    if let Some(result) = tally::calculate_vote_count(db, vc.id).await? {
        let channel_id = parse_channel(&vc.channel_id)?;
        let guild_id = parse_guild(&vc.guild_id)?;
        let embed = post::build_vote_count_embed(&ctx.http, guild_id, &result).await;
        channel_id
            .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
            .await?;
    }

    Ok(())
}

async fn lock_channel(
    ctx: &serenity::Context,
    channel_id: serenity::ChannelId,
    living_role_id: &str,
) -> Result<()> {
    let role_id = serenity::RoleId::new(parse_snowflake(living_role_id, "role")?);
    channel_id
        .create_permission(
            &ctx.http,
            serenity::PermissionOverwrite {
                allow: serenity::Permissions::empty(),
                deny: serenity::Permissions::SEND_MESSAGES,
                kind: serenity::PermissionOverwriteType::Role(role_id),
            },
        )
        .await
        .map_err(Into::into)
}

fn parse_channel(value: &str) -> Result<serenity::ChannelId> {
    Ok(serenity::ChannelId::new(parse_snowflake(value, "channel")?))
}

fn parse_guild(value: &str) -> Result<serenity::GuildId> {
    Ok(serenity::GuildId::new(parse_snowflake(value, "guild")?))
}

fn parse_snowflake(value: &str, what: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| Error::Config {
            message: format!("Invalid {what} id: {value}"),
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_snowflake() {
        assert_eq!(parse_snowflake("123456", "channel").unwrap(), 123_456);
        assert!(parse_snowflake("0", "channel").is_err());
        assert!(parse_snowflake("not-a-number", "channel").is_err());
        assert!(parse_snowflake("", "channel").is_err());
    }
}
