//! Vote count presentation - renders a [`VoteTally`] into a Discord embed.
//!
//! Pure formatting over the aggregator's output: a non-voting-players line,
//! one line per wagon with the target's display name, total weight, and the
//! voter names, and an "Other" section with the majority threshold and the
//! action-submission deadline. Display names fall back to raw mentions for
//! members that cannot be resolved.

use crate::core::tally::VoteTally;
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use tracing::warn;

const EMBED_COLOUR: u32 = 0x00F8_F98E;

/// Actions are due one hour before the vote count closes.
const DEADLINE_BUFFER_SECS: i64 = 60 * 60;

/// Builds the vote count embed for a tally, resolving member display names
/// through the Discord API.
pub async fn build_vote_count_embed(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    tally: &VoteTally,
) -> serenity::CreateEmbed {
    let names = member_display_names(http, guild_id).await;

    let mut embed = serenity::CreateEmbed::new()
        .title("Vote Count")
        .colour(EMBED_COLOUR)
        .field("Votes", votes_body(tally, &names), false);

    let notes = other_notes(tally);
    if !notes.is_empty() {
        embed = embed.field("Other", notes.join("\n"), false);
    }

    embed
}

fn display(names: &HashMap<String, String>, player_id: &str) -> String {
    names
        .get(player_id)
        .cloned()
        .unwrap_or_else(|| format!("<@{player_id}>"))
}

/// The "Votes" field body: non-voting players, then one line per wagon.
/// Wagons with no members or zero total weight are omitted.
fn votes_body(tally: &VoteTally, names: &HashMap<String, String>) -> String {
    let mut body = String::new();

    let non_voting: Vec<String> = tally
        .non_voting_player_ids()
        .iter()
        .map(|id| display(names, id))
        .collect();
    if !non_voting.is_empty() {
        body.push_str(&format!(
            "**Non-voting players:** *{}*\n\n",
            non_voting.join(", ")
        ));
    }

    let mut wagon_lines: Vec<String> = Vec::new();
    for (target, members) in &tally.wagons {
        let weight = tally.wagon_weight(members);
        if members.is_empty() || weight <= 0 {
            continue;
        }
        let voter_names: Vec<String> = members.iter().map(|id| display(names, id)).collect();
        wagon_lines.push(format!(
            "**{} ({weight})** - {}",
            display(names, target),
            voter_names.join(", ")
        ));
    }

    if wagon_lines.is_empty() {
        body.push_str("`No Votes`");
    } else {
        body.push_str(&wagon_lines.join("\n"));
    }

    body
}

/// The "Other" field lines: majority threshold and submission deadline.
fn other_notes(tally: &VoteTally) -> Vec<String> {
    let mut notes = Vec::new();

    if tally.counter.majority {
        notes.push(format!(
            "> {} alive so {} is Majority",
            tally.majority_player_count(),
            tally.majority_threshold()
        ));
    }

    if let Some(close_at) = tally.counter.close_at {
        let deadline = close_at.timestamp() - DEADLINE_BUFFER_SECS;
        notes.push(format!("> Action submission deadline <t:{deadline}:f>"));
    }

    notes
}

async fn member_display_names(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
) -> HashMap<String, String> {
    match guild_id.members(http, None, None).await {
        Ok(members) => members
            .into_iter()
            .map(|member| {
                (
                    member.user.id.to_string(),
                    member.display_name().to_string(),
                )
            })
            .collect(),
        Err(err) => {
            warn!("Failed to fetch members for guild {guild_id}: {err}");
            HashMap::new()
        }
    }
}
