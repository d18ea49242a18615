//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the Votekeeper application:
//! slash commands, the vote-count embed builder, the background ticker, and
//! bot context management.

/// Discord command implementations (vote, votecount, game, general)
pub mod commands;
/// Vote count embed rendering
pub mod post;
/// Background sweep over active vote counters
pub mod ticker;

use crate::config::settings::Settings;
use crate::errors::Error;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::info;

/// Shared data available to all bot commands.
/// This structure holds the database connection and any other global state
/// that commands need to access.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Tunable bot settings loaded at startup
    pub settings: Settings,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection
    /// and settings. This is typically called during bot initialization to
    /// set up the shared context for all commands.
    #[must_use]
    pub const fn new(database: DatabaseConnection, settings: Settings) -> Self {
        Self { database, settings }
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            panic!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                tracing::error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the Poise framework, registers commands, spawns the background
/// ticker, and runs the Discord client until it exits.
pub async fn run_bot(
    token: String,
    database: DatabaseConnection,
    settings: Settings,
) -> crate::errors::Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::vote(),
                commands::unvote(),
                commands::votecount(),
                commands::game(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                // The ticker owns its own handles; the sweep loop runs for
                // the lifetime of the process.
                let ticker_ctx = ctx.clone();
                let ticker_db = database.clone();
                let ticker_settings = settings.clone();
                tokio::spawn(async move {
                    ticker::run(ticker_ctx, ticker_db, ticker_settings).await;
                });

                Ok(BotData::new(database, settings))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await?;
    client.start().await?;
    Ok(())
}
