use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sekai_gateway::discord::start_discord_bot;
use sekai_gateway::scheduler::start_scheduler;
use sekai_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first so the configured log level applies
    let config = sekai_core::Config::load()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.settings.logging.level.as_str().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Configuration loaded (model: {}, {} scheduled jobs, scheduler enabled: {})",
        config.settings.llm.model,
        config.settings.schedule.iter().filter(|e| e.enabled).count(),
        config.settings.scheduler.enabled
    );

    let discord_token = config.secrets.discord_token.clone();
    let scheduler_enabled = config.settings.scheduler.enabled;
    let state = Arc::new(AppState::from_config(config).await?);

    let mut client = start_discord_bot(&discord_token, Arc::clone(&state)).await?;

    let scheduler = scheduler_enabled
        .then(|| start_scheduler(Arc::clone(&state), Arc::clone(&client.http)));
    if scheduler.is_none() {
        info!("Scheduler disabled; only commands will post lessons");
    }

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::select! {
        result = client.start() => {
            if let Err(e) = result {
                error!("Discord client error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
            shard_manager.shutdown_all().await;
        }
    }

    if let Some(handle) = scheduler {
        handle.abort();
    }
    Ok(())
}
