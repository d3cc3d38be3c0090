use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use tracing::{error, info, warn};

use sekai_core::{JobKind, Language, LessonKind};

use super::commands::{Command, help_text};
use super::send::{GENERIC_APOLOGY, send_text};
use crate::jobs::{JobError, post_job, run_scheduled_job};
use crate::state::AppState;

/// Discord event handler: dispatches text commands.
pub struct Bot {
    state: Arc<AppState>,
}

impl Bot {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    async fn run_command(
        &self,
        ctx: &Context,
        channel_id: ChannelId,
        command: Command,
    ) -> Result<(), JobError> {
        match command {
            Command::Help => send_text(&ctx.http, channel_id, &help_text()).await?,
            Command::SmallTalk => {
                post_job(&self.state, &ctx.http, channel_id, JobKind::SmallTalk).await?
            }
            Command::Lesson(language, kind) => {
                let job = JobKind::lesson(language, kind);
                post_job(&self.state, &ctx.http, channel_id, job).await?
            }
            Command::ForceQuizzes => {
                for language in Language::ALL {
                    let job = JobKind::lesson(language, LessonKind::Quiz);
                    self.force(ctx, channel_id, job).await?;
                }
            }
            Command::Force(job) => self.force(ctx, channel_id, job).await?,
        }
        Ok(())
    }

    async fn force(&self, ctx: &Context, channel_id: ChannelId, job: JobKind) -> Result<(), JobError> {
        info!("forced run of scheduled job {}", job);
        let posted = run_scheduled_job(&self.state, &ctx.http, job).await?;
        if posted == 0 {
            let note = format!(
                "No reachable channel is configured for {} (set `{}`).",
                job.label(),
                job.channel_env_var()
            );
            send_text(&ctx.http, channel_id, &note).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore messages from bots (including ourselves)
        if msg.author.bot {
            return;
        }

        let Some(command) = Command::parse(&msg.content) else {
            return;
        };
        info!(
            "command {:?} from {} in channel {}",
            command, msg.author.name, msg.channel_id
        );

        if let Err(e) = self.run_command(&ctx, msg.channel_id, command).await {
            error!("command {:?} failed: {}", command, e);
            if let Err(e) = send_text(&ctx.http, msg.channel_id, GENERIC_APOLOGY).await {
                warn!("could not send apology: {}", e);
            }
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);
    }
}
