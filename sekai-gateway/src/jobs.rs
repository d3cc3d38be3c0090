//! Posting lessons to channels; shared by commands and the scheduler.

use std::sync::Arc;

use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};
use tracing::{debug, error, info, warn};

use sekai_core::{JobKind, Language, LessonKind};

use crate::discord::send::{deliver, send_text};
use crate::lessons::{LessonError, reveal_message};
use crate::outbound::Outbound;
use crate::quiz_tracker::TrackedQuiz;
use crate::state::AppState;

/// The Discord calls an answer reveal makes.
#[async_trait::async_trait]
pub trait RevealSink: Send + Sync {
    async fn send_text(&self, channel_id: ChannelId, text: &str) -> serenity::Result<()>;
    async fn end_poll(&self, channel_id: ChannelId, poll_id: MessageId) -> serenity::Result<()>;
}

#[async_trait::async_trait]
impl RevealSink for Http {
    async fn send_text(&self, channel_id: ChannelId, text: &str) -> serenity::Result<()> {
        send_text(self, channel_id, text).await
    }

    async fn end_poll(&self, channel_id: ChannelId, poll_id: MessageId) -> serenity::Result<()> {
        channel_id.end_poll(self, poll_id).await.map(|_| ())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("{0}")]
    Lesson(#[from] LessonError),
    #[error("Discord request failed: {0}")]
    Discord(#[from] serenity::Error),
    #[error("Quiz poll was not posted")]
    MissingPoll,
}

/// Generate non-quiz posts for `job`.
async fn lesson_posts(state: &AppState, job: JobKind) -> Result<Vec<Outbound>, LessonError> {
    match job.parts() {
        None => state.lessons.smalltalk().await,
        Some((language, kind)) => state.lessons.learning_card(language, kind).await,
    }
}

/// Generate and post `job` in one channel.
pub async fn post_job(
    state: &Arc<AppState>,
    http: &Arc<Http>,
    channel_id: ChannelId,
    job: JobKind,
) -> Result<(), JobError> {
    if let Some((language, LessonKind::Quiz)) = job.parts() {
        return post_quiz(state, http, channel_id, language).await;
    }
    let posts = lesson_posts(state, job).await?;
    deliver(http, channel_id, &posts).await?;
    Ok(())
}

/// Post a quiz and schedule its answer reveal.
pub async fn post_quiz(
    state: &Arc<AppState>,
    http: &Arc<Http>,
    channel_id: ChannelId,
    language: Language,
) -> Result<(), JobError> {
    let post = state.lessons.quiz(language).await?;
    let ids = deliver(http, channel_id, &post.messages).await?;
    let poll_id = ids.last().copied().ok_or(JobError::MissingPoll)?;

    let token = state
        .track_quiz(
            language,
            TrackedQuiz {
                channel_id: channel_id.get(),
                poll_message_id: poll_id.get(),
                answer: post.answer,
                explanation: post.explanation,
            },
        )
        .await;

    let delay = state.reveal_delay();
    info!(
        "{} quiz posted in {}, answer reveal in {}s",
        language.label(),
        channel_id,
        delay.as_secs()
    );
    let sink: Arc<dyn RevealSink> = Arc::<Http>::clone(http);
    schedule_reveal(Arc::clone(state), sink, language, token);
    Ok(())
}

/// Reveal the quiz tracked under `token` once the configured delay passes.
pub fn schedule_reveal(
    state: Arc<AppState>,
    sink: Arc<dyn RevealSink>,
    language: Language,
    token: u64,
) -> tokio::task::JoinHandle<()> {
    let delay = state.reveal_delay();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        reveal_quiz(&state, sink.as_ref(), language, token).await;
    })
}

/// Post the answer and end the poll, if the quiz is still the open one.
pub async fn reveal_quiz(
    state: &AppState,
    sink: &dyn RevealSink,
    language: Language,
    token: u64,
) {
    let Some(quiz) = state.take_quiz(language, token).await else {
        debug!("{} quiz was replaced before its reveal", language.label());
        return;
    };
    let Some(channel_id) = non_zero_channel(quiz.channel_id) else {
        return;
    };

    let text = reveal_message(quiz.answer, &quiz.explanation);
    if let Err(e) = sink.send_text(channel_id, &text).await {
        error!("Error revealing {} quiz answer: {}", language.label(), e);
        return;
    }
    if quiz.poll_message_id != 0
        && let Err(e) = sink
            .end_poll(channel_id, MessageId::new(quiz.poll_message_id))
            .await
    {
        warn!("could not end {} quiz poll: {}", language.label(), e);
    }
}

fn non_zero_channel(id: u64) -> Option<ChannelId> {
    (id != 0).then(|| ChannelId::new(id))
}

/// Channels configured for `job` that the bot can currently see.
async fn reachable_channels(state: &AppState, http: &Http, job: JobKind) -> Vec<ChannelId> {
    let mut channels = Vec::new();
    for id in state.config.settings.channels.for_job(job) {
        let Some(channel_id) = non_zero_channel(id) else {
            debug!("skipping channel id 0 for {}", job);
            continue;
        };
        match channel_id.to_channel(http).await {
            Ok(_) => channels.push(channel_id),
            Err(e) => debug!("channel {} for {} unavailable: {}", id, job, e),
        }
    }
    channels
}

/// Run `job` against its configured channels. Returns how many channels
/// were posted to.
///
/// Non-quiz content is generated once and posted to every channel.
pub async fn run_scheduled_job(
    state: &Arc<AppState>,
    http: &Arc<Http>,
    job: JobKind,
) -> Result<usize, JobError> {
    let channels = reachable_channels(state, http, job).await;
    if channels.is_empty() {
        warn!("no reachable channel for scheduled job {}", job);
        return Ok(0);
    }

    if let Some((language, LessonKind::Quiz)) = job.parts() {
        for channel_id in &channels {
            post_quiz(state, http, *channel_id, language).await?;
        }
        return Ok(channels.len());
    }

    let posts = lesson_posts(state, job).await?;
    let mut posted = 0;
    for channel_id in &channels {
        match deliver(http, *channel_id, &posts).await {
            Ok(_) => posted += 1,
            Err(e) => error!("posting {} to {} failed: {}", job, channel_id, e),
        }
    }
    info!("{} posted to {}/{} channels", job, posted, channels.len());
    Ok(posted)
}
