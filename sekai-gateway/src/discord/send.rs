use std::time::Duration;

use serenity::builder::{
    CreateAttachment, CreateEmbed, CreateEmbedFooter, CreateMessage, CreatePoll, CreatePollAnswer,
};
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};

use crate::outbound::Outbound;

pub const DISCORD_MESSAGE_LIMIT: usize = 2000;
const DISCORD_EMBED_DESC_LIMIT: usize = 4096;

/// Polls stay open this long unless the answer reveal ends them first.
const QUIZ_POLL_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

pub const GENERIC_APOLOGY: &str = "Sorry, something went wrong while preparing that. Please try again later.";

/// Split on line boundaries to fit `limit` chars; lines longer than the
/// limit are split by character.
pub(crate) fn split_for_limit(content: &str, limit: usize) -> Vec<String> {
    if content.chars().count() <= limit {
        return vec![content.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for line in content.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > limit {
            for ch in line.chars() {
                if current_len + 1 > limit {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(ch);
                current_len += 1;
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Text posted ahead of an attachment, and the caption sent with the file.
/// Only the last chunk of an over-long text rides on the attachment message.
pub(crate) fn split_caption(content: Option<&str>) -> (Vec<String>, Option<String>) {
    let Some(content) = content.filter(|c| !c.is_empty()) else {
        return (Vec::new(), None);
    };
    let mut chunks = split_for_limit(content, DISCORD_MESSAGE_LIMIT);
    let caption = chunks.pop();
    (chunks, caption)
}

pub async fn send_text(http: &Http, channel_id: ChannelId, content: &str) -> serenity::Result<()> {
    for chunk in split_for_limit(content, DISCORD_MESSAGE_LIMIT) {
        channel_id.say(http, chunk).await?;
    }
    Ok(())
}

/// Deliver `messages` in order, returning the ID of the last message sent
/// for each entry.
pub async fn deliver(
    http: &Http,
    channel_id: ChannelId,
    messages: &[Outbound],
) -> serenity::Result<Vec<MessageId>> {
    let mut ids = Vec::with_capacity(messages.len());
    for message in messages {
        let id = match message {
            Outbound::Text(text) => {
                let mut last = None;
                for chunk in split_for_limit(text, DISCORD_MESSAGE_LIMIT) {
                    last = Some(channel_id.say(http, chunk).await?.id);
                }
                last
            }
            Outbound::Embed {
                description,
                color,
                footer,
            } => {
                let mut last = None;
                for chunk in split_for_limit(description, DISCORD_EMBED_DESC_LIMIT) {
                    let mut embed = CreateEmbed::new().description(chunk).color(*color);
                    if let Some(footer) = footer {
                        embed = embed.footer(CreateEmbedFooter::new(footer.as_str()));
                    }
                    let sent = channel_id
                        .send_message(http, CreateMessage::new().embed(embed))
                        .await?;
                    last = Some(sent.id);
                }
                last
            }
            Outbound::Attachment {
                content,
                filename,
                bytes,
            } => {
                let (leading, caption) = split_caption(content.as_deref());
                for chunk in leading {
                    channel_id.say(http, chunk).await?;
                }
                let mut msg = CreateMessage::new()
                    .add_file(CreateAttachment::bytes(bytes.clone(), filename.as_str()));
                if let Some(caption) = caption {
                    msg = msg.content(caption);
                }
                Some(channel_id.send_message(http, msg).await?.id)
            }
            Outbound::Poll { question, answers } => {
                let poll = CreatePoll::new()
                    .question(question.as_str())
                    .answers(
                        answers
                            .iter()
                            .map(|a| CreatePollAnswer::new().text(a.as_str()))
                            .collect(),
                    )
                    .duration(QUIZ_POLL_DURATION);
                Some(
                    channel_id
                        .send_message(http, CreateMessage::new().poll(poll))
                        .await?
                        .id,
                )
            }
        };
        ids.extend(id);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_for_limit("hello", 10), vec!["hello".to_string()]);
    }

    #[test]
    fn splits_on_lines() {
        let chunks = split_for_limit("aaaa\nbbbb\ncccc", 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n".to_string(), "cccc".to_string()]);
    }

    #[test]
    fn long_line_splits_by_char() {
        let chunks = split_for_limit("ab\nこんにちは世界です", 4);
        assert_eq!(chunks, vec!["ab\n", "こんにち", "は世界で", "す"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
    }

    #[test]
    fn chunks_preserve_text() {
        let text = "line one\n".repeat(400);
        let chunks = split_for_limit(&text, DISCORD_MESSAGE_LIMIT);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= DISCORD_MESSAGE_LIMIT));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn short_caption_stays_on_attachment() {
        assert_eq!(
            split_caption(Some("@everyone **Weekly Quiz**")),
            (Vec::new(), Some("@everyone **Weekly Quiz**".to_string()))
        );
        assert_eq!(split_caption(None), (Vec::new(), None));
        assert_eq!(split_caption(Some("")), (Vec::new(), None));
    }

    #[test]
    fn long_caption_is_split_ahead_of_attachment() {
        let paragraph = "これは長いクイズの段落です。\n".repeat(300);
        let (leading, caption) = split_caption(Some(&paragraph));
        let caption = caption.unwrap();

        assert!(!leading.is_empty());
        assert!(
            leading
                .iter()
                .chain(std::iter::once(&caption))
                .all(|chunk| chunk.chars().count() <= DISCORD_MESSAGE_LIMIT)
        );
        assert_eq!(leading.concat() + &caption, paragraph);
    }
}
