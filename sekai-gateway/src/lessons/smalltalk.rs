use std::sync::Arc;

use tracing::{error, info};

use sekai_card::HeaderImage;

use super::{LessonError, LessonService};
use crate::content::SMALLTALK_PROMPT_ID;
use crate::outbound::Outbound;

pub const SMALLTALK_COLOR: u32 = 0x00_AE_86;
pub const SMALLTALK_FOOTER: &str = "Use !smalltalk again for a new one!";
pub const SMALLTALK_CARD_FILENAME: &str = "smalltalk.png";
pub const CARD_FAILED_MESSAGE: &str =
    "Sorry, I couldn't draw the card this time, so here is the text version.";

impl LessonService {
    /// Raw small talk text from the model.
    pub async fn generate_smalltalk(&self) -> Result<String, LessonError> {
        let prompt = self.prompts.get(SMALLTALK_PROMPT_ID)?;
        self.ask(prompt, &[("title", self.card_title.as_str())]).await
    }

    /// Render card text to PNG off the async runtime.
    pub async fn render_card(&self, text: &str) -> Result<Vec<u8>, LessonError> {
        let header = match &self.background {
            Some(source) => HeaderImage::resolve(source).await,
            None => None,
        };
        let cards = Arc::clone(&self.cards);
        let text = text.to_string();
        let png = tokio::task::spawn_blocking(move || cards.paint(&text, header.as_ref())).await??;
        Ok(png)
    }

    /// Card image with footer text, or the plain embed if drawing fails.
    pub async fn smalltalk_posts(&self, text: &str) -> Vec<Outbound> {
        match self.render_card(text).await {
            Ok(png) => {
                info!("small talk card rendered ({} bytes)", png.len());
                vec![Outbound::attachment_with_text(
                    SMALLTALK_FOOTER,
                    SMALLTALK_CARD_FILENAME,
                    png,
                )]
            }
            Err(e) => {
                error!("small talk card failed: {}", e);
                vec![
                    Outbound::embed(text, SMALLTALK_COLOR).with_footer(SMALLTALK_FOOTER),
                    Outbound::text(CARD_FAILED_MESSAGE),
                ]
            }
        }
    }

    pub async fn smalltalk(&self) -> Result<Vec<Outbound>, LessonError> {
        let text = self.generate_smalltalk().await?;
        Ok(self.smalltalk_posts(&text).await)
    }
}
