//! Platform-neutral messages produced by the lesson generators.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Embed {
        description: String,
        color: u32,
        footer: Option<String>,
    },
    Attachment {
        content: Option<String>,
        filename: String,
        bytes: Vec<u8>,
    },
    Poll {
        question: String,
        answers: Vec<String>,
    },
}

impl Outbound {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn embed(description: impl Into<String>, color: u32) -> Self {
        Self::Embed {
            description: description.into(),
            color,
            footer: None,
        }
    }

    pub fn with_footer(self, text: impl Into<String>) -> Self {
        match self {
            Self::Embed {
                description, color, ..
            } => Self::Embed {
                description,
                color,
                footer: Some(text.into()),
            },
            other => other,
        }
    }

    pub fn attachment(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::Attachment {
            content: None,
            filename: filename.into(),
            bytes,
        }
    }

    pub fn attachment_with_text(
        content: impl Into<String>,
        filename: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self::Attachment {
            content: Some(content.into()),
            filename: filename.into(),
            bytes,
        }
    }

    /// Filename of an attachment, if this is one.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Attachment { filename, .. } => Some(filename),
            _ => None,
        }
    }
}
