//! Prompt content embedded from `prompts/`.
//!
//! Each file is a markdown body with TOML front matter between `+++` lines:
//!
//! ```text
//! +++
//! id = "word-japanese"
//! user = "Give me a Japanese word of the day."
//! +++
//! You are a Japanese language tutor ...
//! ```

mod template;

use std::collections::HashMap;

use include_dir::{Dir, include_dir};
use serde::Deserialize;
use thiserror::Error;

use sekai_core::{Language, LessonKind};

pub use template::{TemplateVars, render_template, vars_from_pairs};

static PROMPTS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/prompts");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content parse error in {path}: {message}")]
    Parse { path: String, message: String },
    #[error("missing prompt: {0}")]
    MissingPrompt(String),
    #[error("duplicate prompt id: {0}")]
    Duplicate(String),
    #[error("template error: {0}")]
    TemplateParse(String),
    #[error("missing template variable: {0}")]
    MissingVar(String),
}

#[derive(Debug, Clone, Deserialize)]
struct PromptFrontMatter {
    id: String,
    user: String,
    #[serde(default)]
    vars: Vec<String>,
}

/// A system prompt plus the user turn sent with it.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub id: String,
    pub user: String,
    pub vars: Vec<String>,
    pub body: String,
}

/// System and user text ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

impl PromptTemplate {
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<RenderedPrompt, ContentError> {
        let vars = vars_from_pairs(vars);
        if let Some(missing) = self.vars.iter().find(|name| !vars.contains_key(*name)) {
            return Err(ContentError::MissingVar(missing.clone()));
        }
        Ok(RenderedPrompt {
            system: render_template(&self.body, &vars)?,
            user: render_template(&self.user, &vars)?,
        })
    }
}

/// All embedded prompts by id.
#[derive(Debug, Default)]
pub struct PromptBook {
    prompts: HashMap<String, PromptTemplate>,
}

impl PromptBook {
    pub fn load() -> Result<Self, ContentError> {
        let mut book = Self::default();
        for file in PROMPTS_DIR.files() {
            let path = file.path().display().to_string();
            if !path.ends_with(".md") {
                continue;
            }
            let text = file.contents_utf8().ok_or_else(|| ContentError::Parse {
                path: path.clone(),
                message: "not valid UTF-8".to_string(),
            })?;
            book.insert(parse_prompt(&path, text)?)?;
        }
        Ok(book)
    }

    fn insert(&mut self, prompt: PromptTemplate) -> Result<(), ContentError> {
        if self.prompts.contains_key(&prompt.id) {
            return Err(ContentError::Duplicate(prompt.id));
        }
        self.prompts.insert(prompt.id.clone(), prompt);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&PromptTemplate, ContentError> {
        self.prompts
            .get(id)
            .ok_or_else(|| ContentError::MissingPrompt(id.to_string()))
    }

    pub fn lesson(&self, language: Language, kind: LessonKind) -> Result<&PromptTemplate, ContentError> {
        self.get(&lesson_prompt_id(language, kind))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.prompts.keys().map(String::as_str)
    }
}

pub fn lesson_prompt_id(language: Language, kind: LessonKind) -> String {
    format!("{}-{}", kind.slug(), language.slug())
}

pub const SMALLTALK_PROMPT_ID: &str = "smalltalk";

fn parse_prompt(path: &str, text: &str) -> Result<PromptTemplate, ContentError> {
    let (front, body) = split_front_matter(text).map_err(|message| ContentError::Parse {
        path: path.to_string(),
        message,
    })?;
    let front: PromptFrontMatter = toml::from_str(&front).map_err(|e| ContentError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    Ok(PromptTemplate {
        id: front.id,
        user: front.user,
        vars: front.vars,
        body: body.trim().to_string(),
    })
}

fn split_front_matter(text: &str) -> Result<(String, String), String> {
    let mut lines = text.lines();
    let Some(first) = lines.next() else {
        return Err("missing front matter".to_string());
    };
    if first.trim() != "+++" {
        return Err("front matter must start with +++".to_string());
    }

    let mut front = Vec::new();
    for line in &mut lines {
        if line.trim() == "+++" {
            let body = lines.collect::<Vec<_>>().join("\n");
            return Ok((front.join("\n"), body));
        }
        front.push(line);
    }

    Err("front matter must end with +++".to_string())
}
