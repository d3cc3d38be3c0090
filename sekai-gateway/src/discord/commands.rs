//! Text commands, matched exactly against the trimmed message.

use sekai_core::{JobKind, Language, LessonKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SmallTalk,
    Lesson(Language, LessonKind),
    /// Both scheduled quiz jobs.
    ForceQuizzes,
    Force(JobKind),
    Help,
}

const LESSON_KINDS: [LessonKind; 3] = [LessonKind::Quiz, LessonKind::Word, LessonKind::Grammar];

fn lesson_command(language: Language, kind: LessonKind) -> String {
    format!("!{}{}", language.slug(), kind.slug())
}

impl Command {
    pub fn parse(content: &str) -> Option<Self> {
        let content = content.trim();
        match content {
            "!smalltalk" => return Some(Self::SmallTalk),
            "!help" => return Some(Self::Help),
            "!forcescheduledquiz" => return Some(Self::ForceQuizzes),
            _ => {}
        }
        if !content.starts_with('!') {
            return None;
        }
        for language in Language::ALL {
            for kind in LESSON_KINDS {
                if content == lesson_command(language, kind) {
                    return Some(Self::Lesson(language, kind));
                }
            }
        }
        JobKind::ALL
            .into_iter()
            .find(|job| job.force_command() == content)
            .map(Self::Force)
    }
}

pub fn help_text() -> String {
    let mut lines = vec![
        "**Sekai bot commands**".to_string(),
        "`!smalltalk` small talk card".to_string(),
    ];
    for language in Language::ALL {
        for kind in LESSON_KINDS {
            let what = match kind {
                LessonKind::Quiz => "comprehension quiz",
                LessonKind::Word => "word of the day",
                LessonKind::Grammar => "grammar point",
            };
            lines.push(format!(
                "`{}` {} {}",
                lesson_command(language, kind),
                language.label(),
                what
            ));
        }
    }
    lines.push("`!forcescheduledquiz` run both scheduled quizzes now".to_string());
    for job in JobKind::ALL {
        lines.push(format!(
            "`{}` run the scheduled {} now",
            job.force_command(),
            job.label()
        ));
    }
    lines.push("`!help` this list".to_string());
    lines.join("\n")
}
