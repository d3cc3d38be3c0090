//! Weekly job table and cron helpers.
//!
//! Expressions are classic five-field cron (`min hour dom month dow`, UTC,
//! day-of-week `0`/`7` = Sunday). They are translated to the six-field form
//! the `cron` crate parses, whose numeric weekdays start at Sunday = 1, so
//! weekdays are rewritten to names first.

use std::str::FromStr;

use chrono::{DateTime, Timelike, Utc};
use cron::Schedule;
use serde::{Deserialize, Serialize};

use crate::lesson::JobKind;

/// One `[[schedule]]` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub job: JobKind,
    /// Five-field cron expression, UTC.
    pub cron: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ScheduleEntry {
    pub fn new(job: JobKind, cron: &str) -> Self {
        Self {
            job,
            cron: cron.to_string(),
            enabled: true,
        }
    }
}

/// Friday lessons, 10:00 to 15:00 JST, then small talk at 21:00 JST.
pub fn default_schedule() -> Vec<ScheduleEntry> {
    vec![
        ScheduleEntry::new(JobKind::JapaneseQuiz, "0 1 * * 5"),
        ScheduleEntry::new(JobKind::JapaneseWord, "0 2 * * 5"),
        ScheduleEntry::new(JobKind::JapaneseGrammar, "0 3 * * 5"),
        ScheduleEntry::new(JobKind::EnglishQuiz, "0 4 * * 5"),
        ScheduleEntry::new(JobKind::EnglishWord, "0 5 * * 5"),
        ScheduleEntry::new(JobKind::EnglishGrammar, "0 6 * * 5"),
        ScheduleEntry::new(JobKind::SmallTalk, "0 12 * * 5"),
    ]
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("{job}: cron expression '{expr}' must have 5 fields, found {found}")]
    FieldCount {
        job: JobKind,
        expr: String,
        found: usize,
    },

    #[error("{job}: invalid cron expression '{expr}': {reason}")]
    Invalid {
        job: JobKind,
        expr: String,
        reason: String,
    },

    #[error("{job}: no channel configured (set {env_var} or [channels])")]
    MissingChannel { job: JobKind, env_var: &'static str },
}

const WEEKDAYS: [&str; 8] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Rewrite numeric weekdays in a day-of-week field to names.
fn weekday_names(field: &str) -> String {
    field
        .split(',')
        .map(|item| {
            let (range, step) = match item.split_once('/') {
                Some((range, step)) => (range, Some(step)),
                None => (item, None),
            };
            let named = range
                .split('-')
                .map(|part| match part.parse::<usize>() {
                    Ok(n) if n < WEEKDAYS.len() => WEEKDAYS[n].to_string(),
                    _ => part.to_string(),
                })
                .collect::<Vec<_>>()
                .join("-");
            match step {
                Some(step) => format!("{named}/{step}"),
                None => named,
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a five-field expression into a `cron` schedule.
pub fn parse_cron(expr: &str) -> Result<Schedule, String> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(format!("expected 5 fields, found {}", fields.len()));
    }
    let six = format!(
        "0 {} {} {} {} {}",
        fields[0],
        fields[1],
        fields[2],
        fields[3],
        weekday_names(fields[4])
    );
    Schedule::from_str(&six).map_err(|e| e.to_string())
}

/// Check every entry parses and every scheduled job has somewhere to post.
pub fn validate_schedule(
    entries: &[ScheduleEntry],
    has_channel: impl Fn(JobKind) -> bool,
) -> Result<(), ScheduleError> {
    for entry in entries.iter().filter(|e| e.enabled) {
        let found = entry.cron.split_whitespace().count();
        if found != 5 {
            return Err(ScheduleError::FieldCount {
                job: entry.job,
                expr: entry.cron.clone(),
                found,
            });
        }
        parse_cron(&entry.cron).map_err(|reason| ScheduleError::Invalid {
            job: entry.job,
            expr: entry.cron.clone(),
            reason,
        })?;
        if !has_channel(entry.job) {
            return Err(ScheduleError::MissingChannel {
                job: entry.job,
                env_var: entry.job.channel_env_var(),
            });
        }
    }
    Ok(())
}

pub fn utc_minute(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(now)
}

/// First due minute at or after `now` (unix seconds).
pub fn next_due_at_or_after(schedule: &Schedule, now: DateTime<Utc>) -> Option<i64> {
    let prev = utc_minute(now) - chrono::Duration::minutes(1);
    schedule
        .after(&prev)
        .next()
        .map(|dt| utc_minute(dt).timestamp())
}

/// First due minute strictly after `base_unix`.
pub fn next_due_after(schedule: &Schedule, base_unix: i64) -> Option<i64> {
    let base = DateTime::from_timestamp(base_unix, 0)?;
    schedule
        .after(&base)
        .next()
        .map(|dt| utc_minute(dt).timestamp())
}
