//! Weekly lesson scheduler.
//!
//! Every tick compares each job's next due minute with the clock. A job
//! fires once on the first tick inside its firing window (one minute, or one
//! tick interval when ticks are longer). A due time missed by more than the
//! window (process asleep) is skipped, not caught up.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use serenity::http::Http;
use tokio::time::{Instant, interval_at};
use tracing::{error, info, warn};

use sekai_core::{JobKind, ScheduleEntry, next_due_after, next_due_at_or_after, parse_cron};

use crate::jobs::run_scheduled_job;
use crate::state::AppState;

/// A parsed `[[schedule]]` row.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub job: JobKind,
    pub expr: String,
    schedule: Schedule,
}

/// Parse enabled rows; invalid rows are logged and dropped.
pub fn compile_schedule(entries: &[ScheduleEntry]) -> Vec<ScheduledJob> {
    entries
        .iter()
        .filter(|entry| entry.enabled)
        .filter_map(|entry| match parse_cron(&entry.cron) {
            Ok(schedule) => Some(ScheduledJob {
                job: entry.job,
                expr: entry.cron.clone(),
                schedule,
            }),
            Err(e) => {
                warn!("skipping {} schedule '{}': {}", entry.job, entry.cron, e);
                None
            }
        })
        .collect()
}

const MIN_WINDOW_SECONDS: i64 = 60;

#[derive(Debug)]
pub struct SchedulerState {
    schedules: HashMap<(JobKind, String), i64>,
    window: i64,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::with_tick(1)
    }

    /// State for a loop ticking every `check_seconds`. The firing window
    /// covers at least one full tick so no due time falls between ticks.
    pub fn with_tick(check_seconds: u64) -> Self {
        let tick = i64::try_from(check_seconds).unwrap_or(i64::MAX);
        Self {
            schedules: HashMap::new(),
            window: tick.max(MIN_WINDOW_SECONDS),
        }
    }

    pub fn set_due(&mut self, kind: JobKind, key: &str, next_due: Option<i64>) {
        if let Some(ts) = next_due {
            self.schedules.insert((kind, key.to_string()), ts);
        } else {
            self.schedules.remove(&(kind, key.to_string()));
        }
    }

    pub fn get_due(&self, kind: JobKind, key: &str) -> Option<i64> {
        self.schedules.get(&(kind, key.to_string())).copied()
    }

    /// Jobs due at `now`, advancing their next due time.
    pub fn take_due(&mut self, jobs: &[ScheduledJob], now: DateTime<Utc>) -> Vec<JobKind> {
        let now_ts = now.timestamp();
        let mut fired = Vec::new();
        for job in jobs {
            let Some(initial_due) = next_due_at_or_after(&job.schedule, now) else {
                continue;
            };
            let due = match self.get_due(job.job, &job.expr) {
                Some(due) => due,
                None => {
                    self.set_due(job.job, &job.expr, Some(initial_due));
                    initial_due
                }
            };

            if now_ts >= due && now_ts < due.saturating_add(self.window) {
                fired.push(job.job);
                self.set_due(job.job, &job.expr, next_due_after(&job.schedule, due));
            } else if now_ts > due {
                warn!(
                    "missed {} due at {} ({}s late), waiting for next occurrence",
                    job.job,
                    due,
                    now_ts - due
                );
                self.set_due(job.job, &job.expr, Some(initial_due));
            }
        }
        fired
    }
}

pub fn start_scheduler(state: Arc<AppState>, http: Arc<Http>) -> tokio::task::JoinHandle<()> {
    let check_seconds = state.config.settings.scheduler.check_seconds.max(1);
    let jobs = compile_schedule(&state.config.settings.schedule);
    let mut interval = interval_at(
        Instant::now() + Duration::from_secs(check_seconds),
        Duration::from_secs(check_seconds),
    );

    info!(
        "scheduler started ({} jobs, check_seconds={})",
        jobs.len(),
        check_seconds
    );

    tokio::spawn(async move {
        let mut scheduler = SchedulerState::with_tick(check_seconds);
        loop {
            interval.tick().await;
            for job in scheduler.take_due(&jobs, Utc::now()) {
                info!("running scheduled job {}", job);
                if let Err(e) = run_scheduled_job(&state, &http, job).await {
                    error!("scheduled job {} failed: {}", job, e);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use sekai_core::default_schedule;

    use super::*;

    fn at(d: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        // October 2026: the 16th and 23rd are Fridays
        Utc.with_ymd_and_hms(2026, 10, d, h, m, s).unwrap()
    }

    #[test]
    fn fires_once_in_due_minute() {
        let jobs = compile_schedule(&default_schedule());
        let mut state = SchedulerState::new();

        assert!(state.take_due(&jobs, at(16, 0, 59, 30)).is_empty());
        assert_eq!(
            state.take_due(&jobs, at(16, 1, 0, 10)),
            vec![JobKind::JapaneseQuiz]
        );
        assert!(state.take_due(&jobs, at(16, 1, 0, 40)).is_empty());

        let next = state.get_due(JobKind::JapaneseQuiz, "0 1 * * 5").unwrap();
        assert_eq!(next, at(23, 1, 0, 0).timestamp());
    }

    #[test]
    fn runs_each_job_at_its_hour() {
        let jobs = compile_schedule(&default_schedule());
        let mut state = SchedulerState::new();
        state.take_due(&jobs, at(15, 12, 0, 0));

        assert_eq!(state.take_due(&jobs, at(16, 5, 0, 5)), vec![JobKind::EnglishWord]);
        assert_eq!(state.take_due(&jobs, at(16, 12, 0, 5)), vec![JobKind::SmallTalk]);
    }

    #[test]
    fn missed_minute_is_not_caught_up() {
        let jobs = compile_schedule(&[ScheduleEntry::new(JobKind::SmallTalk, "0 12 * * 5")]);
        let mut state = SchedulerState::new();
        state.take_due(&jobs, at(16, 11, 0, 0));

        assert!(state.take_due(&jobs, at(16, 12, 5, 0)).is_empty());
        let next = state.get_due(JobKind::SmallTalk, "0 12 * * 5").unwrap();
        assert_eq!(next, at(23, 12, 0, 0).timestamp());
    }

    #[test]
    fn long_ticks_still_fire_between_checks() {
        let jobs = compile_schedule(&[ScheduleEntry::new(JobKind::JapaneseQuiz, "0 1 * * 5")]);
        let mut state = SchedulerState::with_tick(90);

        assert!(state.take_due(&jobs, at(16, 0, 59, 50)).is_empty());
        assert_eq!(
            state.take_due(&jobs, at(16, 1, 1, 20)),
            vec![JobKind::JapaneseQuiz]
        );
        assert!(state.take_due(&jobs, at(16, 1, 2, 50)).is_empty());
        assert_eq!(
            state.get_due(JobKind::JapaneseQuiz, "0 1 * * 5"),
            Some(at(23, 1, 0, 0).timestamp())
        );
    }

    #[test]
    fn short_ticks_keep_the_one_minute_window() {
        let jobs = compile_schedule(&[ScheduleEntry::new(JobKind::JapaneseQuiz, "0 1 * * 5")]);
        let mut state = SchedulerState::with_tick(30);
        state.take_due(&jobs, at(16, 0, 59, 50));

        assert!(state.take_due(&jobs, at(16, 1, 1, 20)).is_empty());
    }

    #[test]
    fn disabled_and_invalid_rows_are_dropped() {
        let mut disabled = ScheduleEntry::new(JobKind::EnglishQuiz, "0 4 * * 5");
        disabled.enabled = false;
        let jobs = compile_schedule(&[
            disabled,
            ScheduleEntry::new(JobKind::EnglishWord, "not cron"),
            ScheduleEntry::new(JobKind::EnglishGrammar, "0 6 * * 5"),
        ]);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job, JobKind::EnglishGrammar);
    }
}
