use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, TimeZone};
use thiserror::Error;

use crate::todo::TaskItem;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateFilterError {
    #[error("invalid date format: {0}")]
    InvalidFormat(String),
    #[error("no local midnight exists on {0}")]
    NoLocalMidnight(NaiveDate),
}

/// Completion-date window derived from a `--date` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilterSpec {
    /// `today`, `this week`, `this month`: everything from `start` on.
    Since { start: DateTime<Local> },
    /// A `YYYY-MM-DD` day: `[start, end)`.
    Day {
        start: DateTime<Local>,
        end: DateTime<Local>,
    },
}

impl DateFilterSpec {
    pub fn resolve(token: &str) -> Result<Self, DateFilterError> {
        Self::resolve_at(token, Local::now())
    }

    pub fn resolve_at(token: &str, now: DateTime<Local>) -> Result<Self, DateFilterError> {
        let today = now.date_naive();
        match token {
            "today" => Ok(DateFilterSpec::Since {
                start: local_midnight(today)?,
            }),
            "this week" => {
                let back = i64::from(today.weekday().num_days_from_sunday());
                Ok(DateFilterSpec::Since {
                    start: local_midnight(today - Duration::days(back))?,
                })
            }
            "this month" => {
                let first = today.with_day(1).unwrap_or(today);
                Ok(DateFilterSpec::Since {
                    start: local_midnight(first)?,
                })
            }
            _ => {
                let day = NaiveDate::parse_from_str(token, "%Y-%m-%d")
                    .map_err(|_| DateFilterError::InvalidFormat(token.to_string()))?;
                let next = day
                    .succ_opt()
                    .ok_or_else(|| DateFilterError::InvalidFormat(token.to_string()))?;
                Ok(DateFilterSpec::Day {
                    start: local_midnight(day)?,
                    end: local_midnight(next)?,
                })
            }
        }
    }

    pub fn lower_bound(&self) -> DateTime<Local> {
        match self {
            DateFilterSpec::Since { start } | DateFilterSpec::Day { start, .. } => *start,
        }
    }

    pub fn upper_bound(&self) -> Option<DateTime<Local>> {
        match self {
            DateFilterSpec::Since { .. } => None,
            DateFilterSpec::Day { end, .. } => Some(*end),
        }
    }

    /// Drop to-dos completed outside the window. Only `Day` windows filter;
    /// the bridge already applied the lower bound.
    pub fn retain(&self, todos: Vec<TaskItem>) -> Vec<TaskItem> {
        let DateFilterSpec::Day { start, end } = self else {
            return todos;
        };
        todos
            .into_iter()
            .filter(|todo| {
                todo.completion_date
                    .map(|done| done.with_timezone(&Local))
                    .is_some_and(|done| done >= *start && done < *end)
            })
            .collect()
    }
}

fn local_midnight(day: NaiveDate) -> Result<DateTime<Local>, DateFilterError> {
    let naive = day
        .and_hms_opt(0, 0, 0)
        .ok_or(DateFilterError::NoLocalMidnight(day))?;
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(at) => Ok(at),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        // Midnight skipped by a DST jump: use the first instant of the day.
        LocalResult::None => (1..=3)
            .filter_map(|hour| day.and_hms_opt(hour, 0, 0))
            .find_map(|later| Local.from_local_datetime(&later).earliest())
            .ok_or(DateFilterError::NoLocalMidnight(day)),
    }
}
