use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::errors::AppError;

/// Half-open interval `[start, end)`. Construction enforces `start < end`,
/// so a value of this type is always well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, AppError> {
        if end <= start {
            return Err(AppError::InvalidInterval(format!(
                "end {end} is not after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Daily opening hours, `open < close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessWindow {
    open: NaiveTime,
    close: NaiveTime,
}

impl BusinessWindow {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Result<Self, AppError> {
        if close <= open {
            return Err(AppError::InvalidInterval(format!(
                "business window closes ({close}) before it opens ({open})"
            )));
        }
        Ok(Self { open, close })
    }

    /// Parses "HH:MM" opening and closing times.
    pub fn parse(open: &str, close: &str) -> Result<Self, AppError> {
        let parse_time = |s: &str| {
            NaiveTime::parse_from_str(s, "%H:%M")
                .map_err(|_| AppError::Config(format!("invalid business hours time: {s}")))
        };
        Self::new(parse_time(open)?, parse_time(close)?)
    }

    pub fn open(&self) -> NaiveTime {
        self.open
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }
}

/// A bookable slot derived from the business window and existing events.
/// Produced on demand, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailableSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub available: bool,
}

impl AvailableSlot {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            available: true,
        }
    }
}
