//! Daily maintenance blackout window.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, NaiveTime, Utc};

/// A daily `[start, end)` window in a fixed UTC offset. When `start > end`
/// the window wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceWindow {
    start: NaiveTime,
    end: NaiveTime,
    offset: FixedOffset,
}

impl MaintenanceWindow {
    pub fn new(start: NaiveTime, end: NaiveTime, offset: FixedOffset) -> Self {
        Self { start, end, offset }
    }

    /// Parse `HH:MM-HH:MM` with the offset given in whole hours east of UTC.
    pub fn parse(window: &str, utc_offset_hours: i32) -> Result<Self> {
        let (start, end) = window
            .split_once('-')
            .ok_or_else(|| anyhow!("maintenance window must look like HH:MM-HH:MM, got {window:?}"))?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M")
            .with_context(|| format!("invalid window start {start:?}"))?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M")
            .with_context(|| format!("invalid window end {end:?}"))?;
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600)
            .ok_or_else(|| anyhow!("UTC offset out of range: {utc_offset_hours}"))?;

        Ok(Self::new(start, end, offset))
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let local = at.with_timezone(&self.offset).time();
        if self.start <= self.end {
            self.start <= local && local < self.end
        } else {
            local >= self.start || local < self.end
        }
    }
}
