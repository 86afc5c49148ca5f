//! Scheduling gates. All wall-clock decisions happen in one fixed timezone
//! (a configured UTC offset, default +05:30) so that plants, the portal crons
//! and the restricted window agree on what "19:00" means regardless of where
//! the service runs.

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};

/// Applied when an organization's configured interval is missing or invalid.
pub const DEFAULT_INTERVAL_MINUTES: i32 = 15;

/// A daily do-not-sync window in local wall-clock minutes. May wrap past
/// midnight (19:00-06:00). Start is inclusive, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestrictedWindow {
    start_minute: u32,
    end_minute: u32,
}

impl RestrictedWindow {
    /// Parse an `"HH:MM-HH:MM"` specification. Empty input means no window.
    #[must_use]
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return None;
        }
        let (start, end) = spec.split_once('-')?;
        Some(Self {
            start_minute: parse_hhmm(start)?,
            end_minute: parse_hhmm(end)?,
        })
    }

    #[must_use]
    pub fn contains(&self, minute_of_day: u32) -> bool {
        if self.start_minute == self.end_minute {
            // Zero-length window restricts nothing.
            return false;
        }
        if self.start_minute < self.end_minute {
            minute_of_day >= self.start_minute && minute_of_day < self.end_minute
        } else {
            minute_of_day >= self.start_minute || minute_of_day < self.end_minute
        }
    }
}

fn parse_hhmm(s: &str) -> Option<u32> {
    let (h, m) = s.trim().split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    Some(h * 60 + m)
}

/// Minutes since local midnight in the fixed sync timezone.
#[must_use]
pub fn local_minute_of_day(now: DateTime<Utc>, utc_offset_minutes: i32) -> u32 {
    let offset =
        FixedOffset::east_opt(utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix());
    let local = now.with_timezone(&offset);
    local.hour() * 60 + local.minute()
}

#[must_use]
pub fn in_restricted_window(
    now: DateTime<Utc>,
    utc_offset_minutes: i32,
    window: Option<&RestrictedWindow>,
) -> bool {
    match window {
        Some(w) => w.contains(local_minute_of_day(now, utc_offset_minutes)),
        None => false,
    }
}

/// True when the local wall clock lands on the organization's interval
/// boundary: minutes-since-midnight divisible by the interval. For the
/// 15 minute default that is exactly :00, :15, :30 and :45 of each hour.
#[must_use]
pub fn org_interval_due(now: DateTime<Utc>, utc_offset_minutes: i32, interval_minutes: i32) -> bool {
    let interval = if interval_minutes <= 0 {
        DEFAULT_INTERVAL_MINUTES
    } else {
        interval_minutes
    } as u32;
    local_minute_of_day(now, utc_offset_minutes) % interval == 0
}
