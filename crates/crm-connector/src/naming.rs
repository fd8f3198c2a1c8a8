//! Timestamped lead names

use chrono::{DateTime, Local, TimeZone};
use parking_lot::Mutex;
use std::fmt::Display;

/// Base used when a lead has no name of its own
pub const DEFAULT_LEAD_NAME: &str = "Lead";

/// Produces `"<base> - <YYYYmmddHHMMSS>"` lead names.
///
/// Names handed out within the same second get a `-2`, `-3`, ... suffix so two leads for the
/// same person never share a name. When the clock goes backwards (DST fall-back, clock
/// adjustments) the highest stamp issued so far is reused with a growing suffix, so the
/// sequence of issued names never repeats.
#[derive(Debug, Default)]
pub struct LeadNamer {
    /// Highest stamp issued and the last suffix used with it
    highest: Mutex<Option<(String, u32)>>,
}

impl LeadNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name for a lead created now
    pub fn next_name(&self, base: &str) -> String {
        self.name_at(base, Local::now())
    }

    /// Name for a lead created at `now`
    pub fn name_at<Tz>(&self, base: &str, now: DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let now = now.format("%Y%m%d%H%M%S").to_string();

        // fixed-width digits, so string order is time order
        let mut highest = self.highest.lock();
        let (stamp, counter) = match highest.take() {
            Some((prev, n)) if now <= prev => (prev, n + 1),
            _ => (now, 1),
        };
        *highest = Some((stamp.clone(), counter));
        drop(highest);

        if counter == 1 {
            format!("{} - {}", base, stamp)
        } else {
            format!("{} - {}-{}", base, stamp, counter)
        }
    }
}
