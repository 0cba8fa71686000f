use std::collections::VecDeque;

use crate::clock::format_timestamp;

pub const JOURNAL_CAPACITY: usize = 16;

/// Heartbeat line body; consecutive heartbeats coalesce into one line.
pub const HEARTBEAT_LINE: &str = "Worker active";

/// Bounded recent-log ring consumed by the configuration interface. Oldest
/// lines are evicted first; capacity is fixed at [`JOURNAL_CAPACITY`].
#[derive(Debug, Default)]
pub struct Journal {
    lines: VecDeque<String>,
}

impl Journal {
    pub fn record(&mut self, now: i64, message: impl AsRef<str>) {
        if self.lines.len() == JOURNAL_CAPACITY {
            self.lines.pop_front();
        }
        self.lines
            .push_back(format!("{} | {}", format_timestamp(now), message.as_ref()));
    }

    /// Record a heartbeat line. If the most recent line is already a
    /// heartbeat it is replaced rather than appended, so an idle scheduler
    /// occupies one journal line instead of flooding the ring.
    pub fn heartbeat(&mut self, now: i64) {
        if self
            .lines
            .back()
            .is_some_and(|line| line.ends_with(HEARTBEAT_LINE))
        {
            self.lines.pop_back();
        }
        self.record(now, HEARTBEAT_LINE);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
