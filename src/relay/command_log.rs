//! Bounded, append-ordered log of controller commands and bot confirmations.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, VecDeque};

use crate::domain::{CommandRecord, CommandType};

#[derive(Debug, Clone)]
pub struct CommandLog {
    records: VecDeque<CommandRecord>,
    capacity: usize,
    /// Latest cursor handed to a bot; later records must sort after it
    served: Option<DateTime<Utc>>,
}

/// Truncate to millisecond precision so records compare exactly against
/// epoch-millisecond sync cursors.
fn to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

impl CommandLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity + 1),
            capacity,
            served: None,
        }
    }

    /// Append a record, stamping it with `now` if it carries no timestamp, then
    /// drop the oldest entries beyond capacity.
    ///
    /// Timestamps never decrease along the log, and always exceed the last
    /// cursor given out by [`CommandLog::mark_served`].
    pub fn append(&mut self, mut record: CommandRecord, now: DateTime<Utc>) -> CommandRecord {
        let mut ts = to_millis(record.timestamp.unwrap_or(now));
        if let Some(last) = self.last_timestamp() {
            if last > ts {
                ts = last;
            }
        }
        if let Some(served) = self.served {
            if ts <= served {
                ts = served + chrono::Duration::milliseconds(1);
            }
        }
        record.timestamp = Some(ts);

        self.records.push_back(record.clone());
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }
        record
    }

    /// Records strictly newer than `cursor`, in append order; the whole log when
    /// no cursor is given.
    pub fn since(&self, cursor: Option<DateTime<Utc>>) -> Vec<CommandRecord> {
        match cursor {
            Some(cursor) => self
                .records
                .iter()
                .filter(|r| r.timestamp.is_some_and(|ts| ts > cursor))
                .cloned()
                .collect(),
            None => self.records.iter().cloned().collect(),
        }
    }

    /// Remove every record at or before `cutoff`. Returns the number removed.
    pub fn sweep(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records
            .retain(|r| r.timestamp.is_some_and(|ts| ts > cutoff));
        before - self.records.len()
    }

    /// The most recent `n` records, oldest first
    pub fn tail(&self, n: usize) -> Vec<CommandRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).cloned().collect()
    }

    pub fn counts_by_type(&self) -> BTreeMap<CommandType, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.command_type()).or_insert(0) += 1;
        }
        counts
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.records.back().and_then(|r| r.timestamp)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Issue a sync cursor at `at`: never below the newest record or an earlier
    /// cursor, so chained cursors neither skip nor repeat records.
    pub fn mark_served(&mut self, at: DateTime<Utc>) -> DateTime<Utc> {
        let mut at = to_millis(at);
        if let Some(last) = self.last_timestamp() {
            at = at.max(last);
        }
        if let Some(served) = self.served {
            at = at.max(served);
        }
        self.served = Some(at);
        at
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
