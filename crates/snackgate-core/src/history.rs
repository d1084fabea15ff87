//! Bounded history for display and diagnostics.
//!
//! Two independent newest-first rings: recorded visits and diagnostic log
//! lines. Inserting past capacity evicts the oldest entry. Clearing is a
//! display concern only and never touches [`crate::AppState`].

use std::collections::VecDeque;

/// Visits kept for display.
pub const DEFAULT_VISIT_CAPACITY: usize = 20;

/// Diagnostic lines kept for display.
pub const DEFAULT_LOG_CAPACITY: usize = 40;

/// One counted visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRecord {
    /// Monotonic id, unique within the process.
    pub id: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    /// Visit count right after this visit.
    pub count_at_visit: u32,
}

/// One diagnostic line: a raw inbound message or a local action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    /// Text as logged.
    pub text: String,
}

/// Visit and diagnostic history.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    visits: VecDeque<VisitRecord>,
    entries: VecDeque<LogEntry>,
    visit_capacity: usize,
    log_capacity: usize,
    next_visit_id: u64,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_VISIT_CAPACITY, DEFAULT_LOG_CAPACITY)
    }
}

impl HistoryLog {
    /// Create empty history with the given capacities.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(visit_capacity: usize, log_capacity: usize) -> Self {
        let visit_capacity = visit_capacity.max(1);
        let log_capacity = log_capacity.max(1);
        Self {
            visits: VecDeque::with_capacity(visit_capacity),
            entries: VecDeque::with_capacity(log_capacity),
            visit_capacity,
            log_capacity,
            next_visit_id: 1,
        }
    }

    /// Record a visit and return it.
    pub fn record_visit(&mut self, timestamp: u64, count_at_visit: u32) -> &VisitRecord {
        let id = self.next_visit_id;
        self.next_visit_id += 1;

        self.visits.push_front(VisitRecord { id, timestamp, count_at_visit });
        self.visits.truncate(self.visit_capacity);
        &self.visits[0]
    }

    /// Append a diagnostic line.
    pub fn record(&mut self, timestamp: u64, text: impl Into<String>) {
        self.entries.push_front(LogEntry { timestamp, text: text.into() });
        self.entries.truncate(self.log_capacity);
    }

    /// Visits, newest first.
    pub fn visits(&self) -> impl ExactSizeIterator<Item = &VisitRecord> {
        self.visits.iter()
    }

    /// Diagnostic lines, newest first.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Text of the `n` newest log lines, newest first.
    pub fn recent_lines(&self, n: usize) -> Vec<String> {
        self.entries.iter().take(n).map(|e| e.text.clone()).collect()
    }

    /// Drop all visits and log lines. Visit ids keep increasing.
    pub fn clear(&mut self) {
        self.visits.clear();
        self.entries.clear();
    }
}
