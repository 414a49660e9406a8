//! One monitored machine and its table view state.

use std::time::{Duration, Instant};

use procfleet_hosts::{ProcessRecord, ProcessSource};

/// A machine tab: its process source, the last snapshot fetched from it,
/// and the cursor/scroll position of its table.
///
/// Each target's state is independent; a failed or slow fetch on one never
/// disturbs another. The snapshot is only ever replaced wholesale by
/// [`apply_snapshot`](Target::apply_snapshot).
#[derive(Debug)]
pub struct Target {
    label: String,
    source: ProcessSource,
    snapshot: Vec<ProcessRecord>,
    cursor: usize,
    scroll: usize,
    in_flight: bool,
    status: Option<String>,
    last_fetch: Option<Instant>,
}

impl Target {
    pub fn new(label: impl Into<String>, source: ProcessSource) -> Self {
        Self {
            label: label.into(),
            source,
            snapshot: Vec::new(),
            cursor: 0,
            scroll: 0,
            in_flight: false,
            status: None,
            last_fetch: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> &ProcessSource {
        &self.source
    }

    pub fn snapshot(&self) -> &[ProcessRecord] {
        &self.snapshot
    }

    pub fn cursor_index(&self) -> usize {
        self.cursor
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    /// The record under the cursor, if the snapshot is non-empty.
    pub fn selected(&self) -> Option<&ProcessRecord> {
        self.snapshot.get(self.cursor)
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Mark a fetch as started. Returns false when one is already
    /// outstanding, in which case the caller must not spawn another.
    pub fn begin_fetch(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Whether enough time has passed since the last fetch attempt to start
    /// another. A target that has never been fetched is always due.
    pub fn should_auto_refresh(&self, interval: Duration) -> bool {
        match self.last_fetch {
            Some(at) => at.elapsed() >= interval,
            None => true,
        }
    }

    pub fn refreshed_ago(&self) -> Option<Duration> {
        self.last_fetch.map(|at| at.elapsed())
    }

    /// Install a freshly fetched snapshot.
    ///
    /// The cursor follows the previously selected pid into the new snapshot
    /// when that pid still exists; otherwise it stays at its old index,
    /// clamped into range. The scroll position resets to the top either way,
    /// since row positions may have shifted arbitrarily.
    pub fn apply_snapshot(&mut self, records: Vec<ProcessRecord>) {
        let old_pid = self.selected().map(|r| r.pid);
        self.snapshot = records;
        self.in_flight = false;
        self.status = None;
        self.last_fetch = Some(Instant::now());

        self.cursor = match old_pid.and_then(|pid| self.snapshot.iter().position(|r| r.pid == pid))
        {
            Some(idx) => idx,
            None if self.snapshot.is_empty() => 0,
            None => self.cursor.min(self.snapshot.len() - 1),
        };
        self.scroll = 0;
    }

    /// Record a failed fetch. The previous snapshot, cursor, and scroll are
    /// left exactly as they were; only the status line changes.
    pub fn fetch_failed(&mut self, message: impl Into<String>) {
        self.in_flight = false;
        self.status = Some(message.into());
        // Counts as an attempt, so an unreachable host is not hammered
        // every tick.
        self.last_fetch = Some(Instant::now());
    }

    pub fn move_up(&mut self, visible_rows: usize) {
        self.cursor = self.cursor.saturating_sub(1);
        self.ensure_cursor_visible(visible_rows);
    }

    pub fn move_down(&mut self, visible_rows: usize) {
        if self.cursor + 1 < self.snapshot.len() {
            self.cursor += 1;
        }
        self.ensure_cursor_visible(visible_rows);
    }

    pub fn page_up(&mut self, visible_rows: usize) {
        self.cursor = self.cursor.saturating_sub(visible_rows.max(1));
        self.ensure_cursor_visible(visible_rows);
    }

    pub fn page_down(&mut self, visible_rows: usize) {
        if !self.snapshot.is_empty() {
            self.cursor = (self.cursor + visible_rows.max(1)).min(self.snapshot.len() - 1);
        }
        self.ensure_cursor_visible(visible_rows);
    }

    /// Drop the scroll back to the top, keeping the cursor. Used when a tab
    /// becomes active so its viewport starts from a known position.
    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    /// Move the cursor to the first row whose command contains `query`.
    ///
    /// The match is case-sensitive and the search always starts from the top
    /// of the snapshot. Returns false without touching anything when the
    /// query is empty or nothing matches.
    pub fn search(&mut self, query: &str, visible_rows: usize) -> bool {
        if query.is_empty() {
            return false;
        }
        match self.snapshot.iter().position(|r| r.command.contains(query)) {
            Some(idx) => {
                self.cursor = idx;
                self.ensure_cursor_visible(visible_rows);
                true
            }
            None => false,
        }
    }

    /// Adjust scroll so the cursor lies inside the viewport:
    /// `scroll <= cursor < scroll + visible_rows`.
    pub fn ensure_cursor_visible(&mut self, visible_rows: usize) {
        let visible_rows = visible_rows.max(1);
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + visible_rows {
            self.scroll = self.cursor + 1 - visible_rows;
        }
    }

    /// The slice of records currently inside the viewport.
    pub fn visible_window(&self, visible_rows: usize) -> &[ProcessRecord] {
        let end = (self.scroll + visible_rows).min(self.snapshot.len());
        let start = self.scroll.min(end);
        &self.snapshot[start..end]
    }
}
