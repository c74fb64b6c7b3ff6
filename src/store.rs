//! Shared guide state handed to every view

use chrono::{DateTime, Local};

use crate::bookmarks::BookmarkSet;
use crate::epg::{Channel, EpgData};

/// Outcome of the most recent refresh cycles
#[derive(Debug, Clone, Default)]
pub struct RefreshStatus {
    pub last_success: Option<DateTime<Local>>,
    /// Message of the last failure, cleared by the next success
    pub last_error: Option<String>,
    pub successful_cycles: u64,
    pub failed_cycles: u64,
}

/// Single-writer store: the refresh coordinator replaces the snapshot, views
/// read it and mutate only the bookmarks.
#[derive(Debug, Default)]
pub struct GuideStore {
    snapshot: EpgData,
    pub bookmarks: BookmarkSet,
    status: RefreshStatus,
}

impl GuideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &EpgData {
        &self.snapshot
    }

    pub fn status(&self) -> &RefreshStatus {
        &self.status
    }

    /// Replace the whole guide with the output of one fetch cycle
    pub fn replace(&mut self, data: EpgData) {
        self.snapshot = data;
        self.status.last_success = Some(Local::now());
        self.status.last_error = None;
        self.status.successful_cycles += 1;
    }

    /// Record a failed cycle; the previous guide stays on screen
    pub fn record_failure(&mut self, message: String) {
        self.status.last_error = Some(message);
        self.status.failed_cycles += 1;
    }

    /// True once a cycle has failed without any guide to fall back on
    pub fn is_unavailable(&self) -> bool {
        self.snapshot.is_empty() && self.status.last_error.is_some()
    }

    /// Channels in display order (bookmarks first)
    pub fn display_channels(&self) -> Vec<&Channel> {
        self.bookmarks.order_channels(&self.snapshot.channels)
    }
}
