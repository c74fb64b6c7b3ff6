//! Title search across every channel

use super::parser::{EpgData, Program};
use super::{format_datetime, format_time, parse_xmltv_utc};

/// A program projected for a result list (search hits and genre filter)
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramMatch {
    pub channel_id: String,
    /// Display name, or the raw channel id if the feed never named it
    pub channel_name: String,
    pub title: String,
    /// Local "YYYY-MM-DD HH:MM", or the raw feed value if unparseable
    pub start: String,
    /// Local "HH:MM", or the raw feed value if unparseable
    pub stop: String,
    pub description: Option<String>,
    pub categories: Vec<String>,
    /// Formatted episode number, e.g. "S01E05"
    pub episode: Option<String>,
}

impl ProgramMatch {
    pub fn from_program(data: &EpgData, program: &Program) -> Self {
        let start = parse_xmltv_utc(&program.start)
            .map(format_datetime)
            .unwrap_or_else(|| program.start.clone());
        let stop = parse_xmltv_utc(&program.stop)
            .map(format_time)
            .unwrap_or_else(|| program.stop.clone());

        Self {
            channel_id: program.channel_id.clone(),
            channel_name: data.channel_name(&program.channel_id).to_string(),
            title: program.title.clone(),
            start,
            stop,
            description: program.description.clone(),
            categories: program.categories.clone(),
            episode: program.episode.clone(),
        }
    }
}

/// Result of a title search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Query was empty or whitespace; prompt for input
    NotPerformed,
    /// Matches in feed order (possibly none)
    Results(Vec<ProgramMatch>),
}

impl SearchOutcome {
    pub fn matches(&self) -> &[ProgramMatch] {
        match self {
            SearchOutcome::NotPerformed => &[],
            SearchOutcome::Results(matches) => matches,
        }
    }
}

/// Case-insensitive substring search over program titles
pub fn search(data: &EpgData, query: &str) -> SearchOutcome {
    let query = query.trim();
    if query.is_empty() {
        return SearchOutcome::NotPerformed;
    }
    let needle = query.to_lowercase();

    let matches: Vec<ProgramMatch> = data
        .programs_in_feed_order()
        .into_iter()
        .filter(|p| p.title.to_lowercase().contains(&needle))
        .map(|p| ProgramMatch::from_program(data, p))
        .collect();

    tracing::debug!(query, hits = matches.len(), "title search");
    SearchOutcome::Results(matches)
}
