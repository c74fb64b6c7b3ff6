//! EPG (Electronic Program Guide) module
//!
//! Feed fetching, the XMLTV parser and the read-side queries over a parsed
//! guide (schedule windows, title search, genre filter).

mod error;
mod fetcher;
mod genre;
mod parser;
mod schedule;
mod search;

// Re-export public types
pub use error::RefreshError;
#[cfg(test)]
pub use error::{FetchError, ParseError};
pub use fetcher::{FeedSource, FetchConfig, HttpFeed};
pub use genre::{available_genres, filter_by_genre, GenreOutcome};
pub use parser::{Channel, EpgData, EpgParser, Program, NO_DESCRIPTION};
pub use schedule::select_window;
pub use search::{search, ProgramMatch, SearchOutcome};

use chrono::{DateTime, Local, NaiveDateTime, Utc};

const XMLTV_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Parse the first 14 characters of an XMLTV timestamp as UTC.
///
/// Any offset suffix ("+1100") is ignored; feeds that publish local wall
/// time with an offset will compare shifted by that offset.
pub fn parse_xmltv_utc(raw: &str) -> Option<DateTime<Utc>> {
    let head = raw.trim().get(..14)?;
    NaiveDateTime::parse_from_str(head, XMLTV_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format an instant as local time HH:MM
pub fn format_time(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%H:%M").to_string()
}

/// Format an instant as local datetime YYYY-MM-DD HH:MM
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
