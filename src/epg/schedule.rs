//! Schedule window: which programs a channel row shows right now

use chrono::{DateTime, Utc};

use super::parser::Program;
use super::{format_time, parse_xmltv_utc};

/// Programs shown per channel: the anchor plus the five after it
pub const WINDOW_SIZE: usize = 6;

/// A program picked for display, with its airing state at the reference instant
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry<'a> {
    pub program: &'a Program,
    pub start: Option<DateTime<Utc>>,
    pub stop: Option<DateTime<Utc>>,
    /// `start <= now < stop`
    pub airing: bool,
}

impl ScheduleEntry<'_> {
    /// Local "HH:MM-HH:MM", empty when either end failed to parse
    pub fn time_range(&self) -> String {
        match (self.start, self.stop) {
            (Some(start), Some(stop)) => format!("{}-{}", format_time(start), format_time(stop)),
            _ => String::new(),
        }
    }

    /// Minutes until the program ends, for airing programs only
    pub fn minutes_left(&self, now: DateTime<Utc>) -> Option<i64> {
        if !self.airing {
            return None;
        }
        self.stop.map(|stop| (stop - now).num_minutes())
    }
}

fn interval(program: &Program) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    Some((parse_xmltv_utc(&program.start)?, parse_xmltv_utc(&program.stop)?))
}

/// Pick up to [`WINDOW_SIZE`] programs from a start-sorted list.
///
/// The window is anchored on the first program that is airing at `now`
/// (half-open `[start, stop)`) or, failing that, starts after `now`.
/// Programs whose timestamps do not parse are never chosen as the anchor but
/// still appear inside a window. With no anchor the first programs of the
/// list are shown.
pub fn select_window(programs: &[Program], now: DateTime<Utc>) -> Vec<ScheduleEntry<'_>> {
    let anchor = programs.iter().position(|p| match interval(p) {
        Some((start, stop)) => (start <= now && now < stop) || now < start,
        None => false,
    });

    let from = anchor.unwrap_or(0);
    programs[from..]
        .iter()
        .take(WINDOW_SIZE)
        .map(|program| {
            let start = parse_xmltv_utc(&program.start);
            let stop = parse_xmltv_utc(&program.stop);
            let airing = matches!((start, stop), (Some(s), Some(e)) if s <= now && now < e);
            ScheduleEntry {
                program,
                start,
                stop,
                airing,
            }
        })
        .collect()
}
