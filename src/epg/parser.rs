//! XMLTV parser
//! Streaming quick-xml reader that turns a feed into a channel list and
//! per-channel program lists. Handles plain and gzip-compressed documents.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{BufRead, Read};
use flate2::read::GzDecoder;

use super::error::ParseError;

/// Shown wherever a channel or program has no `<desc>`.
pub const NO_DESCRIPTION: &str = "No description available.";

/// A channel from the feed's `<channel>` elements
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Stable key from the feed (`id` attribute)
    pub id: String,
    /// Human-readable name, not guaranteed unique
    pub display_name: String,
    pub description: Option<String>,
    /// Channel logo URL (optional)
    pub icon: Option<String>,
}

impl Channel {
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or(NO_DESCRIPTION)
    }
}

/// A single TV program/show
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Channel ID this program belongs to
    pub channel_id: String,
    pub title: String,
    /// Raw XMLTV start, e.g. "20240115120000 +0000"
    pub start: String,
    /// Raw XMLTV stop
    pub stop: String,
    pub description: Option<String>,
    /// Every `<category>` of the programme, in feed order
    pub categories: Vec<String>,
    /// Episode info (optional) e.g., "S01E05"
    pub episode: Option<String>,
    /// Position among all accepted programmes in the feed
    pub seq: usize,
}

impl Program {
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or(NO_DESCRIPTION)
    }
}

/// One complete parse of a feed.
///
/// Rebuilt wholesale on every refresh; nothing is carried over between two
/// instances.
#[derive(Debug, Clone, Default)]
pub struct EpgData {
    /// Channels sorted by display name (ordinal, stable on ties)
    pub channels: Vec<Channel>,
    /// Programs indexed by channel ID, each list sorted by start
    pub programs: HashMap<String, Vec<Program>>,
    /// `<channel>` elements dropped for a missing id or display name
    pub skipped_channels: usize,
    /// `<programme>` elements dropped for a missing channel, title, start or stop
    pub skipped_programs: usize,
    /// Programmes dropped because their channel id was never declared
    pub orphaned_programs: usize,
    channel_index: HashMap<String, usize>,
}

impl EpgData {
    /// Assemble a guide from records in feed encounter order.
    ///
    /// Later channels with an already-seen id replace the earlier entry but
    /// keep its position. Programs whose channel is unknown are dropped.
    pub fn from_parts(channels: Vec<Channel>, programs: Vec<Program>) -> Self {
        let mut unique: Vec<Channel> = Vec::with_capacity(channels.len());
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(channels.len());
        for channel in channels {
            match seen.get(&channel.id) {
                Some(&idx) => unique[idx] = channel,
                None => {
                    seen.insert(channel.id.clone(), unique.len());
                    unique.push(channel);
                }
            }
        }

        // Stable sort keeps encounter order for equal names
        unique.sort_by(|a, b| a.display_name.cmp(&b.display_name));

        let channel_index: HashMap<String, usize> = unique
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        let mut by_channel: HashMap<String, Vec<Program>> = HashMap::new();
        let mut orphaned = 0;
        for program in programs {
            if channel_index.contains_key(&program.channel_id) {
                by_channel
                    .entry(program.channel_id.clone())
                    .or_default()
                    .push(program);
            } else {
                orphaned += 1;
            }
        }

        // Fixed-width zero-padded timestamps sort correctly as strings
        for list in by_channel.values_mut() {
            list.sort_by(|a, b| a.start.cmp(&b.start));
        }

        Self {
            channels: unique,
            programs: by_channel,
            skipped_channels: 0,
            skipped_programs: 0,
            orphaned_programs: orphaned,
            channel_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel(&self, id: &str) -> Option<&Channel> {
        self.channel_index.get(id).map(|&i| &self.channels[i])
    }

    /// Display name for a channel id, falling back to the id itself
    pub fn channel_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.channel(id).map(|c| c.display_name.as_str()).unwrap_or(id)
    }

    /// Sorted program list for a channel (empty if none)
    pub fn programs_for(&self, channel_id: &str) -> &[Program] {
        self.programs
            .get(channel_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All programs in feed encounter order
    pub fn programs_in_feed_order(&self) -> Vec<&Program> {
        let mut all: Vec<&Program> = self.programs.values().flatten().collect();
        all.sort_by_key(|p| p.seq);
        all
    }

    /// Total number of programs
    pub fn program_count(&self) -> usize {
        self.programs.values().map(|v| v.len()).sum()
    }
}

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq)]
enum ParserState {
    Root,
    Channel,
    Programme,
    Title,
    Desc,
    Category,
    DisplayName,
    EpisodeNum,
}

/// EPG Parser for XMLTV format - streaming, memory efficient
pub struct EpgParser;

impl EpgParser {
    /// Parse EPG from an XMLTV string
    #[cfg(test)]
    pub fn parse(xml: &str) -> Result<EpgData, ParseError> {
        Self::parse_reader(xml.as_bytes())
    }

    /// Parse raw feed bytes as delivered by the fetcher.
    ///
    /// Gzip payloads are detected by their magic number. Stray control
    /// characters and bare ampersands are repaired before parsing.
    pub fn parse_bytes(bytes: &[u8]) -> Result<EpgData, ParseError> {
        let plain: Cow<[u8]> = if bytes.starts_with(&[0x1f, 0x8b]) {
            let mut out = Vec::with_capacity(bytes.len() * 4);
            GzDecoder::new(bytes)
                .read_to_end(&mut out)
                .map_err(ParseError::Decompress)?;
            Cow::Owned(out)
        } else {
            Cow::Borrowed(bytes)
        };

        let clean = sanitize_xml(&plain);
        Self::parse_reader(clean.as_ref())
    }

    /// Parse EPG from a reader
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<EpgData, ParseError> {
        let mut xml_reader = Reader::from_reader(reader);

        let mut buf = Vec::with_capacity(8192);
        let mut state = ParserState::Root;
        let mut depth: usize = 0;
        let mut seen_root = false;
        let mut current_channel: Option<Channel> = None;
        let mut current_program: Option<Program> = None;
        let mut text_buf = String::new();

        let mut channels: Vec<Channel> = Vec::new();
        let mut programs: Vec<Program> = Vec::new();
        let mut skipped_channels = 0;
        let mut skipped_programs = 0;

        loop {
            let event = xml_reader.read_event_into(&mut buf).map_err(|e| ParseError::Malformed {
                position: xml_reader.error_position() as u64,
                message: e.to_string(),
            })?;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    let name = e.name();
                    let name_bytes = name.as_ref();

                    if !seen_root {
                        if name_bytes != b"tv" {
                            return Err(ParseError::UnexpectedRoot(
                                String::from_utf8_lossy(name_bytes).into_owned(),
                            ));
                        }
                        seen_root = true;
                    } else {
                        match name_bytes {
                            b"channel" if depth == 1 => {
                                let channel = Channel {
                                    id: get_attribute(e, b"id").unwrap_or_default(),
                                    display_name: String::new(),
                                    description: None,
                                    icon: None,
                                };
                                if is_empty {
                                    finish_channel(channel, &mut channels, &mut skipped_channels);
                                } else {
                                    state = ParserState::Channel;
                                    current_channel = Some(channel);
                                }
                            }
                            b"programme" if depth == 1 => {
                                let program = Program {
                                    channel_id: get_attribute(e, b"channel").unwrap_or_default(),
                                    title: String::new(),
                                    start: get_attribute(e, b"start").unwrap_or_default(),
                                    stop: get_attribute(e, b"stop").unwrap_or_default(),
                                    description: None,
                                    categories: Vec::new(),
                                    episode: None,
                                    seq: 0,
                                };
                                if is_empty {
                                    finish_program(program, &mut programs, &mut skipped_programs);
                                } else {
                                    state = ParserState::Programme;
                                    current_program = Some(program);
                                }
                            }
                            b"icon" => {
                                if let Some(src) = get_attribute(e, b"src") {
                                    if let (ParserState::Channel, Some(chan)) = (state, current_channel.as_mut()) {
                                        chan.icon.get_or_insert(src);
                                    }
                                }
                            }
                            _ if is_empty => {}
                            b"title" if state == ParserState::Programme => {
                                state = ParserState::Title;
                                text_buf.clear();
                            }
                            b"desc" if matches!(state, ParserState::Programme | ParserState::Channel) => {
                                state = ParserState::Desc;
                                text_buf.clear();
                            }
                            b"category" if state == ParserState::Programme => {
                                state = ParserState::Category;
                                text_buf.clear();
                            }
                            b"display-name" if state == ParserState::Channel => {
                                state = ParserState::DisplayName;
                                text_buf.clear();
                            }
                            b"episode-num" if state == ParserState::Programme => {
                                state = ParserState::EpisodeNum;
                                text_buf.clear();
                            }
                            _ => {}
                        }
                    }

                    if !is_empty {
                        depth += 1;
                    }
                }
                Event::Text(ref e) => {
                    if collects_text(state) {
                        text_buf.push_str(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
                Event::CData(ref e) => {
                    if collects_text(state) {
                        text_buf.push_str(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
                Event::GeneralRef(ref e) => {
                    if collects_text(state) {
                        let name = String::from_utf8_lossy(e.as_ref());
                        match resolve_entity(&name) {
                            Some(c) => text_buf.push(c),
                            None => {
                                text_buf.push('&');
                                text_buf.push_str(&name);
                                text_buf.push(';');
                            }
                        }
                    }
                }
                Event::End(ref e) => {
                    depth = depth.saturating_sub(1);
                    let name = e.name();

                    match name.as_ref() {
                        b"channel" if state == ParserState::Channel => {
                            if let Some(channel) = current_channel.take() {
                                finish_channel(channel, &mut channels, &mut skipped_channels);
                            }
                            state = ParserState::Root;
                        }
                        b"programme" if state == ParserState::Programme => {
                            if let Some(program) = current_program.take() {
                                finish_program(program, &mut programs, &mut skipped_programs);
                            }
                            state = ParserState::Root;
                        }
                        b"title" if state == ParserState::Title => {
                            if let Some(ref mut prog) = current_program {
                                if prog.title.is_empty() {
                                    prog.title = text_buf.trim().to_string();
                                }
                            }
                            state = ParserState::Programme;
                        }
                        b"desc" if state == ParserState::Desc => {
                            let desc = non_empty(&text_buf);
                            if let Some(ref mut prog) = current_program {
                                if prog.description.is_none() {
                                    prog.description = desc;
                                }
                                state = ParserState::Programme;
                            } else {
                                if let Some(ref mut chan) = current_channel {
                                    if chan.description.is_none() {
                                        chan.description = desc;
                                    }
                                }
                                state = ParserState::Channel;
                            }
                        }
                        b"category" if state == ParserState::Category => {
                            if let (Some(prog), Some(cat)) = (current_program.as_mut(), non_empty(&text_buf)) {
                                prog.categories.push(cat);
                            }
                            state = ParserState::Programme;
                        }
                        b"display-name" if state == ParserState::DisplayName => {
                            if let Some(ref mut chan) = current_channel {
                                if chan.display_name.is_empty() {
                                    chan.display_name = text_buf.trim().to_string();
                                }
                            }
                            state = ParserState::Channel;
                        }
                        b"episode-num" if state == ParserState::EpisodeNum => {
                            if let Some(ref mut prog) = current_program {
                                let ep = format_episode(text_buf.trim());
                                if !ep.is_empty() && prog.episode.is_none() {
                                    prog.episode = Some(ep);
                                }
                            }
                            state = ParserState::Programme;
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !seen_root {
            return Err(ParseError::MissingRoot);
        }
        if depth > 0 {
            return Err(ParseError::Malformed {
                position: xml_reader.buffer_position() as u64,
                message: format!("document ended with {} unclosed element(s)", depth),
            });
        }

        let mut epg = EpgData::from_parts(channels, programs);
        epg.skipped_channels = skipped_channels;
        epg.skipped_programs = skipped_programs;

        tracing::debug!(
            channels = epg.channels.len(),
            programs = epg.program_count(),
            skipped_channels,
            skipped_programs,
            orphaned = epg.orphaned_programs,
            "parsed XMLTV document"
        );

        Ok(epg)
    }
}

fn collects_text(state: ParserState) -> bool {
    matches!(
        state,
        ParserState::Title
            | ParserState::Desc
            | ParserState::Category
            | ParserState::DisplayName
            | ParserState::EpisodeNum
    )
}

fn finish_channel(channel: Channel, channels: &mut Vec<Channel>, skipped: &mut usize) {
    if channel.id.is_empty() || channel.display_name.is_empty() {
        *skipped += 1;
        tracing::debug!(id = %channel.id, "skipping channel without id or display-name");
        return;
    }
    channels.push(channel);
}

fn finish_program(mut program: Program, programs: &mut Vec<Program>, skipped: &mut usize) {
    if program.channel_id.is_empty()
        || program.title.is_empty()
        || program.start.is_empty()
        || program.stop.is_empty()
    {
        *skipped += 1;
        tracing::debug!(channel = %program.channel_id, "skipping incomplete programme");
        return;
    }
    program.seq = programs.len();
    programs.push(program);
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Replace illegal XML 1.0 control characters and escape bare `&`.
/// Legal XML 1.0: #x9 | #xA | #xD | [#x20-#xD7FF] | ...
fn sanitize_xml(bytes: &[u8]) -> Cow<'_, [u8]> {
    let needs_work = bytes.iter().enumerate().any(|(i, &b)| {
        matches!(b, 0x00..=0x08 | 0x0B | 0x0C | 0x0E..=0x1F | 0x7F)
            || (b == b'&' && !is_valid_entity_start(&bytes[i..]))
    });
    if !needs_work {
        return Cow::Borrowed(bytes);
    }

    let mut out = Vec::with_capacity(bytes.len() + 64);
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            0x09 | 0x0A | 0x0D => out.push(b),
            0x00..=0x1F | 0x7F => out.push(b' '),
            b'&' if !is_valid_entity_start(&bytes[i..]) => out.extend_from_slice(b"&amp;"),
            _ => out.push(b),
        }
    }
    Cow::Owned(out)
}

/// Check if bytes starting with & look like a valid XML entity
fn is_valid_entity_start(bytes: &[u8]) -> bool {
    if bytes.len() < 2 {
        return false;
    }
    if bytes[1] == b'#' {
        return true;
    }

    let mut end = 1;
    while end < bytes.len() && end < 10 {
        match bytes[end] {
            b';' => return end > 1,
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => end += 1,
            _ => return false,
        }
    }
    false
}

/// Resolve an entity reference name (without `&` and `;`)
fn resolve_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => None,
    }
}

/// Get attribute value from XML element
fn get_attribute(e: &BytesStart, name: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name {
            let raw = String::from_utf8_lossy(attr.value.as_ref());
            let value = quick_xml::escape::unescape(&raw)
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| raw.trim().to_string());
            return Some(value);
        }
    }
    None
}

/// Format episode number (e.g., "0.4." -> "S01E05")
fn format_episode(episode: &str) -> String {
    // xmltv_ns: "season[/total].episode[/total].part" (0-indexed)
    let parts: Vec<&str> = episode.split('.').collect();

    if parts.len() >= 2 {
        let index = |s: &str| -> Option<i32> { s.split('/').next()?.trim().parse().ok() };
        if let (Some(season), Some(ep)) = (index(parts[0]), index(parts[1])) {
            if season >= 0 && ep >= 0 {
                return format!("S{:02}E{:02}", season + 1, ep + 1);
            }
        }
    }

    episode.to_string()
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
