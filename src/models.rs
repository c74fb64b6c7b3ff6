//! UI-side models for the guide window

use crate::epg::{format_datetime, parse_xmltv_utc, Channel, EpgData, Program, ProgramMatch};

/// UI Tab selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Guide,
    Search,
    Genres,
    Bookmarks,
    Console,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Guide, Tab::Search, Tab::Genres, Tab::Bookmarks, Tab::Console];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Guide => "📺 Guide",
            Tab::Search => "🔍 Search",
            Tab::Genres => "🎭 Genres",
            Tab::Bookmarks => "★ Bookmarks",
            Tab::Console => "🖥 Console",
        }
    }
}

/// Content of the description popup, copied out of the snapshot so it
/// survives a refresh while open
#[derive(Debug, Clone, PartialEq)]
pub struct DetailsPopup {
    pub heading: String,
    /// Channel and air time for programs
    pub subheading: Option<String>,
    pub categories: Vec<String>,
    pub episode: Option<String>,
    /// Channel logo URL
    pub icon: Option<String>,
    pub body: String,
}

impl DetailsPopup {
    pub fn for_channel(channel: &Channel) -> Self {
        Self {
            heading: channel.display_name.clone(),
            subheading: Some(channel.id.clone()),
            categories: Vec::new(),
            episode: None,
            icon: channel.icon.clone(),
            body: channel.description_text().to_string(),
        }
    }

    pub fn for_program(data: &EpgData, program: &Program) -> Self {
        let when = parse_xmltv_utc(&program.start)
            .map(format_datetime)
            .unwrap_or_else(|| program.start.clone());
        Self {
            heading: program.title.clone(),
            subheading: Some(format!("{} · {}", data.channel_name(&program.channel_id), when)),
            categories: program.categories.clone(),
            episode: program.episode.clone(),
            icon: None,
            body: program.description_text().to_string(),
        }
    }

    pub fn for_match(found: &ProgramMatch) -> Self {
        Self {
            heading: found.title.clone(),
            subheading: Some(format!("{} · {}", found.channel_name, found.start)),
            categories: found.categories.clone(),
            episode: found.episode.clone(),
            icon: None,
            body: found
                .description
                .clone()
                .unwrap_or_else(|| crate::epg::NO_DESCRIPTION.to_string()),
        }
    }
}
