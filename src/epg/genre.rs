//! Genre filter over programme `<category>` values

use std::collections::BTreeSet;

use super::parser::EpgData;
use super::search::ProgramMatch;

/// Result of applying a genre selection
#[derive(Debug, Clone, PartialEq)]
pub enum GenreOutcome {
    /// Nothing selected
    NoFilter,
    /// Programs in feed order having at least one selected genre
    Results(Vec<ProgramMatch>),
}

/// Distinct genres in the guide, sorted case-insensitively.
/// Spellings differing only by case collapse to the first one seen.
pub fn available_genres(data: &EpgData) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut genres: Vec<String> = Vec::new();

    for program in data.programs_in_feed_order() {
        for category in &program.categories {
            if seen.insert(category.to_lowercase()) {
                genres.push(category.clone());
            }
        }
    }

    genres.sort_by_key(|g| g.to_lowercase());
    genres
}

/// Programs tagged with any of the selected genres (case-insensitive)
pub fn filter_by_genre(data: &EpgData, selected: &BTreeSet<String>) -> GenreOutcome {
    if selected.is_empty() {
        return GenreOutcome::NoFilter;
    }
    let wanted: BTreeSet<String> = selected.iter().map(|g| g.to_lowercase()).collect();

    let matches = data
        .programs_in_feed_order()
        .into_iter()
        .filter(|p| p.categories.iter().any(|c| wanted.contains(&c.to_lowercase())))
        .map(|p| ProgramMatch::from_program(data, p))
        .collect();

    GenreOutcome::Results(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epg::EpgParser;

    const FEED: &str = r#"<tv>
  <channel id="a"><display-name>A</display-name></channel>
  <channel id="b"><display-name>B</display-name></channel>
  <programme start="20240115180000" stop="20240115190000" channel="a"><title>Footy Live</title><category>Sport</category></programme>
  <programme start="20240115190000" stop="20240115200000" channel="b"><title>Evening News</title><category>News</category><category>Current Affairs</category></programme>
  <programme start="20240115200000" stop="20240115210000" channel="a"><title>Cricket</title><category>sport</category></programme>
  <programme start="20240115210000" stop="20240115220000" channel="b"><title>Untagged</title></programme>
</tv>"#;

    fn select(genres: &[&str]) -> BTreeSet<String> {
        genres.iter().map(|g| g.to_string()).collect()
    }

    #[test]
    fn test_available_genres_are_distinct_and_sorted() {
        let epg = EpgParser::parse(FEED).unwrap();
        assert_eq!(available_genres(&epg), vec!["Current Affairs", "News", "Sport"]);
    }

    #[test]
    fn test_filter_matches_any_selected_genre_case_insensitively() {
        let epg = EpgParser::parse(FEED).unwrap();
        match filter_by_genre(&epg, &select(&["SPORT", "news"])) {
            GenreOutcome::Results(hits) => {
                let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
                assert_eq!(titles, vec!["Footy Live", "Evening News", "Cricket"]);
            }
            GenreOutcome::NoFilter => panic!("expected results"),
        }
    }

    #[test]
    fn test_empty_selection_is_no_filter() {
        let epg = EpgParser::parse(FEED).unwrap();
        assert_eq!(filter_by_genre(&epg, &BTreeSet::new()), GenreOutcome::NoFilter);
    }

    #[test]
    fn test_unknown_genre_yields_no_results() {
        let epg = EpgParser::parse(FEED).unwrap();
        assert_eq!(
            filter_by_genre(&epg, &select(&["Documentary"])),
            GenreOutcome::Results(Vec::new())
        );
    }
}
