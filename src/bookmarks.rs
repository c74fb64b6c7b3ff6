//! Bookmarked channels
//!
//! Keyed by channel id so two channels sharing a display name stay distinct.
//! Lives for the process only; nothing is written to disk.

use std::collections::BTreeSet;

use crate::epg::Channel;

#[derive(Debug, Clone, Default)]
pub struct BookmarkSet {
    ids: BTreeSet<String>,
}

/// Row of the bookmark management view
#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkRow<'a> {
    /// A channel in the current guide, bookmarked or not
    Channel { channel: &'a Channel, bookmarked: bool },
    /// A bookmark whose channel is missing from the current guide
    Unavailable { id: &'a str },
}

impl BookmarkSet {
    /// Insert a channel id; returns false if it was already present
    pub fn add(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    /// Remove a channel id; returns false if it was absent
    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    /// Flip membership, returning the new state
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.remove(id) {
            false
        } else {
            self.add(id)
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Current membership. Callers must not rely on the order.
    pub fn list(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Display order: bookmarked channels first, then the rest, each group
    /// keeping its order from `channels`.
    pub fn order_channels<'a>(&self, channels: &'a [Channel]) -> Vec<&'a Channel> {
        let (mut marked, rest): (Vec<&Channel>, Vec<&Channel>) =
            channels.iter().partition(|c| self.contains(&c.id));
        marked.extend(rest);
        marked
    }

    /// Every channel of the guide with its bookmark state, followed by
    /// bookmarks that no longer resolve to a channel.
    pub fn rows<'a>(&'a self, channels: &'a [Channel]) -> Vec<BookmarkRow<'a>> {
        let mut rows: Vec<BookmarkRow<'a>> = channels
            .iter()
            .map(|channel| BookmarkRow::Channel {
                channel,
                bookmarked: self.contains(&channel.id),
            })
            .collect();

        rows.extend(
            self.ids
                .iter()
                .filter(|id| !channels.iter().any(|c| &c.id == *id))
                .map(|id| BookmarkRow::Unavailable { id: id.as_str() }),
        );
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: &str, name: &str) -> Channel {
        Channel {
            id: id.to_string(),
            display_name: name.to_string(),
            description: None,
            icon: None,
        }
    }

    fn abcd() -> Vec<Channel> {
        vec![
            channel("a", "A"),
            channel("b", "B"),
            channel("c", "C"),
            channel("d", "D"),
        ]
    }

    fn ids(channels: &[&Channel]) -> Vec<String> {
        channels.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_add_and_remove_are_idempotent() {
        let mut set = BookmarkSet::default();
        assert!(set.add("a"));
        assert!(!set.add("a"));
        assert_eq!(set.len(), 1);

        assert!(set.remove("a"));
        assert!(!set.remove("a"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut set = BookmarkSet::default();
        assert!(set.toggle("x"));
        assert!(set.contains("x"));
        assert!(!set.toggle("x"));
        assert!(!set.contains("x"));
    }

    #[test]
    fn test_bookmarked_channels_come_first_in_original_order() {
        let channels = abcd();
        let mut set = BookmarkSet::default();
        set.add("c");
        set.add("a");
        assert_eq!(ids(&set.order_channels(&channels)), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_removing_bookmark_restores_original_position() {
        let channels = abcd();
        let mut set = BookmarkSet::default();
        set.add("d");
        assert_eq!(ids(&set.order_channels(&channels)), vec!["d", "a", "b", "c"]);
        set.remove("d");
        assert_eq!(ids(&set.order_channels(&channels)), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_same_display_name_different_ids() {
        let channels = vec![channel("one", "News"), channel("two", "News")];
        let mut set = BookmarkSet::default();
        set.add("two");
        assert_eq!(ids(&set.order_channels(&channels)), vec!["two", "one"]);
    }

    #[test]
    fn test_list_reports_membership() {
        let mut set = BookmarkSet::default();
        set.add("b");
        set.add("a");
        let mut listed: Vec<&str> = set.list().collect();
        listed.sort();
        assert_eq!(listed, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_channel_is_retained_as_unavailable() {
        let channels = abcd();
        let mut set = BookmarkSet::default();
        set.add("b");
        set.add("gone");

        let rows = set.rows(&channels);
        assert_eq!(rows.len(), 5);
        assert_eq!(
            rows[1],
            BookmarkRow::Channel { channel: &channels[1], bookmarked: true }
        );
        assert_eq!(rows[4], BookmarkRow::Unavailable { id: "gone" });

        // Still bookmarked, just not displayable
        assert!(set.contains("gone"));
        assert_eq!(set.order_channels(&channels).len(), 4);
    }
}
