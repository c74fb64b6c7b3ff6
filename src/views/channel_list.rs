//! Paged channel list with each channel's schedule window

use std::ops::Range;

use chrono::Utc;
use eframe::egui;

use super::{inline_error, star_text};
use crate::epg::select_window;
use crate::models::DetailsPopup;
use crate::GuideApp;

/// Page cursor over the display-ordered channel list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    per_page: usize,
}

impl Pager {
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 0,
            per_page: per_page.max(1),
        }
    }

    /// Zero-based current page
    pub fn page(&self) -> usize {
        self.page
    }

    /// Always at least one page, even for an empty list
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.per_page).max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.page + 1 < self.page_count(total)
    }

    pub fn prev(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn next(&mut self, total: usize) {
        if self.has_next(total) {
            self.page += 1;
        }
    }

    /// Pull the cursor back after the list shrank
    pub fn clamp(&mut self, total: usize) {
        self.page = self.page.min(self.page_count(total) - 1);
    }

    /// Indices of the current page within a list of `total` items
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.page * self.per_page).min(total);
        let end = (start + self.per_page).min(total);
        start..end
    }
}

impl GuideApp {
    pub(crate) fn show_guide_tab(&mut self, ui: &mut egui::Ui) {
        let total = self.store.snapshot().channels.len();
        self.pager.clamp(total);

        if total == 0 {
            self.show_empty_guide(ui);
            return;
        }

        ui.horizontal(|ui| {
            if ui.add_enabled(self.pager.has_prev(), egui::Button::new("◀ Prev")).clicked() {
                self.pager.prev();
            }
            ui.label(format!("Page {} of {}", self.pager.page() + 1, self.pager.page_count(total)));
            if ui.add_enabled(self.pager.has_next(total), egui::Button::new("Next ▶")).clicked() {
                self.pager.next(total);
            }
            ui.separator();
            ui.label(egui::RichText::new(format!("{} channels", total)).weak());
        });
        ui.separator();

        let now = Utc::now();
        let range = self.pager.range(total);
        let mut toggle: Option<String> = None;
        let mut opened: Option<DetailsPopup> = None;

        {
            let data = self.store.snapshot();
            let channels = self.store.display_channels();

            egui::ScrollArea::vertical()
                .id_salt("guide_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for channel in &channels[range] {
                        let bookmarked = self.store.bookmarks.contains(&channel.id);

                        ui.group(|ui| {
                            ui.horizontal(|ui| {
                                let hint = if bookmarked { "Remove bookmark" } else { "Bookmark channel" };
                                if ui.button(star_text(bookmarked)).on_hover_text(hint).clicked() {
                                    toggle = Some(channel.id.clone());
                                }
                                let name = egui::RichText::new(channel.display_name.as_str()).strong().size(15.0);
                                if ui.button(name).on_hover_text("Channel details").clicked() {
                                    opened = Some(DetailsPopup::for_channel(channel));
                                }
                            });

                            let window = select_window(data.programs_for(&channel.id), now);
                            if window.is_empty() {
                                ui.label(egui::RichText::new("No programs listed").weak().italics());
                            }

                            for entry in &window {
                                ui.horizontal(|ui| {
                                    ui.add_sized(
                                        [96.0, 18.0],
                                        egui::Label::new(egui::RichText::new(entry.time_range()).monospace()),
                                    );

                                    let mut title = egui::RichText::new(entry.program.title.as_str());
                                    if entry.airing {
                                        ui.label(egui::RichText::new("Now:").strong().color(egui::Color32::GREEN));
                                        title = title.strong();
                                    }
                                    if ui.link(title).on_hover_text("Program details").clicked() {
                                        opened = Some(DetailsPopup::for_program(data, entry.program));
                                    }

                                    if let Some(episode) = &entry.program.episode {
                                        ui.label(egui::RichText::new(episode.as_str()).small().weak());
                                    }
                                    if entry.airing {
                                        if let Some(left) = entry.minutes_left(now) {
                                            ui.label(egui::RichText::new(format!("{} min left", left)).small().weak());
                                        }
                                    }
                                });
                            }
                        });
                    }
                });
        }

        if let Some(id) = toggle {
            self.toggle_bookmark(&id);
        }
        if opened.is_some() {
            self.details = opened;
        }
    }

    fn show_empty_guide(&self, ui: &mut egui::Ui) {
        ui.add_space(20.0);
        if let Some(error) = self.store.status().last_error.as_deref() {
            inline_error(ui, &format!("Guide unavailable: {}", error));
            ui.label("The guide will retry on the next refresh.");
        } else if self.refresher.is_in_flight() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading guide...");
            });
        } else {
            ui.label("No channels in the guide.");
        }
    }
}
