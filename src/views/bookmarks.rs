//! Bookmark management view

use eframe::egui;

use super::{inline_error, star_text};
use crate::bookmarks::BookmarkRow;
use crate::GuideApp;

impl GuideApp {
    pub(crate) fn show_bookmarks_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Bookmarks");
            let count = ui.label(egui::RichText::new(format!("{} bookmarked", self.store.bookmarks.len())).weak());
            if !self.store.bookmarks.is_empty() {
                let ids: Vec<&str> = self.store.bookmarks.list().collect();
                count.on_hover_text(ids.join(", "));
            }
        });
        let hint = if self.store.bookmarks.is_empty() {
            "Click ☆ to bookmark a channel. Bookmarked channels are listed first in the guide."
        } else {
            "Bookmarked channels are listed first in the guide."
        };
        ui.label(egui::RichText::new(hint).weak());
        ui.separator();

        if self.store.is_unavailable() {
            let error = self.store.status().last_error.as_deref().unwrap_or("no data");
            inline_error(ui, &format!("Channel list unavailable: {}", error));
        }

        let mut toggle: Option<String> = None;
        {
            let rows = self.store.bookmarks.rows(&self.store.snapshot().channels);

            egui::ScrollArea::vertical()
                .id_salt("bookmark_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    egui::Grid::new("bookmark_grid")
                        .striped(true)
                        .num_columns(3)
                        .spacing([12.0, 4.0])
                        .show(ui, |ui| {
                            for row in &rows {
                                match row {
                                    BookmarkRow::Channel { channel, bookmarked } => {
                                        let hint = if *bookmarked { "Remove bookmark" } else { "Bookmark channel" };
                                        if ui.button(star_text(*bookmarked)).on_hover_text(hint).clicked() {
                                            toggle = Some(channel.id.clone());
                                        }
                                        ui.label(channel.display_name.as_str());
                                        ui.label(egui::RichText::new(channel.id.as_str()).weak());
                                    }
                                    BookmarkRow::Unavailable { id } => {
                                        if ui.button(star_text(true)).on_hover_text("Remove bookmark").clicked() {
                                            toggle = Some(id.to_string());
                                        }
                                        ui.label(
                                            egui::RichText::new("unavailable in current guide")
                                                .italics()
                                                .color(egui::Color32::GRAY),
                                        );
                                        ui.label(egui::RichText::new(*id).weak());
                                    }
                                }
                                ui.end_row();
                            }
                        });
                });
        }

        if let Some(id) = toggle {
            self.toggle_bookmark(&id);
        }
    }

    pub(crate) fn toggle_bookmark(&mut self, id: &str) {
        let name = self.store.snapshot().channel_name(id).to_string();
        if self.store.bookmarks.toggle(id) {
            self.console.info(format!("Bookmarked {}", name));
        } else {
            self.console.info(format!("Removed bookmark {}", name));
        }
    }
}
