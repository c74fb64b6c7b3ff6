//! Genre filter view

use eframe::egui;

use super::{inline_error, match_list};
use crate::epg::{filter_by_genre, GenreOutcome};
use crate::GuideApp;

impl GuideApp {
    pub(crate) fn show_genres_tab(&mut self, ui: &mut egui::Ui) {
        if self.store.is_unavailable() {
            let error = self.store.status().last_error.as_deref().unwrap_or("no data");
            inline_error(ui, &format!("Genres unavailable: {}", error));
            return;
        }
        if self.genres.is_empty() {
            ui.label("The guide lists no genres.");
            return;
        }

        let mut toggled: Vec<String> = Vec::new();
        let mut clear = false;

        egui::SidePanel::left("genre_list")
            .resizable(true)
            .default_width(180.0)
            .show_inside(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.strong("Genres");
                    if ui.small_button("Clear").clicked() {
                        clear = true;
                    }
                });
                ui.separator();
                egui::ScrollArea::vertical().id_salt("genre_scroll").show(ui, |ui| {
                    for genre in &self.genres {
                        let mut checked = self.selected_genres.contains(genre);
                        if ui.checkbox(&mut checked, genre.as_str()).changed() {
                            toggled.push(genre.clone());
                        }
                    }
                });
            });

        if clear || !toggled.is_empty() {
            if clear {
                self.selected_genres.clear();
            }
            for genre in toggled {
                if !self.selected_genres.remove(&genre) {
                    self.selected_genres.insert(genre);
                }
            }
            self.apply_genre_filter();
        }

        let opened = egui::CentralPanel::default()
            .show_inside(ui, |ui| match &self.genre_outcome {
                GenreOutcome::NoFilter => {
                    ui.label(egui::RichText::new("Select one or more genres to list matching programs.").weak());
                    None
                }
                GenreOutcome::Results(matches) if matches.is_empty() => {
                    ui.label("No programs match the selected genres.");
                    None
                }
                GenreOutcome::Results(matches) => match_list(ui, "genre_results", matches),
            })
            .inner;

        if opened.is_some() {
            self.details = opened;
        }
    }

    pub(crate) fn apply_genre_filter(&mut self) {
        self.genre_outcome = filter_by_genre(self.store.snapshot(), &self.selected_genres);
        if let GenreOutcome::Results(matches) = &self.genre_outcome {
            let selected: Vec<&str> = self.selected_genres.iter().map(String::as_str).collect();
            self.console.info(format!("Genres [{}]: {} program(s)", selected.join(", "), matches.len()));
        }
    }
}
