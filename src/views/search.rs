//! Title search view

use eframe::egui;

use super::{inline_error, match_list};
use crate::epg::{search, SearchOutcome};
use crate::GuideApp;

impl GuideApp {
    pub(crate) fn show_search_tab(&mut self, ui: &mut egui::Ui) {
        let mut run = false;

        ui.horizontal(|ui| {
            ui.label("Title:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.search_query)
                    .hint_text("e.g. news")
                    .desired_width(320.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                run = true;
            }
            if ui.button("🔍 Search").clicked() {
                run = true;
            }
            if ui.button("Clear").clicked() {
                self.search_query.clear();
                self.searched_for.clear();
                self.search_outcome = SearchOutcome::NotPerformed;
            }
        });

        if run {
            self.run_search();
        }
        ui.separator();

        if self.store.is_unavailable() {
            let error = self.store.status().last_error.as_deref().unwrap_or("no data");
            inline_error(ui, &format!("Search unavailable: {}", error));
            return;
        }

        let opened = match &self.search_outcome {
            SearchOutcome::NotPerformed => {
                ui.label(egui::RichText::new("Enter a program title to search all channels.").weak());
                None
            }
            SearchOutcome::Results(matches) if matches.is_empty() => {
                ui.label(format!("No results found for '{}'", self.searched_for));
                None
            }
            SearchOutcome::Results(matches) => match_list(ui, "search_results", matches),
        };

        if opened.is_some() {
            self.details = opened;
        }
    }

    /// Search the current snapshot for the typed query
    pub(crate) fn run_search(&mut self) {
        self.searched_for = self.search_query.trim().to_string();
        self.repeat_search();

        if self.search_outcome != SearchOutcome::NotPerformed {
            let hits = self.search_outcome.matches().len();
            self.console.info(format!("Search '{}': {} result(s)", self.searched_for, hits));
        }
    }

    /// Re-run the last submitted query; the text box is left as typed
    pub(crate) fn repeat_search(&mut self) {
        self.search_outcome = search(self.store.snapshot(), &self.searched_for);
    }
}
