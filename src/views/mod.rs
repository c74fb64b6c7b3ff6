//! Views rendered inside the guide window
//!
//! Each view reads the shared `GuideStore` snapshot and hands any user action
//! back to `GuideApp` after drawing, so no view mutates state mid-frame.

mod bookmarks;
mod channel_list;
mod console;
mod details;
mod genres;
mod search;

pub use channel_list::Pager;
pub use console::ConsoleLog;

use eframe::egui;

use crate::epg::ProgramMatch;
use crate::models::DetailsPopup;

/// Bookmark star, filled when set
fn star_text(bookmarked: bool) -> egui::RichText {
    if bookmarked {
        egui::RichText::new("★").size(18.0).color(egui::Color32::GOLD)
    } else {
        egui::RichText::new("☆").size(18.0).color(egui::Color32::GRAY)
    }
}

fn inline_error(ui: &mut egui::Ui, message: &str) {
    ui.label(egui::RichText::new(format!("⚠ {}", message)).color(egui::Color32::RED));
}

/// Table of projected programs; returns the popup for a clicked title
fn match_list(ui: &mut egui::Ui, id_salt: &str, matches: &[ProgramMatch]) -> Option<DetailsPopup> {
    let mut opened = None;

    ui.label(egui::RichText::new(format!("{} program(s)", matches.len())).weak());
    egui::ScrollArea::vertical()
        .id_salt(id_salt)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new(format!("{}_grid", id_salt))
                .striped(true)
                .num_columns(4)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    ui.strong("Channel");
                    ui.strong("Title");
                    ui.strong("Start");
                    ui.strong("Stop");
                    ui.end_row();

                    for found in matches {
                        ui.label(found.channel_name.as_str());
                        if ui.link(found.title.as_str()).on_hover_text("Show details").clicked() {
                            opened = Some(DetailsPopup::for_match(found));
                        }
                        ui.monospace(found.start.as_str());
                        ui.monospace(found.stop.as_str());
                        ui.end_row();
                    }
                });
        });

    opened
}
