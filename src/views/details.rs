//! Description popup for a channel or program

use eframe::egui;

use crate::GuideApp;

impl GuideApp {
    pub(crate) fn show_details_window(&mut self, ctx: &egui::Context) {
        let Some(popup) = &self.details else {
            return;
        };

        let mut open = true;
        let mut close_clicked = false;

        egui::Window::new(popup.heading.as_str())
            .id(egui::Id::new("details_popup"))
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                if let Some(subheading) = &popup.subheading {
                    ui.label(egui::RichText::new(subheading.as_str()).weak());
                }
                if let Some(episode) = &popup.episode {
                    ui.label(egui::RichText::new(episode.as_str()).monospace());
                }
                if !popup.categories.is_empty() {
                    ui.horizontal_wrapped(|ui| {
                        for category in &popup.categories {
                            ui.label(
                                egui::RichText::new(category.as_str())
                                    .small()
                                    .color(egui::Color32::LIGHT_BLUE),
                            );
                        }
                    });
                }
                ui.separator();

                egui::ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
                    ui.label(popup.body.as_str());
                });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Close").clicked() {
                        close_clicked = true;
                    }
                    if let Some(icon) = &popup.icon {
                        ui.hyperlink_to("Channel logo", icon.as_str());
                    }
                });
            });

        if !open || close_clicked {
            self.details = None;
        }
    }
}
