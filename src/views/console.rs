//! In-app console log

use std::collections::VecDeque;

use chrono::Local;
use eframe::egui;

use crate::GuideApp;

/// Lines kept before the oldest are dropped
pub const CONSOLE_CAPACITY: usize = 500;

#[derive(Debug, Default)]
pub struct ConsoleLog {
    lines: VecDeque<String>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, level: &str, message: &str) {
        let timestamp = Local::now().format("%H:%M:%S");
        self.lines.push_back(format!("[{}] [{}] {}", timestamp, level, message));
        while self.lines.len() > CONSOLE_CAPACITY {
            self.lines.pop_front();
        }
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.push("INFO", message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.push("WARN", message.as_ref());
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.push("ERROR", message.as_ref());
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

impl GuideApp {
    pub(crate) fn show_console_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Console Log");
            ui.label(egui::RichText::new(format!("{} lines", self.console.len())).weak());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🗑 Clear").clicked() {
                    self.console.clear();
                    self.console.info("Console cleared");
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in self.console.lines() {
                    let color = if line.contains("[ERROR]") {
                        egui::Color32::RED
                    } else if line.contains("[WARN]") {
                        egui::Color32::YELLOW
                    } else if line.contains("[INFO]") {
                        egui::Color32::LIGHT_BLUE
                    } else {
                        egui::Color32::GRAY
                    };

                    ui.label(egui::RichText::new(line).monospace().color(color));
                }
            });
    }
}
