//! TV Guide - XMLTV program guide viewer
//! Shows what's on now and next for every channel in an XMLTV feed

// Hide console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use eframe::egui;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

mod bookmarks;
mod config;
mod epg;
mod logging;
mod models;
mod refresh;
mod store;
mod views;

use config::AppConfig;
use epg::{available_genres, FeedSource, GenreOutcome, HttpFeed, SearchOutcome};
use models::{DetailsPopup, Tab};
use refresh::{RefreshCoordinator, RefreshEvent, Waker};
use store::GuideStore;
use views::{ConsoleLog, Pager};

fn main() -> Result<(), eframe::Error> {
    logging::init_tracing();

    let config = AppConfig::load();
    tracing::info!(
        feed = %config.feed_url,
        interval_secs = config.refresh_interval_secs,
        "starting tv guide"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([760.0, 480.0]),
        vsync: true,
        ..Default::default()
    };

    eframe::run_native(
        "TV Guide",
        options,
        Box::new(move |cc| {
            let visuals = if config.dark_mode {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            };
            cc.egui_ctx.set_visuals(visuals);

            // Wake the UI when a background refresh lands
            let ctx = cc.egui_ctx.clone();
            let waker: Waker = Arc::new(move || ctx.request_repaint());

            let feed = Arc::new(HttpFeed::new(config.fetch_config()));
            Ok(Box::new(GuideApp::new(&config, feed).with_waker(waker)))
        }),
    )
}

struct GuideApp {
    store: GuideStore,
    refresher: RefreshCoordinator,
    feed: Arc<dyn FeedSource>,

    current_tab: Tab,
    pager: Pager,

    // Search
    search_query: String,
    searched_for: String,
    search_outcome: SearchOutcome,

    // Genre filter
    genres: Vec<String>,
    selected_genres: BTreeSet<String>,
    genre_outcome: GenreOutcome,

    details: Option<DetailsPopup>,
    console: ConsoleLog,
    status_message: String,
}

impl GuideApp {
    fn new(config: &AppConfig, feed: Arc<dyn FeedSource>) -> Self {
        let mut console = ConsoleLog::new();
        console.info(format!("Feed: {}", feed.describe()));
        console.info(format!(
            "Refreshing every {}s, {} channels per page",
            config.refresh_interval_secs, config.channels_per_page
        ));

        Self {
            store: GuideStore::new(),
            refresher: RefreshCoordinator::new(config.refresh_interval()),
            feed,
            current_tab: Tab::Guide,
            pager: Pager::new(config.channels_per_page),
            search_query: String::new(),
            searched_for: String::new(),
            search_outcome: SearchOutcome::NotPerformed,
            genres: Vec::new(),
            selected_genres: BTreeSet::new(),
            genre_outcome: GenreOutcome::NoFilter,
            details: None,
            console,
            status_message: "Loading guide...".to_string(),
        }
    }

    fn with_waker(mut self, waker: Waker) -> Self {
        self.refresher = self.refresher.with_waker(waker);
        self
    }

    /// Apply finished cycles, then start the next one if due
    fn poll_refresh(&mut self) {
        for event in self.refresher.drain(&mut self.store) {
            self.on_refresh_event(event);
        }

        let now = Instant::now();
        if self.refresher.is_due(now) {
            let cycle = self.refresher.start(Arc::clone(&self.feed), now);
            self.console.info(format!("Refreshing guide (cycle {})", cycle));
        }
    }

    fn on_refresh_event(&mut self, event: RefreshEvent) {
        match event {
            RefreshEvent::Applied { cycle, channels, programs, elapsed } => {
                self.console.info(format!(
                    "Cycle {}: loaded {} channels, {} programs in {} ms",
                    cycle,
                    channels,
                    programs,
                    elapsed.as_millis()
                ));

                let data = self.store.snapshot();
                if data.skipped_channels + data.skipped_programs + data.orphaned_programs > 0 {
                    self.console.warn(format!(
                        "Skipped {} channels and {} programs with missing fields, dropped {} programs for unknown channels",
                        data.skipped_channels, data.skipped_programs, data.orphaned_programs
                    ));
                }

                self.status_message = format!("{} channels, {} programs", channels, programs);
                self.on_snapshot_replaced();
            }
            RefreshEvent::Failed { cycle, error } => {
                self.console.error(format!("Cycle {}: {}", cycle, error));
                self.status_message = if self.store.snapshot().is_empty() {
                    format!("Guide unavailable: {}", error)
                } else {
                    format!("Refresh failed, showing previous guide: {}", error)
                };
            }
            RefreshEvent::Discarded { cycle } => {
                self.console.warn(format!("Cycle {}: arrived after a newer guide, discarded", cycle));
            }
        }
    }

    /// Re-derive everything computed from the previous snapshot
    fn on_snapshot_replaced(&mut self) {
        self.pager.clamp(self.store.snapshot().channels.len());
        self.genres = available_genres(self.store.snapshot());

        if !self.selected_genres.is_empty() {
            self.apply_genre_filter();
        }
        if matches!(self.search_outcome, SearchOutcome::Results(_)) {
            self.repeat_search();
        }
    }
}

impl eframe::App for GuideApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_refresh();

        // Clock and "Now" badges
        ctx.request_repaint_after(Duration::from_secs(1));

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("📺 TV Guide");
                ui.separator();
                let clock = chrono::Local::now().format("%a %d %b  %H:%M:%S").to_string();
                ui.label(egui::RichText::new(clock).monospace().strong());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let refreshing = self.refresher.is_in_flight();
                    if ui
                        .add_enabled(!refreshing, egui::Button::new("🔄 Refresh now"))
                        .clicked()
                    {
                        self.refresher.request_now();
                        self.console.info("Manual refresh requested");
                    }
                    if refreshing {
                        ui.spinner();
                    }
                });
            });

            ui.horizontal(|ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.current_tab, tab, tab.label());
                }
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let color = if self.store.status().last_error.is_some() {
                    egui::Color32::YELLOW
                } else {
                    ui.visuals().text_color()
                };
                ui.label(egui::RichText::new(self.status_message.as_str()).color(color));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let next = self.refresher.time_until_due(Instant::now()).as_secs();
                    ui.label(egui::RichText::new(format!("Next refresh in {}s", next)).weak());
                    let status = self.store.status();
                    if let Some(at) = status.last_success {
                        ui.label(egui::RichText::new(format!("Updated {}", at.format("%H:%M:%S"))).weak())
                            .on_hover_text(format!(
                                "{} successful, {} failed refreshes",
                                status.successful_cycles, status.failed_cycles
                            ));
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.current_tab {
            Tab::Guide => self.show_guide_tab(ui),
            Tab::Search => self.show_search_tab(ui),
            Tab::Genres => self.show_genres_tab(ui),
            Tab::Bookmarks => self.show_bookmarks_tab(ui),
            Tab::Console => self.show_console_tab(ui),
        });

        self.show_details_window(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epg::{EpgParser, FetchError};

    const FEED: &str = r#"<tv>
  <channel id="a"><display-name>Alpha</display-name></channel>
  <channel id="b"><display-name>Bravo</display-name></channel>
  <programme start="20240115120000" stop="20240115130000" channel="a"><title>Midday News</title><category>News</category></programme>
  <programme start="20240115130000" stop="20240115140000" channel="b"><title>Cooking</title><category>Lifestyle</category></programme>
  <programme start="20240115130000" stop="20240115140000" channel="z"><title>Orphan</title></programme>
</tv>"#;

    struct OfflineFeed;

    impl FeedSource for OfflineFeed {
        fn fetch(&self) -> Result<Vec<u8>, FetchError> {
            Err(FetchError::Status {
                url: "offline".to_string(),
                status: 503,
            })
        }

        fn describe(&self) -> String {
            "offline".to_string()
        }
    }

    fn app() -> GuideApp {
        GuideApp::new(&AppConfig::default(), Arc::new(OfflineFeed))
    }

    fn applied(app: &mut GuideApp, xml: &str, cycle: u64) {
        let data = EpgParser::parse(xml).unwrap();
        let (channels, programs) = (data.channels.len(), data.program_count());
        app.store.replace(data);
        app.on_refresh_event(RefreshEvent::Applied {
            cycle,
            channels,
            programs,
            elapsed: Duration::from_millis(5),
        });
    }

    #[test]
    fn test_applied_cycle_rebuilds_derived_state() {
        let mut app = app();
        applied(&mut app, FEED, 1);

        assert_eq!(app.genres, vec!["Lifestyle".to_string(), "News".to_string()]);
        assert_eq!(app.status_message, "2 channels, 2 programs");
        assert!(app.console.lines().any(|l| l.contains("[WARN]") && l.contains("dropped 1")));
    }

    #[test]
    fn test_search_results_follow_new_snapshot() {
        let mut app = app();
        applied(&mut app, FEED, 1);

        app.search_query = "news".to_string();
        app.run_search();
        assert_eq!(app.search_outcome.matches().len(), 1);

        applied(&mut app, "<tv><channel id=\"a\"><display-name>Alpha</display-name></channel></tv>", 2);
        assert_eq!(app.search_outcome, SearchOutcome::Results(Vec::new()));
        assert_eq!(app.searched_for, "news");
    }

    #[test]
    fn test_refresh_keeps_unsubmitted_search_text() {
        let mut app = app();
        applied(&mut app, FEED, 1);

        app.search_query = "news".to_string();
        app.run_search();
        app.search_query = "cook".to_string();

        applied(&mut app, FEED, 2);
        assert_eq!(app.search_query, "cook");
        assert_eq!(app.searched_for, "news");
        assert_eq!(app.search_outcome.matches()[0].title, "Midday News");
    }

    #[test]
    fn test_failed_cycle_without_guide_reports_unavailable() {
        let mut app = app();
        app.store.record_failure("HTTP error 503 from offline".to_string());
        app.on_refresh_event(RefreshEvent::Failed {
            cycle: 1,
            error: "HTTP error 503 from offline".to_string(),
        });

        assert!(app.status_message.starts_with("Guide unavailable"));
        assert!(app.console.lines().any(|l| l.contains("[ERROR] Cycle 1")));
    }

    #[test]
    fn test_failed_cycle_keeps_previous_guide() {
        let mut app = app();
        applied(&mut app, FEED, 1);
        app.on_refresh_event(RefreshEvent::Failed {
            cycle: 2,
            error: "timed out".to_string(),
        });

        assert!(app.status_message.starts_with("Refresh failed, showing previous guide"));
        assert_eq!(app.store.snapshot().channels.len(), 2);
    }

    #[test]
    fn test_bookmark_toggle_reorders_guide() {
        let mut app = app();
        applied(&mut app, FEED, 1);

        app.toggle_bookmark("b");
        let order: Vec<&str> = app.store.display_channels().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);

        app.toggle_bookmark("b");
        let order: Vec<&str> = app.store.display_channels().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_genre_selection_survives_refresh() {
        let mut app = app();
        applied(&mut app, FEED, 1);

        app.selected_genres.insert("news".to_string());
        app.apply_genre_filter();
        match &app.genre_outcome {
            GenreOutcome::Results(matches) => assert_eq!(matches[0].title, "Midday News"),
            other => panic!("unexpected outcome {:?}", other),
        }

        applied(&mut app, FEED, 2);
        assert!(matches!(&app.genre_outcome, GenreOutcome::Results(m) if m.len() == 1));
    }
}
