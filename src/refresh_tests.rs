//! Tests for the refresh cycle

use super::*;
use crate::epg::{FetchError, ParseError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const GOOD_FEED: &str = r#"<tv>
  <channel id="a"><display-name>Alpha</display-name></channel>
  <channel id="b"><display-name>Bravo</display-name></channel>
  <programme start="20240115120000" stop="20240115130000" channel="a"><title>Midday</title></programme>
</tv>"#;

/// Replays a scripted list of responses, repeating the last one
struct ScriptedFeed {
    responses: Mutex<Vec<Result<String, u16>>>,
    calls: AtomicUsize,
}

impl ScriptedFeed {
    fn new(responses: Vec<Result<String, u16>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            calls: AtomicUsize::new(0),
        })
    }
}

impl FeedSource for ScriptedFeed {
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let responses = self.responses.lock().unwrap();
        let response = responses.get(n).or(responses.last()).cloned().unwrap();
        response.map(String::into_bytes).map_err(|status| FetchError::Status {
            url: "scripted".to_string(),
            status,
        })
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

struct PanickingFeed;

impl FeedSource for PanickingFeed {
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        panic!("boom");
    }

    fn describe(&self) -> String {
        "panicking".to_string()
    }
}

/// Block until the in-flight cycle has been applied
fn wait_for_event(coordinator: &mut RefreshCoordinator, store: &mut GuideStore) -> RefreshEvent {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let mut events = coordinator.drain(store);
        if let Some(event) = events.pop() {
            return event;
        }
        assert!(Instant::now() < deadline, "refresh did not finish");
        thread::sleep(Duration::from_millis(5));
    }
}

fn outcome(cycle: u64, result: Result<EpgData, RefreshError>) -> RefreshOutcome {
    RefreshOutcome {
        cycle,
        result,
        elapsed: Duration::from_millis(1),
    }
}

#[test]
fn test_first_cycle_is_due_immediately() {
    let coordinator = RefreshCoordinator::new(Duration::from_secs(60));
    assert!(coordinator.is_due(Instant::now()));
}

#[test]
fn test_successful_cycle_replaces_snapshot() {
    let feed = ScriptedFeed::new(vec![Ok(GOOD_FEED.to_string())]);
    let mut coordinator = RefreshCoordinator::new(Duration::from_secs(60));
    let mut store = GuideStore::new();

    let cycle = coordinator.start(feed, Instant::now());
    assert!(coordinator.is_in_flight());

    match wait_for_event(&mut coordinator, &mut store) {
        RefreshEvent::Applied { cycle: applied, channels, programs, .. } => {
            assert_eq!(applied, cycle);
            assert_eq!(channels, 2);
            assert_eq!(programs, 1);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(!coordinator.is_in_flight());
    assert_eq!(store.snapshot().channels.len(), 2);
}

#[test]
fn test_http_500_keeps_previous_guide() {
    let feed = ScriptedFeed::new(vec![Ok(GOOD_FEED.to_string()), Err(500)]);
    let mut coordinator = RefreshCoordinator::new(Duration::from_secs(60));
    let mut store = GuideStore::new();

    coordinator.start(feed.clone(), Instant::now());
    wait_for_event(&mut coordinator, &mut store);

    coordinator.start(feed, Instant::now());
    match wait_for_event(&mut coordinator, &mut store) {
        RefreshEvent::Failed { error, .. } => assert!(error.contains("500")),
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(store.snapshot().channels.len(), 2);
    assert!(store.status().last_error.is_some());
}

#[test]
fn test_failure_without_previous_guide_is_empty_not_fatal() {
    let feed = ScriptedFeed::new(vec![Err(503)]);
    let mut coordinator = RefreshCoordinator::new(Duration::from_secs(60));
    let mut store = GuideStore::new();

    coordinator.start(feed, Instant::now());
    assert!(matches!(
        wait_for_event(&mut coordinator, &mut store),
        RefreshEvent::Failed { .. }
    ));
    assert!(store.snapshot().is_empty());
    assert!(store.is_unavailable());
}

#[test]
fn test_malformed_feed_keeps_previous_guide() {
    let feed = ScriptedFeed::new(vec![
        Ok(GOOD_FEED.to_string()),
        Ok("<tv><channel id=\"x\"></tv>".to_string()),
    ]);
    let mut coordinator = RefreshCoordinator::new(Duration::from_secs(60));
    let mut store = GuideStore::new();

    coordinator.start(feed.clone(), Instant::now());
    wait_for_event(&mut coordinator, &mut store);
    coordinator.start(feed, Instant::now());
    assert!(matches!(
        wait_for_event(&mut coordinator, &mut store),
        RefreshEvent::Failed { .. }
    ));
    assert_eq!(store.snapshot().channels.len(), 2);
}

#[test]
fn test_worker_panic_is_reported_as_failure() {
    let mut coordinator = RefreshCoordinator::new(Duration::from_secs(60));
    let mut store = GuideStore::new();

    coordinator.start(Arc::new(PanickingFeed), Instant::now());
    match wait_for_event(&mut coordinator, &mut store) {
        RefreshEvent::Failed { error, .. } => assert!(error.contains("panicked")),
        other => panic!("unexpected event {:?}", other),
    }
    assert!(!coordinator.is_in_flight());
}

#[test]
fn test_not_due_while_in_flight() {
    let feed = ScriptedFeed::new(vec![Ok(GOOD_FEED.to_string())]);
    let mut coordinator = RefreshCoordinator::new(Duration::ZERO);
    let mut store = GuideStore::new();

    let now = Instant::now();
    coordinator.start(feed, now);
    coordinator.request_now();
    assert!(!coordinator.is_due(now + Duration::from_secs(120)));

    wait_for_event(&mut coordinator, &mut store);
    assert!(coordinator.is_due(Instant::now()));
}

#[test]
fn test_interval_governs_next_cycle() {
    let feed = ScriptedFeed::new(vec![Ok(GOOD_FEED.to_string())]);
    let mut coordinator = RefreshCoordinator::new(Duration::from_secs(60));
    let mut store = GuideStore::new();

    let started = Instant::now();
    coordinator.start(feed, started);
    wait_for_event(&mut coordinator, &mut store);

    assert!(!coordinator.is_due(started + Duration::from_secs(59)));
    assert!(coordinator.is_due(started + Duration::from_secs(60)));
    assert_eq!(
        coordinator.time_until_due(started + Duration::from_secs(45)),
        Duration::from_secs(15)
    );
}

#[test]
fn test_manual_request_overrides_interval() {
    let feed = ScriptedFeed::new(vec![Ok(GOOD_FEED.to_string())]);
    let mut coordinator = RefreshCoordinator::new(Duration::from_secs(60));
    let mut store = GuideStore::new();

    let started = Instant::now();
    coordinator.start(feed, started);
    wait_for_event(&mut coordinator, &mut store);

    assert!(!coordinator.is_due(started + Duration::from_secs(1)));
    coordinator.request_now();
    assert!(coordinator.is_due(started + Duration::from_secs(1)));
}

#[test]
fn test_superseded_result_is_discarded() {
    let mut coordinator = RefreshCoordinator::new(Duration::from_secs(60));
    let mut store = GuideStore::new();

    let newer = EpgParser::parse(GOOD_FEED).unwrap();
    let older = EpgParser::parse("<tv><channel id=\"z\"><display-name>Old</display-name></channel></tv>").unwrap();

    assert!(matches!(
        coordinator.apply(outcome(2, Ok(newer)), &mut store),
        RefreshEvent::Applied { cycle: 2, .. }
    ));
    assert_eq!(
        coordinator.apply(outcome(1, Ok(older)), &mut store),
        RefreshEvent::Discarded { cycle: 1 }
    );
    assert_eq!(store.snapshot().channels.len(), 2);
    assert!(store.snapshot().channel("z").is_none());
}

#[test]
fn test_run_cycle_maps_errors() {
    let feed = ScriptedFeed::new(vec![Ok("not xml at all".to_string())]);
    assert!(matches!(
        run_cycle(feed.as_ref()),
        Err(RefreshError::Parse(ParseError::MissingRoot))
    ));

    let feed = ScriptedFeed::new(vec![Err(404)]);
    assert!(matches!(
        run_cycle(feed.as_ref()),
        Err(RefreshError::Fetch(FetchError::Status { status: 404, .. }))
    ));
}

#[test]
fn test_waker_is_called_after_cycle() {
    let woke = Arc::new(AtomicUsize::new(0));
    let counter = woke.clone();
    let mut coordinator = RefreshCoordinator::new(Duration::from_secs(60))
        .with_waker(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    let mut store = GuideStore::new();

    coordinator.start(ScriptedFeed::new(vec![Ok(GOOD_FEED.to_string())]), Instant::now());
    wait_for_event(&mut coordinator, &mut store);

    // The waker runs right after the send; give it a moment
    let deadline = Instant::now() + Duration::from_secs(5);
    while woke.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(woke.load(Ordering::SeqCst), 1);
}
