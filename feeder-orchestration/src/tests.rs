//! Testes do módulo feeder-orchestration

use crate::*;
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use chrono::{Local, TimeZone};
use feeder_actuator::FeedCommand;

// ═══════════════════════════════════════════════════════════════════════════════
// MOCKS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct MockCamera {
    ready: bool,
    fail: bool,
    reads: Arc<AtomicUsize>,
}

impl MockCamera {
    fn working() -> Self {
        Self {
            ready: true,
            fail: false,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FeederComponent for MockCamera {
    fn name(&self) -> &str {
        "mock-camera"
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

impl Sensor for MockCamera {
    type RawData = Vec<u8>;

    fn read(&mut self) -> Result<Vec<u8>, SensorError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SensorError::ReadFailed("lens covered".into()));
        }
        Ok(vec![0xFF, 0xD8, 0xFF])
    }
}

#[derive(Debug, Clone)]
struct MockClassifier {
    answer: Result<BowlVerdict, ClassifierError>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockClassifier {
    fn answering(answer: Result<BowlVerdict, ClassifierError>) -> Self {
        Self {
            answer,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FeederComponent for MockClassifier {
    fn name(&self) -> &str {
        "mock-classifier"
    }
}

impl Classifier for MockClassifier {
    type Input = Vec<u8>;

    fn classify(&mut self, _input: &Vec<u8>) -> Result<BowlVerdict, ClassifierError> {
        thread::sleep(self.delay);
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

#[derive(Debug, Clone, Default)]
struct MockFeeder {
    fail: bool,
    sent: Arc<Mutex<Vec<FeedCommand>>>,
}

impl MockFeeder {
    fn sent(&self) -> Vec<FeedCommand> {
        self.sent.lock().unwrap().clone()
    }
}

impl FeederComponent for MockFeeder {
    fn name(&self) -> &str {
        "mock-feeder"
    }
}

impl Actuator for MockFeeder {
    type Command = FeedCommand;
    type Outcome = u16;

    fn send(&mut self, cmd: FeedCommand) -> Result<u16, ActuatorError> {
        self.sent.lock().unwrap().push(cmd);
        if self.fail {
            return Err(ActuatorError::CommandFailed("HTTP 500: oops".into()));
        }
        Ok(200)
    }

    fn status(&self) -> ActuatorStatus {
        ActuatorStatus::Ready
    }
}

fn cycle_with(
    answer: Result<BowlVerdict, ClassifierError>,
) -> (CheckCycle<MockCamera, MockClassifier, MockFeeder>, MockFeeder) {
    let feeder = MockFeeder::default();
    let cycle = CheckCycle::new(
        MockCamera::working(),
        MockClassifier::answering(answer),
        feeder.clone(),
    );
    (cycle, feeder)
}

fn fast_session(
    cycle: CheckCycle<MockCamera, MockClassifier, MockFeeder>,
    interval: Duration,
) -> FeederSession<MockCamera, MockClassifier, MockFeeder> {
    FeederSession::new(
        cycle,
        SessionConfig {
            interval,
            log_capacity: 50,
        },
    )
    .unwrap()
}

fn messages(log: &ActivityLog) -> Vec<String> {
    log.entries()
        .unwrap()
        .into_iter()
        .map(|e| e.kind.to_string())
        .collect()
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

// ═══════════════════════════════════════════════════════════════════════════════
// HISTÓRICO
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_log_kind_messages() {
    assert_eq!(LogKind::NeedToFeed.to_string(), "Bowl check done: Need to feed.");
    assert_eq!(LogKind::NoNeedToFeed.to_string(), "Bowl check done: No need to feed.");
    assert_eq!(LogKind::Error("boom".into()).to_string(), "Error: boom");
    assert_eq!(LogKind::PhotoFailed.to_string(), "Failed to take photo.");
    assert_eq!(LogKind::CameraNotReady.to_string(), "Camera is not ready.");
    assert_eq!(LogKind::ManualFeed.to_string(), "Manual feed sent.");
    assert!(LogKind::PhotoFailed.is_error());
    assert!(!LogKind::NoNeedToFeed.is_error());
}

#[test]
fn test_log_entry_display() {
    let entry = LogEntry {
        timestamp: Local.with_ymd_and_hms(2024, 5, 1, 8, 5, 9).unwrap(),
        kind: LogKind::NeedToFeed,
    };
    assert_eq!(entry.to_string(), "08:05:09 Bowl check done: Need to feed.");
}

#[test]
fn test_activity_log_is_bounded() {
    let log = ActivityLog::with_capacity(3);
    for _ in 0..5 {
        log.record(LogKind::NoNeedToFeed).unwrap();
    }
    log.record(LogKind::NeedToFeed).unwrap();

    assert_eq!(log.len(), 3);
    assert_eq!(log.last().unwrap().unwrap().kind, LogKind::NeedToFeed);

    log.clear().unwrap();
    assert!(log.is_empty());
}

#[test]
fn test_activity_log_subscribers() {
    let log = ActivityLog::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    log.subscribe(move |entry| sink.lock().unwrap().push(entry.kind.clone()))
        .unwrap();
    assert_eq!(log.handler_count().unwrap(), 1);

    log.record(LogKind::Started).unwrap();
    log.record(LogKind::PhotoFailed).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![LogKind::Started, LogKind::PhotoFailed]
    );

    log.unsubscribe_all().unwrap();
    log.record(LogKind::Stopped).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn test_handler_may_read_log() {
    let log = ActivityLog::new();
    let reader = log.clone();
    let lens = Arc::new(Mutex::new(Vec::new()));
    let sink = lens.clone();

    log.subscribe(move |_| sink.lock().unwrap().push(reader.len()))
        .unwrap();
    log.record(LogKind::Started).unwrap();

    assert_eq!(*lens.lock().unwrap(), vec![1]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// CICLO
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_cycle_feeds_when_low() {
    let (mut cycle, feeder) = cycle_with(Ok(BowlVerdict::NeedsFood));
    let log = ActivityLog::new();

    let outcome = cycle.run_logged(&log, || false).unwrap();

    assert_eq!(outcome, CycleOutcome::Fed);
    assert!(outcome.fed());
    assert_eq!(feeder.sent(), vec![FeedCommand::Scheduled]);
    assert_eq!(messages(&log), vec!["Bowl check done: Need to feed."]);
}

#[test]
fn test_cycle_skips_feed_when_sufficient() {
    let (mut cycle, feeder) = cycle_with(Ok(BowlVerdict::Sufficient));
    let log = ActivityLog::new();

    let outcome = cycle.run_logged(&log, || false).unwrap();

    assert_eq!(outcome, CycleOutcome::NoNeed);
    assert!(feeder.sent().is_empty());
    assert_eq!(messages(&log), vec!["Bowl check done: No need to feed."]);
}

#[test]
fn test_cycle_classifier_error_is_logged() {
    let (mut cycle, feeder) = cycle_with(Err(ClassifierError::RequestFailed("timed out".into())));
    let log = ActivityLog::new();

    let outcome = cycle.run_logged(&log, || false).unwrap();

    assert!(matches!(outcome, CycleOutcome::ClassifyFailed(_)));
    assert!(outcome.is_failure());
    assert!(feeder.sent().is_empty());
    assert_eq!(messages(&log), vec!["Error: Request failed: timed out"]);
}

#[test]
fn test_cycle_feed_failure_is_logged() {
    let feeder = MockFeeder {
        fail: true,
        ..MockFeeder::default()
    };
    let mut cycle = CheckCycle::new(
        MockCamera::working(),
        MockClassifier::answering(Ok(BowlVerdict::NeedsFood)),
        feeder.clone(),
    );
    let log = ActivityLog::new();

    let outcome = cycle.run_logged(&log, || false).unwrap();

    assert!(matches!(outcome, CycleOutcome::FeedFailed(_)));
    assert_eq!(feeder.sent().len(), 1);
    assert_eq!(messages(&log), vec!["Error: Command failed: HTTP 500: oops"]);
}

#[test]
fn test_cycle_photo_failure() {
    let classifier = MockClassifier::answering(Ok(BowlVerdict::NeedsFood));
    let calls = classifier.calls.clone();
    let camera = MockCamera {
        fail: true,
        ..MockCamera::working()
    };
    let mut cycle = CheckCycle::new(camera, classifier, MockFeeder::default());
    let log = ActivityLog::new();

    let outcome = cycle.run_logged(&log, || false).unwrap();

    assert!(matches!(outcome, CycleOutcome::PhotoFailed(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(messages(&log), vec!["Failed to take photo."]);
}

#[test]
fn test_cycle_camera_not_ready() {
    let camera = MockCamera {
        ready: false,
        ..MockCamera::working()
    };
    let reads = camera.reads.clone();
    let mut cycle = CheckCycle::new(
        camera,
        MockClassifier::answering(Ok(BowlVerdict::NeedsFood)),
        MockFeeder::default(),
    );
    let log = ActivityLog::new();

    let outcome = cycle.run_logged(&log, || false).unwrap();

    assert_eq!(outcome, CycleOutcome::CameraNotReady);
    assert_eq!(reads.load(Ordering::SeqCst), 0);
    assert_eq!(messages(&log), vec!["Camera is not ready."]);
}

#[test]
fn test_cycle_cancelled_between_stages() {
    let (mut cycle, feeder) = cycle_with(Ok(BowlVerdict::NeedsFood));
    let log = ActivityLog::new();

    // Cancela logo após a foto
    let probes = Cell::new(0);
    let outcome = cycle
        .run_logged(&log, || {
            probes.set(probes.get() + 1);
            probes.get() > 1
        })
        .unwrap();

    assert_eq!(outcome, CycleOutcome::Cancelled);
    assert!(outcome.log_kind().is_none());
    assert!(feeder.sent().is_empty());
    assert!(log.is_empty());
}

#[test]
fn test_cycle_run_uses_start_time() {
    let mut classifier = MockClassifier::answering(Ok(BowlVerdict::Sufficient));
    classifier.delay = Duration::from_millis(1100);
    let mut cycle = CheckCycle::new(MockCamera::working(), classifier, MockFeeder::default());
    let log = ActivityLog::new();

    let before = Local::now();
    cycle.run_logged(&log, || false).unwrap();

    let entry = log.last().unwrap().unwrap();
    assert!(entry.timestamp - before < chrono::Duration::milliseconds(500));
}

#[test]
fn test_cycle_check_does_not_feed() {
    let (mut cycle, feeder) = cycle_with(Ok(BowlVerdict::NeedsFood));
    assert_eq!(cycle.check().unwrap(), BowlVerdict::NeedsFood);
    assert!(feeder.sent().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSÃO
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_session_rejects_invalid_config() {
    let (cycle, _) = cycle_with(Ok(BowlVerdict::Sufficient));
    let result = FeederSession::new(
        cycle,
        SessionConfig {
            interval: Duration::ZERO,
            log_capacity: 10,
        },
    );
    assert!(matches!(result, Err(OrchestrationError::InvalidConfiguration(_))));
}

#[test]
fn test_session_config_from_feeder_config() {
    let config = SessionConfig::from(&FeederConfig::default());
    assert_eq!(config.interval, Duration::from_secs(300));
    assert_eq!(config.log_capacity, 500);
}

#[test]
fn test_session_start_runs_first_cycle_immediately() {
    let (cycle, feeder) = cycle_with(Ok(BowlVerdict::NeedsFood));
    let session = fast_session(cycle, Duration::from_secs(60));

    assert!(!session.is_running().unwrap());
    session.start().unwrap();
    assert!(session.is_running().unwrap());

    assert!(wait_for(|| session.log().len() >= 2));
    assert_eq!(
        messages(session.log()),
        vec!["Feeder started.", "Bowl check done: Need to feed."]
    );

    // A espera de 60s é interrompida pelo stop
    let start = Instant::now();
    session.stop().unwrap();
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(!session.is_running().unwrap());

    assert_eq!(feeder.sent(), vec![FeedCommand::Scheduled]);
    assert_eq!(
        session.log().last().unwrap().unwrap().kind,
        LogKind::Stopped
    );

    let stats = session.stats().unwrap();
    assert_eq!(stats.cycles, 1);
    assert_eq!(stats.fed, 1);
    assert!(stats.started_at.is_some());
    assert_eq!(stats.last_outcome, Some(CycleOutcome::Fed));
}

#[test]
fn test_session_repeats_after_interval() {
    let (cycle, _) = cycle_with(Ok(BowlVerdict::Sufficient));
    let session = fast_session(cycle, Duration::from_millis(20));

    session.start().unwrap();
    assert!(wait_for(|| session.stats().unwrap().cycles >= 3));
    session.stop().unwrap();

    let cycles = session.stats().unwrap().cycles;
    thread::sleep(Duration::from_millis(100));
    assert_eq!(session.stats().unwrap().cycles, cycles);
    assert!(session.stats().unwrap().scheduler.unwrap().tick_count >= 2);
}

#[test]
fn test_session_double_start_fails() {
    let (cycle, _) = cycle_with(Ok(BowlVerdict::Sufficient));
    let session = fast_session(cycle, Duration::from_secs(60));

    session.start().unwrap();
    assert_eq!(session.start(), Err(OrchestrationError::AlreadyRunning));
    session.stop().unwrap();
}

#[test]
fn test_session_stop_mid_cycle_never_feeds() {
    let feeder = MockFeeder::default();
    let mut classifier = MockClassifier::answering(Ok(BowlVerdict::NeedsFood));
    classifier.delay = Duration::from_millis(300);
    let calls = classifier.calls.clone();
    let cycle = CheckCycle::new(MockCamera::working(), classifier, feeder.clone());
    let session = fast_session(cycle, Duration::from_secs(60));

    session.start().unwrap();
    thread::sleep(Duration::from_millis(50));
    let stopping = Instant::now();
    session.stop().unwrap();

    // Aguarda a classificação em andamento, mas não alimenta
    assert!(stopping.elapsed() >= Duration::from_millis(150));
    assert!(!session.is_running().unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(feeder.sent().is_empty());
    assert_eq!(messages(session.log()), vec!["Feeder started.", "Feeder stopped."]);
    assert_eq!(session.stats().unwrap().cycles, 0);
}

#[test]
fn test_session_stop_when_idle_is_noop() {
    let (cycle, _) = cycle_with(Ok(BowlVerdict::Sufficient));
    let session = fast_session(cycle, Duration::from_secs(60));

    session.stop().unwrap();
    assert!(session.log().is_empty());
}

#[test]
fn test_session_restart() {
    let (cycle, _) = cycle_with(Ok(BowlVerdict::Sufficient));
    let session = fast_session(cycle, Duration::from_secs(60));

    session.start().unwrap();
    assert!(wait_for(|| session.stats().unwrap().cycles == 1));
    session.stop().unwrap();

    session.start().unwrap();
    assert!(wait_for(|| session.stats().unwrap().cycles == 2));
    session.stop().unwrap();

    let started = messages(session.log())
        .iter()
        .filter(|m| *m == "Feeder started.")
        .count();
    assert_eq!(started, 2);
}

#[test]
fn test_feed_now_while_idle() {
    let (cycle, feeder) = cycle_with(Ok(BowlVerdict::Sufficient));
    let session = fast_session(cycle, Duration::from_secs(60));

    assert_eq!(session.feed_now().unwrap(), 200);
    assert_eq!(feeder.sent(), vec![FeedCommand::Manual]);
    assert_eq!(messages(session.log()), vec!["Manual feed sent."]);
    assert_eq!(session.stats().unwrap().manual_feeds, 1);
}

#[test]
fn test_feed_now_failure_is_logged() {
    let feeder = MockFeeder {
        fail: true,
        ..MockFeeder::default()
    };
    let cycle = CheckCycle::new(
        MockCamera::working(),
        MockClassifier::answering(Ok(BowlVerdict::Sufficient)),
        feeder,
    );
    let session = fast_session(cycle, Duration::from_secs(60));

    assert!(matches!(
        session.feed_now(),
        Err(OrchestrationError::Component(ComponentError::Actuator(_)))
    ));
    assert_eq!(
        messages(session.log()),
        vec!["Error: Command failed: HTTP 500: oops"]
    );
    assert_eq!(session.stats().unwrap().manual_feeds, 0);
}

#[test]
fn test_run_once_records_outcome() {
    let (cycle, _) = cycle_with(Ok(BowlVerdict::Sufficient));
    let session = fast_session(cycle, Duration::from_secs(60));

    assert_eq!(session.run_once().unwrap(), CycleOutcome::NoNeed);
    assert_eq!(session.stats().unwrap().no_need, 1);
    assert!(!session.is_running().unwrap());
}

#[test]
fn test_session_drop_stops_loop() {
    let camera = MockCamera::working();
    let reads = camera.reads.clone();
    let cycle = CheckCycle::new(
        camera,
        MockClassifier::answering(Ok(BowlVerdict::Sufficient)),
        MockFeeder::default(),
    );
    let session = fast_session(cycle, Duration::from_millis(10));

    session.start().unwrap();
    assert!(wait_for(|| reads.load(Ordering::SeqCst) >= 2));
    drop(session);

    let after_drop = reads.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(100));
    assert_eq!(reads.load(Ordering::SeqCst), after_drop);
}
