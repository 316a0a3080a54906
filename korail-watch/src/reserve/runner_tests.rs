//! Tests for the reservation loop, driven by a scripted client.

use super::*;
use crate::domain::{
    ConfirmationRef, HourWindow, SeatCategory, StationName, TrainCategory, TrainClass, TrainRef,
};
use crate::notify::NotifyError;
use crate::reserve::cancel::{CancelHandle, cancel_pair};
use chrono::{NaiveDate, NaiveTime};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
}

fn station(name: &str) -> StationName {
    StationName::parse(name).unwrap()
}

/// `dep`→`arr`, earliest 07:00, hours 07–10, KTX, general seats.
fn criterion(dep: &str, arr: &str) -> SearchCriterion {
    SearchCriterion::new(
        station(dep),
        station(arr),
        date(),
        NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
    )
    .with_hours(HourWindow::new(7, 10).unwrap())
    .with_train_category(TrainCategory::ExpressOnly)
    .with_seat_category(SeatCategory::Standard)
}

fn train(dep: &str, no: &str, hh: u32, mm: u32, seats: &[SeatClass]) -> Itinerary {
    Itinerary {
        train_name: "KTX".to_string(),
        train_class: TrainClass::Express,
        departure_station: station(dep),
        arrival_station: station("부산"),
        departure: date().and_hms_opt(hh, mm, 0).unwrap(),
        arrival: date().and_hms_opt(hh + 3, mm, 0).unwrap(),
        available_seats: seats.iter().copied().collect(),
        train_ref: TrainRef {
            train_no: no.to_string(),
            ..TrainRef::default()
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Search(String),
    Reserve(String, SeatClass),
    Reauthenticate,
}

/// Pop the next scripted value; the last one repeats forever.
fn next_scripted<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

type SearchScript = VecDeque<Result<Vec<Itinerary>, SearchFailure>>;

/// Client that replays scripted responses and records every call.
#[derive(Default)]
struct ScriptedClient {
    calls: Arc<Mutex<Vec<Call>>>,
    /// Keyed by departure station.
    searches: Mutex<HashMap<String, SearchScript>>,
    reserves: Mutex<VecDeque<ReservationResult>>,
    logins: Mutex<VecDeque<Result<(), AuthError>>>,
    hang_search: bool,
    cancel_on_reserve: Option<CancelHandle>,
}

impl ScriptedClient {
    fn new() -> Self {
        Self::default()
    }

    fn on_search(
        self,
        dep: &str,
        results: impl IntoIterator<Item = Result<Vec<Itinerary>, SearchFailure>>,
    ) -> Self {
        self.searches
            .lock()
            .unwrap()
            .insert(dep.to_string(), results.into_iter().collect());
        self
    }

    fn on_reserve(self, results: impl IntoIterator<Item = ReservationResult>) -> Self {
        self.reserves.lock().unwrap().extend(results);
        self
    }

    fn on_login(self, results: impl IntoIterator<Item = Result<(), AuthError>>) -> Self {
        self.logins.lock().unwrap().extend(results);
        self
    }

    fn calls(&self) -> Arc<Mutex<Vec<Call>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ReservationClient for ScriptedClient {
    async fn search(&self, criterion: &SearchCriterion) -> Result<Vec<Itinerary>, SearchFailure> {
        let dep = criterion.departure_station.as_str().to_string();
        self.record(Call::Search(dep.clone()));
        if self.hang_search {
            std::future::pending::<()>().await;
        }
        let scripted = self
            .searches
            .lock()
            .unwrap()
            .get_mut(&dep)
            .and_then(next_scripted);
        scripted.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn reserve(&self, itinerary: &Itinerary, seat: SeatClass) -> ReservationResult {
        self.record(Call::Reserve(itinerary.train_ref.train_no.clone(), seat));
        if let Some(handle) = &self.cancel_on_reserve {
            handle.cancel();
        }
        let scripted = next_scripted(&mut self.reserves.lock().unwrap());
        scripted.unwrap_or(ReservationResult::NoSeatAvailable)
    }

    async fn reauthenticate(&mut self) -> Result<(), AuthError> {
        self.record(Call::Reauthenticate);
        let scripted = next_scripted(&mut self.logins.lock().unwrap());
        scripted.unwrap_or(Ok(()))
    }
}

/// Notifier that keeps every message, optionally failing each delivery.
#[derive(Clone, Default)]
struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(NotifyError::Rejected {
                status: 500,
                message: "down".to_string(),
            });
        }
        Ok(())
    }
}

/// Clock whose sleeps return immediately and advance virtual time.
#[derive(Clone)]
struct ManualClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ManualClock {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        *self.elapsed.lock().unwrap() += duration;
        tokio::task::yield_now().await;
    }
}

fn test_loop(
    client: ScriptedClient,
    notifier: RecordingNotifier,
    config: LoopConfig,
    clock: ManualClock,
) -> ReservationLoop<ScriptedClient, RecordingNotifier, ManualClock> {
    ReservationLoop::new(client, notifier, config)
        .with_clock(clock)
        .with_gate(ClaimGate::new())
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

#[tokio::test]
async fn empty_criteria_is_config_error() {
    let mut lp = test_loop(
        ScriptedClient::new(),
        RecordingNotifier::default(),
        LoopConfig::default(),
        ManualClock::new(),
    );

    let result = lp.run(&[]).await;

    assert!(matches!(
        result,
        Err(RunError::Config(ConfigError::EmptyCriteria))
    ));
}

#[tokio::test]
async fn claims_train_after_earliest_time() {
    let client = ScriptedClient::new()
        .on_search(
            "서울",
            [Ok(vec![
                train("서울", "001", 6, 50, &[SeatClass::Standard]),
                train("서울", "011", 8, 10, &[SeatClass::Standard]),
            ])],
        )
        .on_reserve([ReservationResult::Success(ConfirmationRef::new("R-011"))]);
    let calls = client.calls();
    let mut lp = test_loop(
        client,
        RecordingNotifier::default(),
        LoopConfig::default(),
        ManualClock::new(),
    );

    let termination = lp.run(&[criterion("서울", "부산")]).await.unwrap();

    assert_eq!(termination, Termination::Success(ConfirmationRef::new("R-011")));
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::Search("서울".into()),
            Call::Reserve("011".into(), SeatClass::Standard),
        ]
    );
}

#[tokio::test]
async fn wrong_seat_class_sleeps_and_retries() {
    let client = ScriptedClient::new().on_search(
        "서울",
        [Ok(vec![train("서울", "011", 8, 10, &[SeatClass::Premium])])],
    );
    let calls = client.calls();
    let clock = ManualClock::new();
    let config = LoopConfig::default().with_max_attempts(Some(2));
    let mut lp = test_loop(client, RecordingNotifier::default(), config, clock.clone());

    let termination = lp.run(&[criterion("서울", "부산")]).await.unwrap();

    assert_eq!(termination, Termination::Exhausted { attempts: 2 });
    assert_eq!(
        *calls.lock().unwrap(),
        vec![Call::Search("서울".into()), Call::Search("서울".into())]
    );
    assert_eq!(clock.sleeps(), vec![secs(5)]);
}

#[tokio::test]
async fn lost_race_moves_to_next_criterion() {
    let client = ScriptedClient::new()
        .on_search("서울", [Ok(vec![train("서울", "011", 8, 10, &[SeatClass::Standard])])])
        .on_search("용산", [Ok(vec![train("용산", "501", 9, 0, &[SeatClass::Standard])])])
        .on_reserve([
            ReservationResult::NoSeatAvailable,
            ReservationResult::Success(ConfirmationRef::new("R-501")),
        ]);
    let calls = client.calls();
    let clock = ManualClock::new();
    let mut lp = test_loop(
        client,
        RecordingNotifier::default(),
        LoopConfig::default(),
        clock.clone(),
    );

    let termination = lp
        .run(&[criterion("서울", "부산"), criterion("용산", "광주송정")])
        .await
        .unwrap();

    assert_eq!(termination, Termination::Success(ConfirmationRef::new("R-501")));
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::Search("서울".into()),
            Call::Reserve("011".into(), SeatClass::Standard),
            Call::Search("용산".into()),
            Call::Reserve("501".into(), SeatClass::Standard),
        ]
    );
    assert!(clock.sleeps().is_empty(), "both claims happen in one iteration");
}

#[tokio::test]
async fn success_notifies_reference() {
    let client = ScriptedClient::new()
        .on_search("서울", [Ok(vec![train("서울", "011", 8, 10, &[SeatClass::Standard])])])
        .on_reserve([ReservationResult::Success(ConfirmationRef::new("ABC123"))]);
    let notifier = RecordingNotifier::default();
    let messages = Arc::clone(&notifier.messages);
    let mut lp = test_loop(client, notifier, LoopConfig::default(), ManualClock::new());

    let termination = lp.run(&[criterion("서울", "부산")]).await.unwrap();

    assert_eq!(termination, Termination::Success(ConfirmationRef::new("ABC123")));
    let messages = messages.lock().unwrap();
    assert_eq!(messages.len(), 2, "start and success: {messages:?}");
    assert!(messages[0].contains("started"));
    assert!(messages[1].contains("ABC123"));
    assert!(messages[1].contains("[KTX 011]"));
}

#[tokio::test]
async fn first_listed_criterion_wins() {
    let client = ScriptedClient::new()
        .on_search("서울", [Ok(vec![train("서울", "011", 8, 10, &[SeatClass::Standard])])])
        .on_search("용산", [Ok(vec![train("용산", "501", 7, 0, &[SeatClass::Standard])])])
        .on_reserve([ReservationResult::Success(ConfirmationRef::new("R"))]);
    let calls = client.calls();
    let mut lp = test_loop(
        client,
        RecordingNotifier::default(),
        LoopConfig::default(),
        ManualClock::new(),
    );

    lp.run(&[criterion("서울", "부산"), criterion("용산", "광주송정")])
        .await
        .unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::Search("서울".into()),
            Call::Reserve("011".into(), SeatClass::Standard),
        ]
    );
}

#[tokio::test]
async fn fatal_reserve_halts_immediately() {
    let client = ScriptedClient::new()
        .on_search("서울", [Ok(vec![train("서울", "011", 8, 10, &[SeatClass::Standard])])])
        .on_search("용산", [Ok(vec![train("용산", "501", 9, 0, &[SeatClass::Standard])])])
        .on_reserve([ReservationResult::FatalFailure("account blocked".into())]);
    let calls = client.calls();
    let notifier = RecordingNotifier::default();
    let messages = Arc::clone(&notifier.messages);
    let clock = ManualClock::new();
    let mut lp = test_loop(client, notifier, LoopConfig::default(), clock.clone());

    let termination = lp
        .run(&[criterion("서울", "부산"), criterion("용산", "광주송정")])
        .await
        .unwrap();

    assert_eq!(termination, Termination::Fatal("account blocked".into()));
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::Search("서울".into()),
            Call::Reserve("011".into(), SeatClass::Standard),
        ]
    );
    assert!(clock.sleeps().is_empty());
    let messages = messages.lock().unwrap();
    assert!(messages.last().unwrap().contains("account blocked"));
}

#[tokio::test]
async fn fatal_search_halts_immediately() {
    let client = ScriptedClient::new().on_search(
        "서울",
        [Err(SearchFailure::Fatal("invalid station".into()))],
    );
    let calls = client.calls();
    let mut lp = test_loop(
        client,
        RecordingNotifier::default(),
        LoopConfig::default(),
        ManualClock::new(),
    );

    let termination = lp
        .run(&[criterion("서울", "부산"), criterion("용산", "광주송정")])
        .await
        .unwrap();

    assert_eq!(termination, Termination::Fatal("invalid station".into()));
    assert_eq!(*calls.lock().unwrap(), vec![Call::Search("서울".into())]);
}

#[tokio::test]
async fn exhausted_after_exactly_max_attempts() {
    let client = ScriptedClient::new()
        .on_search("서울", [Ok(vec![train("서울", "011", 8, 10, &[SeatClass::Standard])])])
        .on_reserve([ReservationResult::NoSeatAvailable]);
    let calls = client.calls();
    let clock = ManualClock::new();
    let config = LoopConfig::default().with_max_attempts(Some(3));
    let mut lp = test_loop(client, RecordingNotifier::default(), config, clock.clone());

    let termination = lp.run(&[criterion("서울", "부산")]).await.unwrap();

    assert_eq!(termination, Termination::Exhausted { attempts: 3 });
    let calls = calls.lock().unwrap();
    let searches = calls.iter().filter(|c| matches!(c, Call::Search(_))).count();
    let reserves = calls.iter().filter(|c| matches!(c, Call::Reserve(..))).count();
    assert_eq!(searches, 3);
    assert_eq!(reserves, 3);
    assert_eq!(clock.sleeps(), vec![secs(5), secs(5)]);
}

#[tokio::test]
async fn cancelled_before_first_search() {
    let client = ScriptedClient::new();
    let calls = client.calls();
    let (handle, token) = cancel_pair();
    let (reporter, status) = StatusReporter::new();
    let mut lp = test_loop(
        client,
        RecordingNotifier::default(),
        LoopConfig::default(),
        ManualClock::new(),
    )
    .with_cancel(token)
    .with_status(reporter);

    handle.cancel();
    let termination = lp.run(&[criterion("서울", "부산")]).await.unwrap();

    assert_eq!(termination, Termination::Cancelled);
    assert!(calls.lock().unwrap().is_empty());
    assert_eq!(status.borrow().state, LoopState::Cancelled);
}

#[tokio::test]
async fn claim_in_flight_completes_despite_cancel() {
    let (handle, token) = cancel_pair();
    let client = ScriptedClient {
        cancel_on_reserve: Some(handle),
        ..ScriptedClient::new()
    }
    .on_search("서울", [Ok(vec![train("서울", "011", 8, 10, &[SeatClass::Standard])])])
    .on_reserve([ReservationResult::Success(ConfirmationRef::new("HELD"))]);
    let mut lp = test_loop(
        client,
        RecordingNotifier::default(),
        LoopConfig::default(),
        ManualClock::new(),
    )
    .with_cancel(token);

    let termination = lp.run(&[criterion("서울", "부산")]).await.unwrap();

    assert_eq!(termination, Termination::Success(ConfirmationRef::new("HELD")));
}

#[tokio::test]
async fn cancel_after_lost_claim_stops_before_next_search() {
    let (handle, token) = cancel_pair();
    let client = ScriptedClient {
        cancel_on_reserve: Some(handle),
        ..ScriptedClient::new()
    }
    .on_search("서울", [Ok(vec![train("서울", "011", 8, 10, &[SeatClass::Standard])])])
    .on_reserve([ReservationResult::NoSeatAvailable]);
    let calls = client.calls();
    let mut lp = test_loop(
        client,
        RecordingNotifier::default(),
        LoopConfig::default(),
        ManualClock::new(),
    )
    .with_cancel(token);

    let termination = lp
        .run(&[criterion("서울", "부산"), criterion("용산", "광주송정")])
        .await
        .unwrap();

    assert_eq!(termination, Termination::Cancelled);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::Search("서울".into()),
            Call::Reserve("011".into(), SeatClass::Standard),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_poll_sleep() {
    let client = ScriptedClient::new();
    let calls = client.calls();
    let (handle, token) = cancel_pair();
    let config = LoopConfig::default().with_poll_interval(secs(60));
    let mut lp = ReservationLoop::new(client, RecordingNotifier::default(), config)
        .with_gate(ClaimGate::new())
        .with_cancel(token);

    let run = tokio::spawn(async move { lp.run(&[criterion("서울", "부산")]).await });
    tokio::time::sleep(secs(90)).await;
    handle.cancel();

    let termination = run.await.unwrap().unwrap();
    assert_eq!(termination, Termination::Cancelled);
    // Searches at t=0 and t=60; cancelled during the second sleep.
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn transient_errors_back_off_exponentially() {
    let network = || -> Result<Vec<Itinerary>, SearchFailure> {
        Err(SearchFailure::Transient(TransientReason::Network(
            "reset".into(),
        )))
    };
    let client = ScriptedClient::new().on_search(
        "서울",
        [network(), network(), network(), Ok(Vec::new())],
    );
    let clock = ManualClock::new();
    let (reporter, status) = StatusReporter::new();
    let config = LoopConfig::default().with_max_attempts(Some(5));
    let mut lp =
        test_loop(client, RecordingNotifier::default(), config, clock.clone()).with_status(reporter);

    let termination = lp.run(&[criterion("서울", "부산")]).await.unwrap();

    assert_eq!(termination, Termination::Exhausted { attempts: 5 });
    assert_eq!(clock.sleeps(), vec![secs(10), secs(20), secs(40), secs(5)]);
    let status = status.borrow();
    assert_eq!(status.errors, 3);
    assert_eq!(status.attempt, 5);
    assert!(status.last_error.as_deref().unwrap().contains("reset"));
}

#[tokio::test]
async fn transient_search_failure_tries_next_criterion() {
    let client = ScriptedClient::new()
        .on_search("서울", [Err(SearchFailure::Transient(TransientReason::RateLimited))])
        .on_search("용산", [Ok(vec![train("용산", "501", 9, 0, &[SeatClass::Standard])])])
        .on_reserve([ReservationResult::Success(ConfirmationRef::new("R-501"))]);
    let mut lp = test_loop(
        client,
        RecordingNotifier::default(),
        LoopConfig::default(),
        ManualClock::new(),
    );

    let termination = lp
        .run(&[criterion("서울", "부산"), criterion("용산", "광주송정")])
        .await
        .unwrap();

    assert_eq!(termination, Termination::Success(ConfirmationRef::new("R-501")));
}

#[tokio::test]
async fn expired_session_relogs_and_abandons_iteration() {
    let client = ScriptedClient::new()
        .on_search(
            "서울",
            [
                Err(SearchFailure::Transient(TransientReason::SessionExpired)),
                Ok(Vec::new()),
            ],
        )
        .on_search("용산", [Ok(vec![train("용산", "501", 9, 0, &[SeatClass::Standard])])])
        .on_reserve([ReservationResult::Success(ConfirmationRef::new("R-501"))]);
    let calls = client.calls();
    let clock = ManualClock::new();
    let mut lp = test_loop(
        client,
        RecordingNotifier::default(),
        LoopConfig::default(),
        clock.clone(),
    );

    let termination = lp
        .run(&[criterion("서울", "부산"), criterion("용산", "광주송정")])
        .await
        .unwrap();

    assert!(termination.is_success());
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::Search("서울".into()),
            Call::Reauthenticate,
            Call::Search("서울".into()),
            Call::Search("용산".into()),
            Call::Reserve("501".into(), SeatClass::Standard),
        ]
    );
    assert_eq!(clock.sleeps(), vec![secs(10)]);
}

#[tokio::test]
async fn expired_session_on_claim_relogs() {
    let client = ScriptedClient::new()
        .on_search("서울", [Ok(vec![train("서울", "011", 8, 10, &[SeatClass::Standard])])])
        .on_reserve([
            ReservationResult::TransientFailure(TransientReason::SessionExpired),
            ReservationResult::Success(ConfirmationRef::new("R-011")),
        ]);
    let calls = client.calls();
    let mut lp = test_loop(
        client,
        RecordingNotifier::default(),
        LoopConfig::default(),
        ManualClock::new(),
    );

    let termination = lp.run(&[criterion("서울", "부산")]).await.unwrap();

    assert!(termination.is_success());
    let calls = calls.lock().unwrap();
    assert_eq!(calls[2], Call::Reauthenticate);
    assert_eq!(calls.len(), 5);
}

#[tokio::test]
async fn rejected_relogin_is_fatal() {
    let client = ScriptedClient::new()
        .on_search(
            "서울",
            [Err(SearchFailure::Transient(TransientReason::SessionExpired))],
        )
        .on_login([Err(AuthError::Rejected("wrong password".into()))]);
    let notifier = RecordingNotifier::default();
    let messages = Arc::clone(&notifier.messages);
    let mut lp = test_loop(client, notifier, LoopConfig::default(), ManualClock::new());

    let termination = lp.run(&[criterion("서울", "부산")]).await.unwrap();

    let Termination::Fatal(reason) = termination else {
        panic!("expected fatal, got {termination:?}");
    };
    assert!(reason.contains("wrong password"));
    assert!(messages.lock().unwrap().last().unwrap().contains("wrong password"));
}

#[tokio::test]
async fn second_failed_relogin_is_fatal() {
    let client = ScriptedClient::new()
        .on_search(
            "서울",
            [Err(SearchFailure::Transient(TransientReason::SessionExpired))],
        )
        .on_login([Err(AuthError::Unavailable("connection refused".into()))]);
    let calls = client.calls();
    let clock = ManualClock::new();
    let mut lp = test_loop(
        client,
        RecordingNotifier::default(),
        LoopConfig::default(),
        clock.clone(),
    );

    let termination = lp.run(&[criterion("서울", "부산")]).await.unwrap();

    assert!(matches!(termination, Termination::Fatal(_)));
    let logins = calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| **c == Call::Reauthenticate)
        .count();
    assert_eq!(logins, 2);
    assert_eq!(clock.sleeps(), vec![secs(10)]);
}

#[tokio::test]
async fn session_refreshed_when_old() {
    let client = ScriptedClient::new();
    let calls = client.calls();
    let config = LoopConfig::default()
        .with_session_refresh(Some(secs(8)))
        .with_max_attempts(Some(3));
    let mut lp = test_loop(client, RecordingNotifier::default(), config, ManualClock::new());

    lp.run(&[criterion("서울", "부산")]).await.unwrap();

    // t=0 and t=5 are fresh; t=10 is past the refresh age.
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::Search("서울".into()),
            Call::Search("서울".into()),
            Call::Reauthenticate,
            Call::Search("서울".into()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn hung_search_times_out_as_transient() {
    let client = ScriptedClient {
        hang_search: true,
        ..ScriptedClient::new()
    };
    let (reporter, status) = StatusReporter::new();
    let config = LoopConfig::default()
        .with_request_timeout(secs(1))
        .with_max_attempts(Some(1));
    let mut lp = ReservationLoop::new(client, RecordingNotifier::default(), config)
        .with_gate(ClaimGate::new())
        .with_status(reporter);

    let termination = lp.run(&[criterion("서울", "부산")]).await.unwrap();

    assert_eq!(termination, Termination::Exhausted { attempts: 1 });
    let status = status.borrow();
    assert_eq!(status.errors, 1);
    assert!(status.last_error.as_deref().unwrap().contains("timed out"));
}

#[tokio::test]
async fn failing_notifier_does_not_abort() {
    let client = ScriptedClient::new()
        .on_search("서울", [Ok(vec![train("서울", "011", 8, 10, &[SeatClass::Standard])])])
        .on_reserve([ReservationResult::Success(ConfirmationRef::new("R-011"))]);
    let notifier = RecordingNotifier {
        fail: true,
        ..RecordingNotifier::default()
    };
    let messages = Arc::clone(&notifier.messages);
    let mut lp = test_loop(client, notifier, LoopConfig::default(), ManualClock::new());

    let termination = lp.run(&[criterion("서울", "부산")]).await.unwrap();

    assert!(termination.is_success());
    assert_eq!(messages.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn parallel_search_queries_all_before_claiming() {
    let client = ScriptedClient::new()
        .on_search("서울", [Ok(vec![train("서울", "011", 8, 10, &[SeatClass::Standard])])])
        .on_search("용산", [Ok(vec![train("용산", "501", 9, 0, &[SeatClass::Standard])])])
        .on_reserve([ReservationResult::Success(ConfirmationRef::new("R-011"))]);
    let calls = client.calls();
    let config = LoopConfig::default().with_parallel_search(true);
    let mut lp = test_loop(client, RecordingNotifier::default(), config, ManualClock::new());

    let termination = lp
        .run(&[criterion("서울", "부산"), criterion("용산", "광주송정")])
        .await
        .unwrap();

    assert_eq!(termination, Termination::Success(ConfirmationRef::new("R-011")));
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::Search("서울".into()),
            Call::Search("용산".into()),
            Call::Reserve("011".into(), SeatClass::Standard),
        ]
    );
}

#[tokio::test]
async fn status_tracks_success() {
    let client = ScriptedClient::new()
        .on_search("서울", [Ok(vec![train("서울", "011", 8, 10, &[SeatClass::Standard])])])
        .on_reserve([ReservationResult::Success(ConfirmationRef::new("R-011"))]);
    let (reporter, status) = StatusReporter::new();
    let mut lp = test_loop(
        client,
        RecordingNotifier::default(),
        LoopConfig::default(),
        ManualClock::new(),
    )
    .with_status(reporter);

    lp.run(&[criterion("서울", "부산")]).await.unwrap();

    let status = status.borrow();
    assert_eq!(status.state, LoopState::Succeeded);
    assert_eq!(status.attempt, 1);
    assert_eq!(
        status.termination,
        Some(Termination::Success(ConfirmationRef::new("R-011")))
    );
}
