//! The reservation loop: search, filter, claim, decide.

use std::time::Duration;

use futures::future::join_all;
use tokio::time::{Instant, timeout};
use tracing::{debug, error, info, warn};

use super::cancel::CancelToken;
use super::client::{AuthError, ReservationClient, SearchFailure};
use super::clock::{Clock, TokioClock};
use super::config::LoopConfig;
use super::filter::pick_candidate;
use super::gate::ClaimGate;
use super::status::{LoopState, StatusReporter};
use super::termination::Termination;
use crate::config::ConfigError;
use crate::domain::{Itinerary, ReservationResult, SearchCriterion, SeatClass, TransientReason};
use crate::notify::Notifier;

/// Failed re-logins in a row after which the run gives up.
const MAX_FAILED_LOGINS: u32 = 2;

/// Errors that prevent a run from starting.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("initial login failed: {0}")]
    Login(#[from] AuthError),

    /// A client or notifier could not be constructed
    #[error("setup failed: {0}")]
    Setup(String),
}

/// Drives one run against one exclusively owned client.
pub struct ReservationLoop<C, N, K = TokioClock> {
    client: C,
    notifier: N,
    clock: K,
    config: LoopConfig,
    cancel: CancelToken,
    status: StatusReporter,
    gate: ClaimGate,
}

/// Bookkeeping that lives for one run.
struct RunState {
    attempts: u32,
    /// Errored iterations in a row; drives backoff.
    consecutive_errors: u32,
    failed_logins: u32,
    session_started: Instant,
    iteration_errored: bool,
}

enum Step {
    Continue,
    Stop(Termination),
}

impl<C, N> ReservationLoop<C, N, TokioClock>
where
    C: ReservationClient,
    N: Notifier,
{
    /// A loop on the tokio clock, never cancelled, claiming through the
    /// process-wide gate.
    pub fn new(client: C, notifier: N, config: LoopConfig) -> Self {
        Self {
            client,
            notifier,
            clock: TokioClock,
            config,
            cancel: CancelToken::never(),
            status: StatusReporter::detached(),
            gate: ClaimGate::process(),
        }
    }
}

impl<C, N, K> ReservationLoop<C, N, K>
where
    C: ReservationClient,
    N: Notifier,
    K: Clock,
{
    pub fn with_clock<K2: Clock>(self, clock: K2) -> ReservationLoop<C, N, K2> {
        ReservationLoop {
            client: self.client,
            notifier: self.notifier,
            clock,
            config: self.config,
            cancel: self.cancel,
            status: self.status,
            gate: self.gate,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_status(mut self, status: StatusReporter) -> Self {
        self.status = status;
        self
    }

    pub fn with_gate(mut self, gate: ClaimGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run until a seat is held, a fatal rejection, the attempt cap, or
    /// cancellation.
    ///
    /// Criteria are tried in order each iteration; the first one to yield a
    /// held seat ends the run.
    pub async fn run(&mut self, criteria: &[SearchCriterion]) -> Result<Termination, RunError> {
        if criteria.is_empty() {
            return Err(ConfigError::EmptyCriteria.into());
        }

        info!(count = criteria.len(), "watching for cancelled tickets");
        for (index, criterion) in criteria.iter().enumerate() {
            info!(index = index + 1, "{criterion}");
        }
        self.notify(&started_message(criteria)).await;

        let termination = self.drive(criteria).await;
        self.status.finish(&termination);

        match &termination {
            Termination::Success(reference) => {
                info!(%reference, "{termination}");
            }
            Termination::Fatal(reason) => {
                error!(%reason, "{termination}");
                self.notify(&format!("Korail watch stopped: {reason}")).await;
            }
            Termination::Exhausted { attempts } => {
                warn!(attempts, "{termination}");
            }
            Termination::Cancelled => {
                info!("{termination}");
            }
        }

        Ok(termination)
    }

    async fn drive(&mut self, criteria: &[SearchCriterion]) -> Termination {
        let mut state = RunState {
            attempts: 0,
            consecutive_errors: 0,
            failed_logins: 0,
            session_started: self.clock.now(),
            iteration_errored: false,
        };

        loop {
            if self.cancel.is_cancelled() {
                return Termination::Cancelled;
            }

            state.attempts += 1;
            state.iteration_errored = false;
            let attempt = state.attempts;
            self.status.update(|s| {
                s.state = LoopState::Polling;
                s.attempt = attempt;
            });
            debug!(attempt, "polling");

            if let Some(refresh) = self.config.session_refresh
                && self.clock.now().duration_since(state.session_started) >= refresh
            {
                info!("refreshing session");
                if let Err(termination) = self.relogin(&mut state).await {
                    return termination;
                }
            }

            if let Step::Stop(termination) = self.iterate(criteria, &mut state).await {
                return termination;
            }

            if let Some(max) = self.config.max_attempts
                && state.attempts >= max
            {
                return Termination::Exhausted {
                    attempts: state.attempts,
                };
            }

            let delay = if state.iteration_errored {
                state.consecutive_errors += 1;
                self.status.set_state(LoopState::BackingOff);
                self.config.backoff_delay(state.consecutive_errors)
            } else {
                state.consecutive_errors = 0;
                self.config.poll_interval
            };
            debug!(delay_ms = delay.as_millis() as u64, "sleeping");

            if self.sleep_or_cancel(delay).await {
                return Termination::Cancelled;
            }
        }
    }

    /// One pass over every criterion.
    async fn iterate(&mut self, criteria: &[SearchCriterion], state: &mut RunState) -> Step {
        let mut prefetched = if self.config.parallel_search {
            if self.cancel.is_cancelled() {
                return Step::Stop(Termination::Cancelled);
            }
            let searches = criteria.iter().map(|criterion| self.search(criterion));
            Some(join_all(searches).await.into_iter())
        } else {
            None
        };

        for criterion in criteria {
            let searched = match prefetched.as_mut().and_then(Iterator::next) {
                Some(searched) => searched,
                None => {
                    if self.cancel.is_cancelled() {
                        return Step::Stop(Termination::Cancelled);
                    }
                    self.search(criterion).await
                }
            };

            let itineraries = match searched {
                Ok(itineraries) => itineraries,
                Err(SearchFailure::Transient(reason)) => {
                    warn!(%criterion, %reason, "search failed");
                    self.record_error(state, format!("search: {reason}"));
                    if reason.needs_reauthentication() {
                        if let Err(termination) = self.relogin(state).await {
                            return Step::Stop(termination);
                        }
                        return Step::Continue;
                    }
                    continue;
                }
                Err(SearchFailure::Fatal(reason)) => {
                    return Step::Stop(Termination::Fatal(reason));
                }
            };

            let Some(candidate) = pick_candidate(criterion, &itineraries) else {
                debug!(%criterion, found = itineraries.len(), "no matching seats");
                continue;
            };

            let summary = candidate.itinerary.to_string();
            info!(%criterion, train = %summary, seat = ?candidate.seat, "claiming");
            self.status.set_state(LoopState::Claiming);

            let result = self.claim(candidate.itinerary, candidate.seat).await;
            self.status.set_state(LoopState::Polling);

            match result {
                ReservationResult::Success(reference) => {
                    info!(%reference, train = %summary, "reserved");
                    info!("complete payment in the Korail app or website before the hold expires");
                    self.notify(&success_message(&summary, &reference.to_string()))
                        .await;
                    return Step::Stop(Termination::Success(reference));
                }
                ReservationResult::NoSeatAvailable => {
                    debug!(train = %summary, "seat taken before claim");
                }
                ReservationResult::TransientFailure(reason) => {
                    warn!(train = %summary, %reason, "claim failed");
                    self.record_error(state, format!("reserve: {reason}"));
                    if reason.needs_reauthentication() {
                        if let Err(termination) = self.relogin(state).await {
                            return Step::Stop(termination);
                        }
                        return Step::Continue;
                    }
                }
                ReservationResult::FatalFailure(reason) => {
                    return Step::Stop(Termination::Fatal(reason));
                }
            }
        }

        Step::Continue
    }

    async fn search(&self, criterion: &SearchCriterion) -> Result<Vec<Itinerary>, SearchFailure> {
        match timeout(self.config.request_timeout, self.client.search(criterion)).await {
            Ok(result) => result,
            Err(_) => Err(SearchFailure::Transient(TransientReason::Timeout)),
        }
    }

    /// Reserve under the claim gate. A claim in flight always completes.
    async fn claim(&self, itinerary: &Itinerary, seat: SeatClass) -> ReservationResult {
        let _permit = self.gate.enter().await;
        match timeout(self.config.request_timeout, self.client.reserve(itinerary, seat)).await {
            Ok(result) => result,
            Err(_) => ReservationResult::TransientFailure(TransientReason::Timeout),
        }
    }

    /// Log in again. Errors with the terminal outcome if the run must stop.
    async fn relogin(&mut self, state: &mut RunState) -> Result<(), Termination> {
        let outcome = match timeout(self.config.request_timeout, self.client.reauthenticate()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AuthError::Unavailable("login timed out".to_string())),
        };

        match outcome {
            Ok(()) => {
                info!("session renewed");
                state.failed_logins = 0;
                state.session_started = self.clock.now();
                Ok(())
            }
            Err(err @ AuthError::Rejected(_)) => Err(Termination::Fatal(err.to_string())),
            Err(err) => {
                state.failed_logins += 1;
                if state.failed_logins >= MAX_FAILED_LOGINS {
                    return Err(Termination::Fatal(format!(
                        "{err} ({} attempts in a row)",
                        state.failed_logins
                    )));
                }
                warn!(error = %err, "re-login failed");
                self.record_error(state, err.to_string());
                Ok(())
            }
        }
    }

    fn record_error(&self, state: &mut RunState, message: String) {
        state.iteration_errored = true;
        self.status.update(|s| {
            s.errors += 1;
            s.last_error = Some(message);
        });
    }

    async fn notify(&self, text: &str) {
        match timeout(self.config.request_timeout, self.notifier.notify(text)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "notification failed"),
            Err(_) => warn!("notification timed out"),
        }
    }

    /// Sleep for `delay`. Returns true if cancelled first.
    async fn sleep_or_cancel(&self, delay: Duration) -> bool {
        let mut cancel = self.cancel.clone();
        tokio::select! {
            _ = self.clock.sleep(delay) => false,
            _ = cancel.cancelled() => true,
        }
    }
}

fn started_message(criteria: &[SearchCriterion]) -> String {
    let mut text = format!("Korail watch started ({} criteria)", criteria.len());
    for criterion in criteria {
        text.push_str("\n- ");
        text.push_str(&criterion.to_string());
    }
    text
}

fn success_message(summary: &str, reference: &str) -> String {
    format!(
        "Reserved {summary}\nreservation number: {reference}\nPay in the Korail app before the hold expires."
    )
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
