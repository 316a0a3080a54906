//! Application state for the web layer.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::{AccountFile, ConfigError};
use crate::criteria::CriteriaFile;
use crate::domain::SearchCriterion;
use crate::korail::KorailConfig;
use crate::notify::Notifier;
use crate::reserve::{
    CancelHandle, LoopConfig, LoopState, LoopStatus, ReservationClient, ReservationLoop, RunError,
    StatusReporter, cancel_pair,
};
use crate::telemetry::LogBuffer;

/// Errors from starting or stopping a run.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("a run is already in progress")]
    AlreadyRunning,

    #[error("no run in progress")]
    NotRunning,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

struct ActiveRun {
    cancel: CancelHandle,
    status: watch::Receiver<LoopStatus>,
    task: JoinHandle<()>,
}

/// Snapshot for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RunStatus {
    pub running: bool,
    #[serde(flatten)]
    pub loop_status: LoopStatus,
}

/// Owns the background run. At most one run exists at a time.
#[derive(Clone, Default)]
pub struct Supervisor {
    active: Arc<Mutex<Option<ActiveRun>>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|run| !run.task.is_finished())
    }

    /// Start a run in the background.
    ///
    /// `connect` opens the session; if it fails the run ends as failed with
    /// the error as its last error.
    pub fn start<C, N, F>(
        &self,
        criteria: Vec<SearchCriterion>,
        config: LoopConfig,
        connect: F,
    ) -> Result<(), SupervisorError>
    where
        C: ReservationClient + Send + Sync + 'static,
        N: Notifier + Send + Sync + 'static,
        F: Future<Output = Result<(C, N), RunError>> + Send + 'static,
    {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.as_ref().is_some_and(|run| !run.task.is_finished()) {
            return Err(SupervisorError::AlreadyRunning);
        }
        if criteria.is_empty() {
            return Err(ConfigError::EmptyCriteria.into());
        }

        let (cancel, token) = cancel_pair();
        let (reporter, status) = StatusReporter::new();

        let task = tokio::spawn(async move {
            let (client, notifier) = match connect.await {
                Ok(pair) => pair,
                Err(err) => {
                    error!(error = %err, "run could not start");
                    reporter.update(|s| {
                        s.state = LoopState::Failed;
                        s.last_error = Some(err.to_string());
                    });
                    return;
                }
            };

            let mut run = ReservationLoop::new(client, notifier, config)
                .with_cancel(token)
                .with_status(reporter);
            match run.run(&criteria).await {
                Ok(termination) => info!(exit_code = termination.exit_code(), "run finished"),
                Err(err) => error!(error = %err, "run failed"),
            }
        });

        *active = Some(ActiveRun {
            cancel,
            status,
            task,
        });
        Ok(())
    }

    /// Ask the current run to stop at its next checkpoint.
    pub fn stop(&self) -> Result<(), SupervisorError> {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        match active.as_ref() {
            Some(run) if !run.task.is_finished() => {
                run.cancel.cancel();
                Ok(())
            }
            _ => Err(SupervisorError::NotRunning),
        }
    }

    /// Status of the current or most recent run.
    pub fn status(&self) -> RunStatus {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        match active.as_ref() {
            Some(run) => RunStatus {
                running: !run.task.is_finished(),
                loop_status: run.status.borrow().clone(),
            },
            None => RunStatus {
                running: false,
                loop_status: LoopStatus::default(),
            },
        }
    }
}

/// Shared application state.
///
/// Contains the settings files, the run supervisor, and the log buffer.
#[derive(Clone)]
pub struct AppState {
    /// Account settings file
    pub account: Arc<AccountFile>,

    /// Criteria file
    pub criteria: Arc<CriteriaFile>,

    /// Loop settings for runs started from the panel
    pub loop_config: Arc<LoopConfig>,

    /// Korail client settings
    pub korail: Arc<KorailConfig>,

    /// Schedule file for mock runs
    pub mock: Option<Arc<PathBuf>>,

    /// The background run
    pub supervisor: Supervisor,

    /// Recent log lines
    pub logs: LogBuffer,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        account: AccountFile,
        criteria: CriteriaFile,
        loop_config: LoopConfig,
        logs: LogBuffer,
    ) -> Self {
        Self {
            account: Arc::new(account),
            criteria: Arc::new(criteria),
            loop_config: Arc::new(loop_config),
            korail: Arc::new(KorailConfig::default()),
            mock: None,
            supervisor: Supervisor::new(),
            logs,
        }
    }

    pub fn with_korail(mut self, korail: KorailConfig) -> Self {
        self.korail = Arc::new(korail);
        self
    }

    pub fn with_mock(mut self, mock: Option<PathBuf>) -> Self {
        self.mock = mock.map(Arc::new);
        self
    }
}
