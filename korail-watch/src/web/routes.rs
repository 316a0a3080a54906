//! HTTP route handlers.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::time::Duration;

use askama::Template;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{
        Html, IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::stream::{self, Stream, StreamExt};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::config::ConfigError;
use crate::criteria::CriterionRecord;
use crate::launch::Launch;
use crate::telemetry::LogBuffer;

use super::dto::*;
use super::state::{AppState, RunStatus, Supervisor, SupervisorError};
use super::templates::*;

/// Final event of a log stream.
pub const END_OF_LOG: &str = "[END]";

/// How long the log stream waits for new lines before rechecking the run.
const LOG_POLL: Duration = Duration::from_secs(1);

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/api/account", get(get_account).post(save_account))
        .route("/api/criteria", get(get_criteria).post(save_criteria))
        .route("/api/run", post(start_run))
        .route("/api/stop", post(stop_run))
        .route("/api/status", get(run_status))
        .route("/api/log", get(log_stream))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Control panel page.
async fn index_page(State(state): State<AppState>) -> impl IntoResponse {
    let template = IndexTemplate {
        account_path: state.account.path().display().to_string(),
        criteria_path: state.criteria.path().display().to_string(),
        mock: state.mock.is_some(),
    };
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

async fn get_account(State(state): State<AppState>) -> Result<Json<AccountView>, AppError> {
    let settings = state.account.read()?;
    Ok(Json(AccountView::from(&settings)))
}

async fn save_account(
    State(state): State<AppState>,
    Json(update): Json<AccountUpdate>,
) -> Result<Json<OkResponse>, AppError> {
    let settings = update.apply(state.account.read()?);
    state.account.write(&settings)?;
    info!(path = %state.account.path().display(), "account settings saved");
    Ok(Json(OkResponse::ok()))
}

async fn get_criteria(
    State(state): State<AppState>,
) -> Result<Json<Vec<CriterionRecord>>, AppError> {
    Ok(Json(state.criteria.read_records()?))
}

/// Replace the criteria file. Invalid records are rejected and nothing is
/// written.
async fn save_criteria(
    State(state): State<AppState>,
    Json(records): Json<Vec<CriterionRecord>>,
) -> Result<Json<OkResponse>, AppError> {
    state.criteria.write_records(&records)?;
    info!(count = records.len(), "criteria saved");
    Ok(Json(OkResponse::ok()))
}

/// Start a run with the saved criteria and account settings.
async fn start_run(State(state): State<AppState>) -> Result<Json<OkResponse>, AppError> {
    if state.supervisor.is_running() {
        return Err(SupervisorError::AlreadyRunning.into());
    }

    let criteria = state.criteria.load()?;
    if criteria.is_empty() {
        return Err(ConfigError::EmptyCriteria.into());
    }
    let account = state.account.read()?.with_env_fallback();
    let launch = Launch::new(account)
        .with_korail((*state.korail).clone())
        .with_mock(state.mock.as_deref().cloned());
    if launch.mock.is_none() {
        account_ready(&launch)?;
    }

    state.logs.clear();
    state.logs.push(format!(
        "[system] starting run with {} criteria",
        criteria.len()
    ));

    state.supervisor.start(
        criteria,
        (*state.loop_config).clone(),
        async move { launch.connect().await },
    )?;
    Ok(Json(OkResponse::ok()))
}

/// Fail fast on missing credentials instead of starting a run that
/// immediately fails.
fn account_ready(launch: &Launch) -> Result<(), ConfigError> {
    launch.account.credentials().map(|_| ())
}

async fn stop_run(State(state): State<AppState>) -> Result<Json<OkResponse>, AppError> {
    state.supervisor.stop()?;
    state.logs.push("[system] stop requested");
    Ok(Json(OkResponse::ok()))
}

async fn run_status(State(state): State<AppState>) -> Json<RunStatus> {
    Json(state.supervisor.status())
}

/// Stream buffered and new log lines. Ends with [`END_OF_LOG`] once no run
/// is in progress.
async fn log_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let lines = log_lines(state.logs.clone(), state.supervisor.clone())
        .map(|line| Ok(Event::default().data(line)));
    Sse::new(lines).keep_alive(KeepAlive::default())
}

struct LogCursor {
    logs: LogBuffer,
    supervisor: Supervisor,
    next: u64,
    pending: VecDeque<String>,
    done: bool,
}

/// Log lines from the start of the buffer, then live ones, then
/// [`END_OF_LOG`].
fn log_lines(logs: LogBuffer, supervisor: Supervisor) -> impl Stream<Item = String> {
    let cursor = LogCursor {
        logs,
        supervisor,
        next: 0,
        pending: VecDeque::new(),
        done: false,
    };

    stream::unfold(cursor, |mut cursor| async move {
        loop {
            if let Some(line) = cursor.pending.pop_front() {
                return Some((line, cursor));
            }
            if cursor.done {
                return None;
            }

            // Check the run before reading so lines logged as it finishes
            // are still sent before the end marker.
            let running = cursor.supervisor.is_running();
            let fresh = cursor.logs.since(cursor.next);
            if let Some(last_seq) = fresh.last().map(|line| line.seq) {
                cursor.next = last_seq + 1;
                cursor.pending.extend(fresh.into_iter().map(|l| l.text));
                continue;
            }

            if !running {
                cursor.done = true;
                return Some((END_OF_LOG.to_string(), cursor));
            }

            let _ = tokio::time::timeout(LOG_POLL, cursor.logs.changed()).await;
        }
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Write { .. } => AppError::Internal {
                message: e.to_string(),
            },
            _ => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl From<SupervisorError> for AppError {
    fn from(e: SupervisorError) -> Self {
        match e {
            SupervisorError::Config(e) => e.into(),
            _ => AppError::Conflict {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message.clone()),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        };

        warn!(%status, "{message}");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
