use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use korail_watch::config::{
    AccountFile, AccountSettings, ConfigError, DEFAULT_ACCOUNT_FILE, loop_config_from_env,
};
use korail_watch::criteria::{CriteriaFile, DEFAULT_CRITERIA_FILE};
use korail_watch::domain::SearchCriterion;
use korail_watch::korail::KorailConfig;
use korail_watch::launch::Launch;
use korail_watch::reserve::{LoopConfig, ReservationLoop, RunError, cancel_pair};
use korail_watch::telemetry::{self, LogBuffer};
use korail_watch::web::{AppState, create_router};

/// Exit code for configuration and setup errors.
const EXIT_CONFIG: u8 = 1;

/// Exit code when the initial login fails.
const EXIT_LOGIN: u8 = 2;

#[derive(Parser)]
#[command(name = "korail-watch", version, about = "Watch Korail for cancelled tickets and reserve one")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the reservation loop in the foreground until it ends.
    Run(RunArgs),
    /// Serve the web control panel.
    Serve(ServeArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Criteria file (JSON array of search records)
    #[arg(long, default_value = DEFAULT_CRITERIA_FILE)]
    criteria: PathBuf,

    /// Account settings file; blank fields fall back to the environment
    #[arg(long, default_value = DEFAULT_ACCOUNT_FILE)]
    account: PathBuf,

    /// Serve searches from this schedule file instead of Korail
    #[arg(long)]
    mock: Option<PathBuf>,

    /// Adult passengers per reservation
    #[arg(long, default_value_t = 1)]
    adults: u8,

    /// Korail API base URL
    #[arg(long)]
    korail_url: Option<String>,
}

impl CommonArgs {
    fn korail_config(&self) -> KorailConfig {
        let config = KorailConfig::default().with_adults(self.adults);
        match &self.korail_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Stop after this many polling iterations (0 for no limit)
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Seconds between polling iterations
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Search all criteria concurrently within an iteration
    #[arg(long)]
    parallel: bool,
}

impl RunArgs {
    fn loop_config(&self, base: LoopConfig) -> LoopConfig {
        let parallel = self.parallel || base.parallel_search;
        let mut config = base.with_parallel_search(parallel);
        if let Some(max) = self.max_attempts {
            config = config.with_max_attempts((max > 0).then_some(max));
        }
        if let Some(secs) = self.interval {
            config = config.with_poll_interval(Duration::from_secs(secs));
        }
        config
    }
}

#[derive(Args)]
struct ServeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Directory of static assets for the panel
    #[arg(long, default_value = "static")]
    static_dir: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            telemetry::init(None);
            run(args).await
        }
        Command::Serve(args) => {
            let logs = LogBuffer::default();
            telemetry::init(Some(logs.clone()));
            serve(args, logs).await
        }
    }
}

async fn run(args: RunArgs) -> ExitCode {
    let (config, criteria, account) = match prepare(&args) {
        Ok(prepared) => prepared,
        Err(err) => {
            error!(error = %err, "configuration error");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let launch = Launch::new(account)
        .with_korail(args.common.korail_config())
        .with_mock(args.common.mock.clone());
    let (client, notifier) = match launch.connect().await {
        Ok(pair) => pair,
        Err(err) => return exit_for(&err),
    };

    let (cancel, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping");
            cancel.cancel();
        }
    });

    let mut reservation = ReservationLoop::new(client, notifier, config).with_cancel(token);
    match reservation.run(&criteria).await {
        Ok(termination) => {
            println!("{termination}");
            ExitCode::from(termination.exit_code())
        }
        Err(err) => exit_for(&err),
    }
}

/// Loop settings, criteria, and account for a foreground run.
fn prepare(
    args: &RunArgs,
) -> Result<(LoopConfig, Vec<SearchCriterion>, AccountSettings), ConfigError> {
    let config = args.loop_config(loop_config_from_env()?);
    let criteria = CriteriaFile::new(&args.common.criteria).load()?;
    let account = AccountFile::new(&args.common.account)
        .read()?
        .with_env_fallback();
    Ok((config, criteria, account))
}

fn exit_for(err: &RunError) -> ExitCode {
    error!(error = %err, "run could not start");
    match err {
        RunError::Login(_) => ExitCode::from(EXIT_LOGIN),
        RunError::Config(_) | RunError::Setup(_) => ExitCode::from(EXIT_CONFIG),
    }
}

async fn serve(args: ServeArgs, logs: LogBuffer) -> ExitCode {
    let loop_config = match loop_config_from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "configuration error");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let state = AppState::new(
        AccountFile::new(&args.common.account),
        CriteriaFile::new(&args.common.criteria),
        loop_config,
        logs,
    )
    .with_korail(args.common.korail_config())
    .with_mock(args.common.mock.clone());

    let app = create_router(state, &args.static_dir);

    let listener = match tokio::net::TcpListener::bind(args.addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(addr = %args.addr, error = %err, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!("Korail Watch listening on http://{}", args.addr);
    info!("  GET  /api/account, /api/criteria, /api/status, /api/log");
    info!("  POST /api/account, /api/criteria, /api/run, /api/stop");

    if let Err(err) = axum::serve(listener, app).await {
        error!(error = %err, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
