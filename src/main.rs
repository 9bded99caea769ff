use collector::{DuwResponseTransformer, LifecycleController, RunMode, StopHandle};
use duw_domain::{ConfigSource, SystemClock};
use duw_persistence::DieselTicketStore;
use duw_providers::{EnvConfigSource, GitHubBackupSync, HttpTransport, ProviderError};
use env_logger::Env;
use log::{error, info, warn};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

/// 128 + SIGINT, the status a shell reports for an interrupted process.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Collector entry point.
///
/// `MODE=polling` keeps collecting every `POLLING_RATE_SECONDS` until a cycle
/// fails or Ctrl-C is pressed; any other value runs a single cycle. The store
/// is pushed to the remote copy once the run ends.
fn main() -> ExitCode {
    // Loads `.env` before the logger reads RUST_LOG.
    let config = EnvConfigSource::new();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let mode = RunMode::from_setting(config.lookup("MODE").as_deref());
    let token = config.lookup("GITHUB_TOKEN").filter(|t| !t.trim().is_empty());

    let mut controller = match build_controller(config, token) {
        Ok(controller) => controller,
        Err(e) => {
            error!("failed to set up HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if handles_ctrl_c(mode) {
        install_ctrl_c(controller.stop_handle());
    }

    info!("starting DUW collector in {:?} mode", mode);
    if let Err(e) = controller.start(mode) {
        error!("{}", e);
        return ExitCode::from(e.exit_code());
    }
    controller.stop();
    ExitCode::SUCCESS
}

fn build_controller(config: EnvConfigSource, token: Option<String>) -> Result<LifecycleController, ProviderError> {
    let backup = match token {
        Some(token) => GitHubBackupSync::with_api(Box::new(HttpTransport::new()?),
                                                  Box::new(HttpTransport::new()?.with_bearer_token(token))),
        None => GitHubBackupSync::new(Box::new(HttpTransport::new()?)),
    };
    let transformer = DuwResponseTransformer::new(Arc::new(SystemClock));
    Ok(LifecycleController::new(Box::new(HttpTransport::new()?),
                                Box::new(DieselTicketStore::new()),
                                Box::new(config),
                                Box::new(backup),
                                Box::new(transformer)))
}

/// Only polling runs trap Ctrl-C; a one-shot run keeps the default action.
fn handles_ctrl_c(mode: RunMode) -> bool {
    mode == RunMode::Polling
}

/// Waits for Ctrl-C on a helper thread and cancels the polling loop. A second
/// Ctrl-C exits at once, even while a request is in flight.
fn install_ctrl_c(handle: StopHandle) {
    let spawned = thread::Builder::new().name("ctrl-c".into()).spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Ctrl-C handler unavailable: {}", e);
                return;
            }
        };
        if let Err(e) = runtime.block_on(tokio::signal::ctrl_c()) {
            warn!("failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Ctrl-C received, stopping collector (press again to exit now)");
        handle.stop();
        if runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
            warn!("second Ctrl-C received, exiting without pushing the store");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
    if let Err(e) = spawned {
        warn!("could not start Ctrl-C thread: {}", e);
    }
}
