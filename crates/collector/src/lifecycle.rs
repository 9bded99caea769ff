// Archivo: lifecycle.rs
// Orchestrates one run of the collector: optional download of the remote
// store, store initialization, then a single cycle or a polling loop, and
// finally the upload of the store on `stop`.
use crate::errors::{CycleError, Result};
use crate::settings::CollectorSettings;
use crate::transformer::ResponseTransformer;
use chrono::Utc;
use duw_domain::{ConfigSource, RemoteBackupSync, TicketStore, Transport};
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

/// Whether `start` runs one cycle or keeps polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
  OneShot,
  Polling,
}

impl RunMode {
  /// Reads the `MODE` setting: `polling` selects the loop, anything else
  /// (including an absent value) a single cycle.
  pub fn from_setting(value: Option<&str>) -> Self {
    match value {
      Some("polling") => RunMode::Polling,
      _ => RunMode::OneShot,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
  Idle,
  Initializing,
  Running,
  Stopped,
}

/// Cloneable handle that cancels a polling loop from any thread.
///
/// The loop notices the request at its next iteration boundary, or at once
/// while it is sleeping between cycles. A request in flight over the network
/// is not interrupted.
#[derive(Clone)]
pub struct StopHandle {
  requested: Arc<AtomicBool>,
  tx: Sender<()>,
}

impl StopHandle {
  pub fn stop(&self) {
    self.requested.store(true, Ordering::SeqCst);
    // The receiver lives as long as the controller; a send error only means
    // the controller is gone already.
    let _ = self.tx.send(());
  }

  pub fn is_stop_requested(&self) -> bool {
    self.requested.load(Ordering::SeqCst)
  }
}

struct StopSignal {
  requested: Arc<AtomicBool>,
  tx: Sender<()>,
  rx: Receiver<()>,
}

impl StopSignal {
  fn new() -> Self {
    let (tx, rx) = mpsc::channel();
    Self { requested: Arc::new(AtomicBool::new(false)),
           tx,
           rx }
  }

  fn handle(&self) -> StopHandle {
    StopHandle { requested: self.requested.clone(),
                 tx: self.tx.clone() }
  }

  fn reset(&self) {
    self.requested.store(false, Ordering::SeqCst);
    while self.rx.try_recv().is_ok() {}
  }

  fn is_requested(&self) -> bool {
    self.requested.load(Ordering::SeqCst)
  }

  /// Sleeps for `timeout` unless a stop arrives first. Returns `true` when
  /// the loop must end.
  fn wait(&self, timeout: Duration) -> bool {
    if self.is_requested() {
      return true;
    }
    match self.rx.recv_timeout(timeout) {
      Ok(()) => true,
      Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => self.is_requested(),
    }
  }
}

/// Lifecycle controller of the collector.
///
/// State machine: `Idle -> Initializing -> Running -> Idle`. A failed
/// initialization returns to `Idle`, and so does a finished run (one-shot
/// cycle done, polling loop ended by a failure or a stop request). A finished
/// run leaves a pending push: `stop` uploads the store and moves the
/// controller to `Stopped`. Idle and stopped controllers can be started again.
pub struct LifecycleController {
  transport: Box<dyn Transport>,
  store: Box<dyn TicketStore>,
  config: Box<dyn ConfigSource>,
  backup: Box<dyn RemoteBackupSync>,
  transformer: Box<dyn ResponseTransformer>,
  state: CollectorState,
  settings: Option<CollectorSettings>,
  push_pending: bool,
  signal: StopSignal,
}

impl LifecycleController {
  pub fn new(transport: Box<dyn Transport>,
             store: Box<dyn TicketStore>,
             config: Box<dyn ConfigSource>,
             backup: Box<dyn RemoteBackupSync>,
             transformer: Box<dyn ResponseTransformer>)
             -> Self {
    Self { transport,
           store,
           config,
           backup,
           transformer,
           state: CollectorState::Idle,
           settings: None,
           push_pending: false,
           signal: StopSignal::new() }
  }

  pub fn state(&self) -> CollectorState {
    self.state
  }

  pub fn is_running(&self) -> bool {
    self.state == CollectorState::Running
  }

  /// Settings resolved by the last successful initialization.
  pub fn settings(&self) -> Option<&CollectorSettings> {
    self.settings.as_ref()
  }

  /// Whether a finished run still has to be pushed by `stop`.
  pub fn has_pending_push(&self) -> bool {
    self.push_pending
  }

  pub fn stop_handle(&self) -> StopHandle {
    self.signal.handle()
  }

  /// Initializes the collector and runs it in `mode`.
  ///
  /// Returns an error only when the collector could not be initialized.
  /// Failed cycles are logged; in polling mode the first failure ends the
  /// loop. The controller is back to `Idle` when this returns `Ok`.
  pub fn start(&mut self, mode: RunMode) -> Result<()> {
    if self.state == CollectorState::Running {
      warn!("collector is already running");
      return Ok(());
    }
    self.signal.reset();
    self.state = CollectorState::Initializing;
    let settings = match self.initialize() {
      Ok(settings) => settings,
      Err(e) => {
        error!("failed to initialize collector: {}", e);
        self.state = CollectorState::Idle;
        return Err(e);
      }
    };
    self.state = CollectorState::Running;
    self.push_pending = true;

    match mode {
      RunMode::OneShot => {
        if let Err(e) = self.collect_once(&settings.source_url) {
          error!("collection cycle failed: {}", e);
        }
      }
      RunMode::Polling => self.run_polling_loop(&settings),
    }
    self.state = CollectorState::Idle;
    Ok(())
  }

  /// Ends the current run and uploads the store to the remote copy.
  ///
  /// Does nothing unless a run is executing or has finished without being
  /// pushed yet.
  pub fn stop(&mut self) {
    if self.state != CollectorState::Running && !self.push_pending {
      warn!("collector has no run to stop");
      return;
    }
    self.signal.handle().stop();
    self.state = CollectorState::Stopped;
    self.push_pending = false;
    self.push_to_remote();
  }

  fn initialize(&mut self) -> Result<CollectorSettings> {
    let settings = CollectorSettings::resolve(self.config.as_ref())?;
    if settings.polling_rate_seconds <= 0 {
      warn!("POLLING_RATE_SECONDS is {}; polling cycles will run back to back",
            settings.polling_rate_seconds);
    }

    if let Some(remote) = settings.remote_ref() {
      match self.backup.fetch(&remote, &settings.db_path) {
        Ok(()) => info!("fetched store from {}", remote),
        Err(e) => warn!("failed to fetch store from {}, using local database: {}", remote, e),
      }
    }

    self.store.initialize(&settings.db_path)?;
    info!("ticket store ready at {}", settings.db_path.display());
    self.settings = Some(settings.clone());
    Ok(settings)
  }

  fn run_polling_loop(&self, settings: &CollectorSettings) {
    let interval = settings.polling_interval();
    let mut cycles: u64 = 0;
    info!("polling {} every {:?}", settings.source_url, interval);
    while !self.signal.is_requested() {
      if let Err(e) = self.collect_once(&settings.source_url) {
        error!("collection cycle failed, leaving polling loop after {} cycles: {}", cycles, e);
        return;
      }
      cycles += 1;
      if self.signal.wait(interval) {
        break;
      }
    }
    info!("polling stopped after {} cycles", cycles);
  }

  /// One fetch, validate, parse and persist cycle. Returns the number of
  /// snapshots saved; at least one must be saved for the cycle to succeed.
  fn collect_once(&self, source_url: &str) -> std::result::Result<usize, CycleError> {
    let payload = self.transport.get(source_url);
    let text = validate_payload(&payload)?;
    let tickets = self.transformer.parse(text).ok_or(CycleError::Unparsable)?;

    let attempted = tickets.len();
    let mut saved = 0;
    for ticket in &tickets {
      match self.store.append(ticket) {
        Ok(_) => saved += 1,
        Err(e) => error!("failed to save ticket for city {}: {}", ticket.city(), e),
      }
    }
    if saved == 0 {
      return Err(CycleError::NothingPersisted { attempted });
    }
    info!("saved {} of {} snapshots", saved, attempted);
    Ok(saved)
  }

  fn push_to_remote(&self) {
    let Some(settings) = self.settings.as_ref() else {
      return;
    };
    let Some(remote) = settings.remote_ref() else {
      return;
    };
    let message = format!("Update DUW data - {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    match self.backup.push(&remote, &settings.db_path, &message) {
      Ok(()) => info!("pushed store to {}", remote),
      Err(e) => error!("failed to push store to {}: {}", remote, e),
    }
  }
}

fn validate_payload(payload: &[u8]) -> std::result::Result<&str, CycleError> {
  if payload.is_empty() {
    return Err(CycleError::EmptyResponse);
  }
  std::str::from_utf8(payload).map_err(|e| CycleError::InvalidPayload(e.to_string()))
}
