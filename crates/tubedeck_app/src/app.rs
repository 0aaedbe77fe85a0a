use std::fs;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use deck_logging::{deck_debug, deck_info, deck_warn};
use tubedeck_core::{update, AppState, Msg};
use tubedeck_engine::{EngineEvents, EngineHandle, HttpRegistry};

use crate::cli::Command;
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::render::{metrics_line, Renderer};

const PUMP_SLICE: Duration = Duration::from_millis(50);

pub fn run(command: Command, config: &AppConfig) -> anyhow::Result<()> {
    let show_metrics = matches!(command, Command::Import { .. });
    let mut app = App::new(config, show_metrics)?;
    let result = app.run(command);
    app.engine.shutdown();
    result
}

struct App {
    state: AppState,
    runner: EffectRunner,
    engine: EngineHandle,
    events: EngineEvents,
    renderer: Renderer,
    refresh_interval: Duration,
    /// Upper bound on waiting for the registry to answer outstanding calls.
    settle_timeout: Duration,
}

impl App {
    fn new(config: &AppConfig, show_metrics: bool) -> anyhow::Result<Self> {
        let registry = HttpRegistry::new(config.registry_settings())
            .with_context(|| format!("cannot use registry at {}", config.server_url))?;
        deck_info!("Using registry at {}", registry.base_url());
        let (engine, events) = EngineHandle::new(Arc::new(registry));

        let state = AppState::new()
            .with_settings(config.defaults.to_settings())
            .with_import_delay(config.import_delay());

        Ok(Self {
            state,
            runner: EffectRunner::new(
                engine.clone(),
                config.export_dir.clone(),
                config.export_filename.clone(),
            ),
            engine,
            events,
            renderer: Renderer::new(show_metrics),
            refresh_interval: config.refresh_interval(),
            settle_timeout: config.request_timeout() * 3,
        })
    }

    fn run(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Import { file } => {
                let text = fs::read_to_string(&file)
                    .with_context(|| format!("cannot read import file {}", file.display()))?;
                self.import(text)
            }
            Command::Export { filter } => self.one_shot(Msg::ExportClicked(filter)),
            Command::Copy { filter } => self.one_shot(Msg::CopyClicked(filter)),
            Command::Metrics => {
                self.load_history()?;
                println!("{}", metrics_line(&self.state.metrics()));
                Ok(())
            }
            Command::RetryFailed => {
                self.load_history()?;
                if !self.state.view().can_retry_failed {
                    println!("No failed downloads to retry.");
                    return Ok(());
                }
                self.dispatch(Msg::RetryFailedClicked);
                self.settle()
            }
            Command::ClearCompleted => {
                self.load_history()?;
                if !self.state.view().can_clear_completed {
                    println!("No completed downloads to clear.");
                    return Ok(());
                }
                self.dispatch(Msg::ClearCompletedClicked);
                self.settle()
            }
            Command::ClearFailed => {
                self.load_history()?;
                if !self.state.view().can_clear_failed {
                    println!("No failed downloads to clear.");
                    return Ok(());
                }
                self.dispatch(Msg::ClearFailedClicked);
                self.settle()
            }
        }
    }

    fn one_shot(&mut self, msg: Msg) -> anyhow::Result<()> {
        self.load_history()?;
        self.dispatch(msg);
        self.settle()?;
        let alerts = self.runner.alerts().len();
        if alerts > 0 {
            bail!("command failed with {alerts} alert(s)");
        }
        Ok(())
    }

    fn import(&mut self, text: String) -> anyhow::Result<()> {
        self.dispatch(Msg::ImportOpened);
        self.dispatch(Msg::ImportTextChanged(text));
        self.dispatch(Msg::ImportStartClicked);
        if !self.state.import_run().in_progress() {
            return Ok(());
        }

        let cancel_rx = spawn_interrupt_listener();
        self.runner.request_refresh();
        let mut next_refresh = Instant::now() + self.refresh_interval;

        while !self.state.import_run().phase().is_terminal() {
            if cancel_rx.try_recv().is_ok() {
                deck_info!("Interrupt received; cancelling import");
                self.dispatch(Msg::ImportCancelClicked);
            }
            self.pump(PUMP_SLICE);
            if Instant::now() >= next_refresh {
                self.runner.request_refresh();
                next_refresh = Instant::now() + self.refresh_interval;
            }
        }

        self.dispatch(Msg::ImportClosed);
        self.runner.request_refresh();
        self.settle()
    }

    /// Fetches the registry collections into the mirror.
    fn load_history(&mut self) -> anyhow::Result<()> {
        self.runner.request_refresh();
        self.settle()?;
        if let Some(err) = self.runner.take_refresh_error() {
            bail!("cannot read registry history: {err}");
        }
        Ok(())
    }

    /// Pumps engine events until every outstanding call has been answered.
    fn settle(&mut self) -> anyhow::Result<()> {
        let deadline = Instant::now() + self.settle_timeout;
        while !self.runner.is_idle() {
            if Instant::now() >= deadline {
                bail!("registry did not answer within {:?}", self.settle_timeout);
            }
            self.pump(PUMP_SLICE);
        }
        Ok(())
    }

    fn pump(&mut self, timeout: Duration) {
        let Some(event) = self.events.recv_timeout(timeout) else {
            return;
        };
        if let Some(msg) = self.runner.translate(event, self.state.downloads()) {
            self.dispatch(msg);
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        if let Some(run_id) = import_run_of(&msg) {
            if run_id != self.state.import_run().run_id() {
                deck_debug!("Dropping event of abandoned import run {}", run_id);
            }
        }

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            for line in self.renderer.render(&state.view()) {
                println!("{line}");
            }
        }
        self.state = state;
        self.runner.enqueue(effects);
    }
}

fn import_run_of(msg: &Msg) -> Option<u64> {
    match msg {
        Msg::ImportSubmissionCompleted { run_id, .. } | Msg::ImportDelayElapsed { run_id } => {
            Some(*run_id)
        }
        _ => None,
    }
}

/// Forwards every Ctrl-C as a cancel request.
fn spawn_interrupt_listener() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                deck_warn!("Ctrl-C handling unavailable: {}", err);
                return;
            }
        };
        runtime.block_on(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
    });
    rx
}
