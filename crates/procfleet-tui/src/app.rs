//! Application state and main loop

use crate::action::Action;
use crate::components::{Component, HelpComponent, MachinesComponent};
use crate::tui::{self, Tui};
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use procfleet_core::TargetRegistry;
use procfleet_core::constants::{AUTO_REFRESH_INTERVAL, FETCH_TIMEOUT};
use procfleet_hosts::{HostError, ProcessRecord, SignalKind};
use std::time::Duration;
use tokio::sync::mpsc;

/// Result of a background fetch, routed back to its target by index.
#[derive(Debug)]
struct FetchOutcome {
    target_index: usize,
    result: Result<Vec<ProcessRecord>, HostError>,
}

/// Main application state
pub struct App {
    /// Tabbed machine view
    machines: MachinesComponent,
    /// Help overlay (present while open)
    help: Option<HelpComponent>,
    /// Whether the application should quit
    should_quit: bool,
    /// Background refresh enabled
    auto_refresh: bool,
    /// Tick rate for the event loop (ms)
    tick_rate: Duration,
    /// Channel for fetch results
    fetch_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    fetch_tx: mpsc::UnboundedSender<FetchOutcome>,
}

impl App {
    pub fn new(registry: TargetRegistry) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        Self {
            machines: MachinesComponent::new(registry),
            help: None,
            should_quit: false,
            auto_refresh: true,
            tick_rate: Duration::from_millis(100),
            fetch_rx,
            fetch_tx,
        }
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        tui::install_panic_hook();
        let mut terminal = tui::init()?;
        let result = self.main_loop(&mut terminal).await;
        tui::restore()?;
        result
    }

    /// Main event loop
    async fn main_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        // Get every tab populated without waiting for the first tick
        let count = self.machines.registry().len();
        for index in 0..count {
            self.spawn_refresh(index);
        }

        loop {
            let auto_refresh = self.auto_refresh;
            terminal.draw(|frame| {
                let area = frame.area();
                let _ = self.machines.draw_with(frame, area, auto_refresh);
                if let Some(help) = &mut self.help {
                    let _ = help.draw(frame, area);
                }
            })?;

            if event::poll(self.tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        let action = match &mut self.help {
                            Some(help) => help.handle_key_event(key)?,
                            None => self.machines.handle_key_event(key)?,
                        };
                        if let Some(action) = action {
                            self.handle_action(action).await?;
                        }
                    }
                }
            } else {
                self.handle_action(Action::Tick).await?;
            }

            // Check fetch results (non-blocking)
            while let Ok(outcome) = self.fetch_rx.try_recv() {
                self.apply_outcome(outcome);
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle an action
    async fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::ToggleHelp => {
                self.help = match self.help {
                    Some(_) => None,
                    None => Some(HelpComponent),
                };
            }
            Action::ToggleAutoRefresh => {
                self.auto_refresh = !self.auto_refresh;
            }
            Action::Refresh => {
                let active = self.machines.registry().active_index();
                self.spawn_refresh(active);
            }
            Action::RefreshAll => {
                for index in 0..self.machines.registry().len() {
                    self.spawn_refresh(index);
                }
            }
            Action::Signal(kind) => {
                self.dispatch_signal(kind).await;
            }
            Action::Tick => {
                if self.auto_refresh {
                    let due: Vec<usize> = self
                        .machines
                        .registry_mut()
                        .iter_mut()
                        .filter(|(_, t)| {
                            t.should_auto_refresh(AUTO_REFRESH_INTERVAL) && !t.fetch_in_flight()
                        })
                        .map(|(i, _)| i)
                        .collect();
                    for index in due {
                        self.spawn_refresh(index);
                    }
                }
            }
        }
        Ok(())
    }

    /// Start a background fetch for one target. Does nothing while a fetch
    /// for that target is already outstanding.
    fn spawn_refresh(&mut self, index: usize) {
        let Some(target) = self.machines.registry_mut().get_mut(index) else {
            return;
        };
        if !target.begin_fetch() {
            return;
        }
        let source = target.source().clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = match tokio::time::timeout(FETCH_TIMEOUT, source.fetch()).await {
                Ok(result) => result,
                Err(_) => Err(HostError::Unreachable(format!(
                    "fetch timed out after {}s",
                    FETCH_TIMEOUT.as_secs()
                ))),
            };
            let _ = tx.send(FetchOutcome {
                target_index: index,
                result,
            });
        });
    }

    /// Send a signal to the process under the cursor on the active tab.
    ///
    /// Delivery is awaited so the status line reflects the real outcome;
    /// background fetches keep flowing in the meantime. A refresh follows a
    /// successful send so the table shows the effect.
    async fn dispatch_signal(&mut self, kind: SignalKind) {
        let active = self.machines.registry().active_index();
        let Some(target) = self.machines.registry_mut().active_mut() else {
            return;
        };
        let pid = match target.selected() {
            Some(record) => record.pid,
            None => {
                target.set_status("no process selected");
                return;
            }
        };
        let source = target.source().clone();

        match source.send_signal(pid, kind).await {
            Ok(()) => {
                tracing::info!("sent {} to pid {pid}", kind.name());
                if let Some(target) = self.machines.registry_mut().active_mut() {
                    target.set_status(format!("sent {} to pid {pid}", kind.name()));
                }
                self.spawn_refresh(active);
            }
            Err(e) => {
                tracing::warn!("signal delivery failed: {e}");
                if let Some(target) = self.machines.registry_mut().active_mut() {
                    target.set_status(e.to_string());
                }
            }
        }
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        let Some(target) = self.machines.registry_mut().get_mut(outcome.target_index) else {
            return;
        };
        match outcome.result {
            Ok(records) => {
                tracing::debug!("{}: {} processes", target.label(), records.len());
                target.apply_snapshot(records);
            }
            Err(e) => {
                tracing::warn!("{}: fetch failed: {e}", target.label());
                target.fetch_failed(e.to_string());
            }
        }
    }
}
