//! The poll loop that turns terminal lines and button edges into turns.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use climactl_config::SystemConfig;
use climactl_core::hardware::ButtonSignal;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::edge::ButtonEdgeState;
use crate::input::{LinePoll, LineSource};

/// What started a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A non-empty line typed on the terminal, trimmed
    Terminal(String),
    /// A rising edge of the push button
    Button,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    TerminalTurnInProgress,
    ButtonTurnInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The operator typed `exit`, `quit` or `q`
    ExitKeyword,
    /// The shutdown future completed (Ctrl+C)
    Interrupted,
}

/// Runs the turns the scheduler decides on.
#[async_trait]
pub trait TurnExecutor: Send {
    /// Run one complete turn. An error ends the turn, not the loop.
    async fn execute(&mut self, trigger: Trigger) -> Result<(), climactl_core::Error>;

    /// Called once the scheduler is ready for the next terminal line: after
    /// every terminal line (blank ones included) and after every button turn.
    fn ready(&mut self) {}
}

pub fn is_exit_keyword(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "exit" | "quit" | "q")
}

enum Tick {
    Idle,
    Triggered,
    Exit,
}

/// Single-threaded scheduler over a line source and the button.
pub struct Scheduler<L> {
    lines: L,
    button: Arc<dyn ButtonSignal>,
    edge: ButtonEdgeState,
    period: Duration,
    terminal_open: bool,
    state: SchedulerState,
}

impl<L: LineSource> Scheduler<L> {
    pub fn new(lines: L, button: Arc<dyn ButtonSignal>, period: Duration) -> Self {
        Self {
            lines,
            button,
            edge: ButtonEdgeState::new(),
            period,
            terminal_open: true,
            state: SchedulerState::Idle,
        }
    }

    /// Poll with the `[system]` check interval.
    pub fn from_config(lines: L, button: Arc<dyn ButtonSignal>, config: &SystemConfig) -> Self {
        Self::new(lines, button, config.check_interval())
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    async fn run_turn<E: TurnExecutor>(&mut self, executor: &mut E, trigger: Trigger) {
        self.state = match trigger {
            Trigger::Terminal(_) => SchedulerState::TerminalTurnInProgress,
            Trigger::Button => SchedulerState::ButtonTurnInProgress,
        };
        debug!(state = ?self.state, "Turn started");

        if let Err(e) = executor.execute(trigger).await {
            warn!(error = %e, "Turn failed, continuing");
        }
        self.state = SchedulerState::Idle;
    }

    /// One poll of both sources: terminal first, then the button.
    async fn tick<E: TurnExecutor>(&mut self, executor: &mut E) -> Tick {
        let mut triggered = false;

        if self.terminal_open {
            match self.lines.poll_line() {
                LinePoll::Line(line) => {
                    let line = line.trim();
                    if is_exit_keyword(line) {
                        return Tick::Exit;
                    }
                    if !line.is_empty() {
                        self.run_turn(executor, Trigger::Terminal(line.to_string()))
                            .await;
                        triggered = true;
                    }
                    executor.ready();
                }
                LinePoll::Empty => {}
                LinePoll::Closed => {
                    info!("Terminal input closed; serving the button only");
                    self.terminal_open = false;
                }
            }
        }

        if self.edge.update(self.button.is_pressed()) {
            info!("Button pressed");
            self.run_turn(executor, Trigger::Button).await;
            executor.ready();
            triggered = true;
        }

        if triggered { Tick::Triggered } else { Tick::Idle }
    }

    /// Poll until an exit keyword is typed.
    pub async fn run<E: TurnExecutor>(&mut self, executor: &mut E) -> ExitReason {
        self.run_until(executor, std::future::pending::<()>()).await
    }

    /// Poll until an exit keyword is typed or `shutdown` completes.
    ///
    /// Idle ticks sleep for what is left of the period; a tick that ran a
    /// turn moves straight on to the next one. `shutdown` is only observed
    /// between ticks, so a turn in flight always runs to completion.
    pub async fn run_until<E, F>(&mut self, executor: &mut E, shutdown: F) -> ExitReason
    where
        E: TurnExecutor,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(period_ms = self.period.as_millis() as u64, "Scheduler started");

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => return ExitReason::Interrupted,
                _ = std::future::ready(()) => {}
            }

            let started = Instant::now();
            let tick = self.tick(executor).await;

            match tick {
                Tick::Exit => return ExitReason::ExitKeyword,
                Tick::Triggered => {}
                Tick::Idle => {
                    let remaining = self.period.saturating_sub(started.elapsed());
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => return ExitReason::Interrupted,
                        _ = tokio::time::sleep(remaining) => {}
                    }
                }
            }
        }
    }
}
