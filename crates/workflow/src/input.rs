//! Non-blocking line input.
//!
//! A reader pulls lines from stdin (or any async reader) into a channel;
//! the scheduler drains it with `try_recv` once per tick, so the poll loop
//! never blocks on the terminal.

use std::io::BufRead;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, warn};

/// Result of one non-blocking poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinePoll {
    /// A complete line, without its terminator
    Line(String),
    /// Nothing typed since the last poll
    Empty,
    /// The input reached end of file and will never produce a line again
    Closed,
}

/// A source of complete text lines that can be polled without blocking.
pub trait LineSource: Send {
    fn poll_line(&mut self) -> LinePoll;
}

/// Lines typed on the terminal.
pub struct TerminalInput {
    rx: mpsc::Receiver<String>,
}

impl TerminalInput {
    /// Read the process's stdin.
    ///
    /// Uses a plain OS thread: a read blocked on an idle terminal must not
    /// keep the runtime from shutting down on exit.
    pub fn stdin() -> Self {
        let (tx, input) = Self::channel();
        let spawned = std::thread::Builder::new()
            .name("terminal-input".into())
            .spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    match line {
                        Ok(line) => {
                            if tx.blocking_send(line).is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Terminal read failed, closing input");
                            return;
                        }
                    }
                }
                debug!("Terminal input reached end of file");
            });
        if let Err(e) = spawned {
            warn!(error = %e, "Could not start terminal reader; terminal input disabled");
        }
        input
    }

    /// Read lines from `reader` on a background task.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, input) = Self::channel();
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if tx.send(line).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("Terminal input reached end of file");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Terminal read failed, closing input");
                        break;
                    }
                }
            }
        });
        input
    }

    /// An input fed by hand through the returned sender. Dropping the
    /// sender closes the input.
    pub fn channel() -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(32);
        (tx, Self { rx })
    }
}

impl LineSource for TerminalInput {
    fn poll_line(&mut self) -> LinePoll {
        match self.rx.try_recv() {
            Ok(line) => LinePoll::Line(line),
            Err(TryRecvError::Empty) => LinePoll::Empty,
            Err(TryRecvError::Disconnected) => LinePoll::Closed,
        }
    }
}
