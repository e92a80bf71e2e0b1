//! Generic runtime for shell orchestration.
//!
//! The runtime owns the [`Shell`] and is the single execution context every
//! state mutation happens on. Host callbacks from any thread reach it as
//! [`Inbound`] messages through a [`ShellHandle`]; the loop applies them one
//! at a time and hands the resulting [`ShellAction`]s to the [`Driver`].
//!
//! Bridge calls that need an immediate answer carry a oneshot reply channel,
//! so off-context callers block (or await) until the runtime has processed
//! them in order with everything else.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use webshell_core::{Environment, ShellConfig};
use webshell_proto::BridgeReply;

use crate::{Driver, Shell, ShellAction, ShellClosed, ShellEvent};

/// Message delivered to the runtime inbox.
#[derive(Debug)]
pub enum Inbound {
    /// A host event.
    Event(ShellEvent),
    /// A raw bridge message awaiting its reply.
    Invoke {
        /// Raw JSON call envelope.
        raw: String,
        /// Reply channel.
        reply: oneshot::Sender<BridgeReply>,
    },
    /// A content-initiated navigation awaiting the interception verdict.
    Intercept {
        /// Target URL.
        url: String,
        /// `true` cancels the navigation.
        reply: oneshot::Sender<bool>,
    },
    /// Barrier: answered once everything queued before it was applied.
    Flush(oneshot::Sender<()>),
    /// Host-initiated teardown.
    Shutdown,
}

/// Cloneable, thread-safe entry point into a running shell.
#[derive(Debug, Clone)]
pub struct ShellHandle {
    tx: mpsc::UnboundedSender<Inbound>,
}

impl ShellHandle {
    /// Queue a host event.
    ///
    /// # Errors
    ///
    /// `ShellClosed` if the runtime has stopped.
    pub fn post(&self, event: ShellEvent) -> Result<(), ShellClosed> {
        self.tx.send(Inbound::Event(event)).map_err(|_| ShellClosed)
    }

    /// Send a raw bridge message and await the reply.
    ///
    /// # Errors
    ///
    /// `ShellClosed` if the runtime stopped before answering.
    pub async fn invoke(&self, raw: impl Into<String>) -> Result<BridgeReply, ShellClosed> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Inbound::Invoke { raw: raw.into(), reply }).map_err(|_| ShellClosed)?;
        rx.await.map_err(|_| ShellClosed)
    }

    /// Send a raw bridge message from a host thread and block for the reply.
    ///
    /// Must not be called from inside an async context.
    ///
    /// # Errors
    ///
    /// `ShellClosed` if the runtime stopped before answering.
    pub fn invoke_blocking(&self, raw: impl Into<String>) -> Result<BridgeReply, ShellClosed> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Inbound::Invoke { raw: raw.into(), reply }).map_err(|_| ShellClosed)?;
        rx.blocking_recv().map_err(|_| ShellClosed)
    }

    /// Ask whether a content-initiated navigation must be cancelled.
    ///
    /// # Errors
    ///
    /// `ShellClosed` if the runtime stopped before answering.
    pub async fn should_intercept(&self, url: impl Into<String>) -> Result<bool, ShellClosed> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Inbound::Intercept { url: url.into(), reply }).map_err(|_| ShellClosed)?;
        rx.await.map_err(|_| ShellClosed)
    }

    /// Wait until every message queued before this call has been applied.
    ///
    /// # Errors
    ///
    /// `ShellClosed` if the runtime stopped first.
    pub async fn flush(&self) -> Result<(), ShellClosed> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Inbound::Flush(reply)).map_err(|_| ShellClosed)?;
        rx.await.map_err(|_| ShellClosed)
    }

    /// Request teardown.
    ///
    /// # Errors
    ///
    /// `ShellClosed` if the runtime has already stopped.
    pub fn shutdown(&self) -> Result<(), ShellClosed> {
        self.tx.send(Inbound::Shutdown).map_err(|_| ShellClosed)
    }
}

/// Generic runtime that orchestrates the Shell and a Driver.
///
/// # Type Parameters
///
/// - `D`: Host driver
/// - `E`: Environment providing time
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    env: E,
    shell: Shell<E::Instant>,
    inbox: mpsc::UnboundedReceiver<Inbound>,
    tick: Duration,
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a runtime and the handle that feeds it.
    pub fn new(driver: D, env: E, config: ShellConfig) -> (Self, ShellHandle) {
        let (tx, inbox) = mpsc::unbounded_channel();
        let tick = config.timings.tick();
        let shell = Shell::new(config);
        (Self { driver, env, shell, inbox, tick }, ShellHandle { tx })
    }

    /// Run the event loop until the app exits or is torn down.
    ///
    /// Boots the shell, then processes inbound messages in arrival order and
    /// advances timers every tick. Teardown always runs before returning,
    /// including when the driver fails.
    ///
    /// # Errors
    ///
    /// The first driver failure, reported once teardown has finished.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        let result = self.event_loop().await;
        if let Err(e) = &result {
            warn!(error = %e, "driver failed, tearing down");
        }
        self.finish();
        result
    }

    async fn event_loop(&mut self) -> Result<(), D::Error> {
        let reachable = self.driver.is_reachable();
        let actions = self.shell.boot(self.env.now(), reachable);
        let mut quit = self.perform_all(actions)?;
        let mut last_tick = self.env.now();

        while !quit {
            let wait = self.tick.saturating_sub(self.env.now() - last_tick);
            let inbound = tokio::select! {
                biased;
                msg = self.inbox.recv() => Some(msg),
                () = self.env.sleep(wait) => None,
            };

            // Timers first, so a message never observes a stale deadline.
            let now = self.env.now();
            if now - last_tick >= self.tick {
                last_tick = now;
                let actions = self.shell.handle(ShellEvent::Tick, now);
                quit = self.perform_all(actions)?;
            }
            if quit {
                break;
            }

            quit = match inbound {
                Some(Some(inbound)) => self.process(inbound)?,
                Some(None) => {
                    debug!("all shell handles dropped");
                    true
                },
                None => false,
            };
        }
        Ok(())
    }

    /// The shell state machine.
    pub fn shell(&self) -> &Shell<E::Instant> {
        &self.shell
    }

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the driver.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Apply one inbound message.
    ///
    /// Returns `true` if the runtime should stop.
    fn process(&mut self, inbound: Inbound) -> Result<bool, D::Error> {
        match inbound {
            Inbound::Event(event) => {
                let actions = self.shell.handle(event, self.env.now());
                self.perform_all(actions)
            },
            Inbound::Invoke { raw, reply } => {
                let (answer, actions) = self.shell.invoke(&raw, self.driver.device());
                if reply.send(answer).is_err() {
                    debug!("bridge caller went away before the reply");
                }
                self.perform_all(actions)
            },
            Inbound::Intercept { url, reply } => {
                let reachable = self.driver.is_reachable();
                let (cancel, actions) = self.shell.should_intercept(&url, reachable);
                if reply.send(cancel).is_err() {
                    debug!("navigation caller went away before the verdict");
                }
                self.perform_all(actions)
            },
            Inbound::Flush(reply) => {
                // A dropped barrier is not an error.
                let _ = reply.send(());
                Ok(false)
            },
            Inbound::Shutdown => {
                let actions = self.shell.shutdown();
                self.perform_all(actions)?;
                Ok(true)
            },
        }
    }

    /// Perform actions in order.
    ///
    /// Returns `true` if one of them was [`ShellAction::Exit`].
    fn perform_all(&mut self, actions: Vec<ShellAction>) -> Result<bool, D::Error> {
        let mut quit = false;
        for action in actions {
            quit |= action == ShellAction::Exit;
            self.driver.perform(action)?;
        }
        Ok(quit)
    }

    /// Final teardown. Driver failures are logged, not propagated.
    fn finish(&mut self) {
        for action in self.shell.shutdown() {
            if let Err(e) = self.driver.perform(action) {
                warn!(error = %e, "teardown action failed");
            }
        }
        // Dropping queued reply channels wakes their callers with ShellClosed.
        self.inbox.close();
        while let Ok(pending) = self.inbox.try_recv() {
            debug!(?pending, "dropping message queued after shutdown");
        }
        self.driver.stop();
        info!("shell runtime stopped");
    }
}
