//! Scripted session replay.
//!
//! Runs the real [`Runtime`] on a virtual clock with a [`LogDriver`] and feeds
//! it a parsed script the way a host would: reachability callbacks, page
//! lifecycle reports, back gestures, bridge traffic and dialog results. After
//! each command the runtime is flushed and the actions it performed are
//! written to the transcript.

use std::{collections::BTreeSet, io::Write, time::Duration};

use tracing::{info, warn};
use webshell_app::{Runtime, ShellAction, ShellClosed, ShellEvent, ShellHandle};
use webshell_core::{
    ConnectivitySignal, FileRequestId, NavigationState, NetworkId, Permission, ShellConfig,
};
use webshell_harness::SimEnv;

use crate::{
    CliError, LogDriver,
    log_driver::describe,
    script::{Command, DEFAULT_NETWORK},
};

/// What a replayed session ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Commands delivered before the shell stopped.
    pub commands: usize,
    /// Commands skipped because the shell had already stopped.
    pub skipped: usize,
    /// Actions the driver performed.
    pub actions: usize,
    /// Virtual time at the end of the session.
    pub elapsed: Duration,
    /// Whether the shell asked the host to exit.
    pub exited: bool,
    /// Navigation state when the runtime stopped.
    pub final_state: NavigationState,
}

/// System dialog the script's `grant-all` / `deny-all` answer.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Dialog {
    None,
    Batch(Vec<Permission>),
    FollowUp,
}

struct Session<'a, W> {
    handle: ShellHandle,
    env: SimEnv,
    surface: LogDriver,
    out: &'a mut W,
    networks: BTreeSet<NetworkId>,
    dialog: Dialog,
    picker: Option<FileRequestId>,
    next_request: u64,
    actions: usize,
    exited: bool,
}

/// Replay `commands` against a shell booted with `config`.
///
/// `online` is the boot reachability probe. An online boot also delivers the
/// host's initial announcement of [`DEFAULT_NETWORK`].
pub async fn replay<W: Write>(
    config: ShellConfig,
    commands: &[Command],
    online: bool,
    out: &mut W,
) -> Result<SessionSummary, CliError> {
    let env = SimEnv::new();
    let driver = LogDriver::new();
    driver.set_reachable(online);
    let surface = driver.clone();
    let (mut runtime, handle) = Runtime::new(driver, env.clone(), config);

    writeln!(out, "boot ({})", if online { "online" } else { "offline" })?;
    let mut session = Session {
        handle,
        env: env.clone(),
        surface: surface.clone(),
        out,
        networks: BTreeSet::new(),
        dialog: Dialog::None,
        picker: None,
        next_request: 0,
        actions: 0,
        exited: false,
    };

    let script = async {
        let played = session.play(commands, online).await;
        // Ends the runtime if the script did not.
        let _ = session.handle.shutdown();
        played
    };

    let (result, played) = tokio::join!(runtime.run(), script);
    result?;
    let (commands, skipped) = played?;

    session.record(surface.take_performed())?;
    info!(commands, skipped, actions = session.actions, "session finished");

    Ok(SessionSummary {
        commands,
        skipped,
        actions: session.actions,
        elapsed: env.elapsed(),
        exited: session.exited,
        final_state: runtime.shell().navigator().state(),
    })
}

impl<W: Write> Session<'_, W> {
    async fn play(&mut self, commands: &[Command], online: bool) -> Result<(usize, usize), CliError> {
        if online {
            self.networks.insert(DEFAULT_NETWORK);
            self.post(ShellEvent::Connectivity(ConnectivitySignal::Available(DEFAULT_NETWORK)))?;
        }
        if self.settle().await.is_err() {
            return Ok((0, commands.len()));
        }

        for (index, command) in commands.iter().enumerate() {
            writeln!(self.out, "> {command}")?;
            match self.apply(command).await {
                Ok(()) => {},
                Err(CliError::Closed(_)) => {
                    let skipped = commands.len() - index - 1;
                    writeln!(self.out, "  (shell stopped, {skipped} command(s) skipped)")?;
                    return Ok((index + 1, skipped));
                },
                Err(err) => return Err(err),
            }
        }
        Ok((commands.len(), 0))
    }

    async fn apply(&mut self, command: &Command) -> Result<(), CliError> {
        match command {
            Command::Online(network) => {
                self.networks.insert(*network);
                self.surface.set_reachable(true);
                self.post(ShellEvent::Connectivity(ConnectivitySignal::Available(*network)))?;
            },
            Command::Offline(network) => {
                self.networks.remove(network);
                self.surface.set_reachable(!self.networks.is_empty());
                self.post(ShellEvent::Connectivity(ConnectivitySignal::Lost(*network)))?;
            },
            Command::Started(url) => self.post(ShellEvent::PageStarted { url: url.clone() })?,
            Command::Finished(url) => self.post(ShellEvent::PageFinished { url: url.clone() })?,
            Command::Failed(url) => {
                self.post(ShellEvent::LoadFailed { url: url.clone(), main_frame: true })?;
            },
            Command::Navigate(url) => {
                let intercepted = self.handle.should_intercept(url.as_str()).await?;
                let verdict = if intercepted { "blocked" } else { "allowed" };
                writeln!(self.out, "  navigation {verdict}")?;
            },
            Command::Back => self.post(ShellEvent::BackPressed { can_go_back: true })?,
            Command::BackRoot => self.post(ShellEvent::BackPressed { can_go_back: false })?,
            Command::Invoke(raw) => {
                let reply = self.handle.invoke(raw.as_str()).await?;
                writeln!(self.out, "  reply {}", reply.to_json())?;
            },
            Command::Wait(duration) => {
                self.env.advance(*duration);
                self.post(ShellEvent::Tick)?;
            },
            Command::File => {
                self.next_request += 1;
                let request = FileRequestId(self.next_request);
                self.post(ShellEvent::FileChooserRequested { request })?;
            },
            Command::FileCancel => self.complete_file(None)?,
            Command::FilePick(uri) => self.complete_file(Some(vec![uri.clone()]))?,
            Command::GrantAll => self.answer_dialog(true)?,
            Command::DenyAll => self.answer_dialog(false)?,
            Command::SplashFaded => self.post(ShellEvent::SplashFaded)?,
            Command::Exit => self.handle.shutdown()?,
        }
        self.settle().await
    }

    fn post(&self, event: ShellEvent) -> Result<(), CliError> {
        self.handle.post(event)?;
        Ok(())
    }

    /// Wait for the runtime to drain its inbox, then transcribe.
    async fn settle(&mut self) -> Result<(), CliError> {
        let flushed = self.handle.flush().await;
        self.record(self.surface.take_performed())?;
        flushed.map_err(CliError::from)
    }

    fn record(&mut self, actions: Vec<ShellAction>) -> Result<(), CliError> {
        for action in actions {
            writeln!(self.out, "  {}", describe(&action))?;
            self.actions += 1;
            match action {
                ShellAction::RequestPermissions(batch) => self.dialog = Dialog::Batch(batch),
                ShellAction::RequestFollowUpPermission(_) => self.dialog = Dialog::FollowUp,
                ShellAction::LaunchFilePicker { request } => self.picker = Some(request),
                ShellAction::ResolveFileRequest { request, .. } if self.picker == Some(request) => {
                    self.picker = None;
                },
                ShellAction::Exit => self.exited = true,
                _ => {},
            }
        }
        Ok(())
    }

    fn complete_file(&mut self, files: Option<Vec<String>>) -> Result<(), CliError> {
        let Some(request) = self.picker.take() else {
            warn!("no file picker is open");
            writeln!(self.out, "  (no file picker open)")?;
            return Ok(());
        };
        self.post(ShellEvent::FileChooserCompleted { request, files })
    }

    fn answer_dialog(&mut self, granted: bool) -> Result<(), CliError> {
        match std::mem::replace(&mut self.dialog, Dialog::None) {
            Dialog::Batch(batch) => {
                let results = batch.into_iter().map(|p| (p, granted)).collect();
                self.post(ShellEvent::PermissionResults { results })
            },
            Dialog::FollowUp => self.post(ShellEvent::FollowUpPermissionResult { granted }),
            Dialog::None => {
                warn!("no permission dialog is open");
                writeln!(self.out, "  (no permission dialog open)")?;
                Ok(())
            },
        }
    }
}
