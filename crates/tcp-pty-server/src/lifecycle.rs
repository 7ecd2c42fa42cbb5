//! Lifecycle control: turns process signals into bridge events and decides
//! how the session child ends.
//!
//! A background task listens for SIGINT, SIGTERM and SIGCHLD and forwards
//! them as [`LifecycleEvent`]s over a channel. The bridge polls that channel
//! together with its data streams, so it never touches signal state itself.

use std::process::ExitStatus;

use tcp_pty_core::{Control, TcpPtyResult, Watch};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::session::SessionChild;

/// Capacity of the lifecycle event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// A process-lifetime event delivered to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// SIGINT.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// SIGCHLD: some child stopped, continued or exited.
    ChildStateChanged,
}

/// Install the signal listeners and start forwarding them.
///
/// Must be called before the session child is spawned so that its exit can
/// never go unnoticed.
pub fn watch_signals() -> std::io::Result<mpsc::Receiver<LifecycleEvent>> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut child = signal(SignalKind::child())?;

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                Some(()) = interrupt.recv() => LifecycleEvent::Interrupt,
                Some(()) = terminate.recv() => LifecycleEvent::Terminate,
                Some(()) = child.recv() => LifecycleEvent::ChildStateChanged,
                else => break,
            };
            debug!(?event, "signal received");
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });

    Ok(rx)
}

/// Watches the session on behalf of the bridge and owns the session child.
pub struct LifecycleController {
    events: mpsc::Receiver<LifecycleEvent>,
    child: SessionChild,
    shutdown: Option<LifecycleEvent>,
}

impl LifecycleController {
    pub fn new(events: mpsc::Receiver<LifecycleEvent>, child: SessionChild) -> Self {
        Self {
            events,
            child,
            shutdown: None,
        }
    }

    /// The signal that requested shutdown, if any.
    pub fn shutdown_requested(&self) -> Option<LifecycleEvent> {
        self.shutdown
    }

    /// Whether the child exited on its own and has been reaped.
    pub fn child_exited(&self) -> bool {
        self.child.status().is_some()
    }

    fn reap_if_exited(&mut self) -> Control {
        match self.child.try_reap() {
            Ok(Some(status)) => {
                info!(%status, "session process exited");
                Control::Stop
            }
            Ok(None) => Control::Continue,
            Err(e) => {
                warn!(error = %e, "failed to poll session process");
                Control::Continue
            }
        }
    }

    /// Settle the child after the bridge stopped: keep the status of a child
    /// that already exited, otherwise kill it and wait for it.
    pub fn finish(mut self) -> TcpPtyResult<ExitStatus> {
        if let Some(status) = self.child.try_reap()? {
            return Ok(status);
        }
        info!(pid = self.child.id(), "killing session process");
        self.child.kill_and_reap()
    }
}

impl Watch for LifecycleController {
    type Event = LifecycleEvent;

    async fn next_event(&mut self) -> Option<LifecycleEvent> {
        self.events.recv().await
    }

    fn on_event(&mut self, event: LifecycleEvent) -> Control {
        match event {
            LifecycleEvent::Interrupt | LifecycleEvent::Terminate => {
                info!(?event, "shutdown requested");
                self.shutdown = Some(event);
                Control::Stop
            }
            LifecycleEvent::ChildStateChanged => self.reap_if_exited(),
        }
    }

    // Signals coalesce, so a SIGCHLD can be folded into an earlier one that
    // was handled while the child was still running.
    fn on_tick(&mut self) -> Control {
        self.reap_if_exited()
    }
}
