//! The I/O bridge: one loop shuttling bytes between the transport and the
//! local endpoint (terminal or PTY master).
//!
//! Each iteration waits on every member of the multiplexing set at once:
//! the two data streams, the lifecycle events of a [`Watch`], and a liveness
//! tick. Whatever becomes ready first is handled to completion before the
//! next wait, so bytes are forwarded in the order they were read and neither
//! direction can starve the other by more than one chunk.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use crate::writer::write_fully;

/// Bytes read from a descriptor per iteration.
pub const CHUNK_SIZE: usize = 4096;

/// Default liveness tick.
pub const DEFAULT_TICK: Duration = Duration::from_millis(200);

/// What the bridge should do after a watch hook ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Stop,
}

/// Process-lifetime events observed by the bridge alongside data readiness.
///
/// The bridge never inspects signals itself; it only asks the watch for its
/// next event and lets the watch decide whether the session is over.
#[allow(async_fn_in_trait)]
pub trait Watch {
    type Event;

    /// Wait for the next event. `None` means the event source is gone, which
    /// ends the bridge.
    async fn next_event(&mut self) -> Option<Self::Event>;

    fn on_event(&mut self, event: Self::Event) -> Control;

    /// Called on every liveness tick.
    fn on_tick(&mut self) -> Control {
        Control::Continue
    }
}

/// A watch with no event source. Used by the client.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unwatched;

impl Watch for Unwatched {
    type Event = std::convert::Infallible;

    async fn next_event(&mut self) -> Option<Self::Event> {
        std::future::pending().await
    }

    fn on_event(&mut self, event: Self::Event) -> Control {
        match event {}
    }
}

/// Why the bridge stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEnd {
    /// The transport reached end-of-file or failed.
    TransportClosed,
    /// The local endpoint reached end-of-file or failed.
    LocalClosed,
    /// The watch asked for the session to end.
    Stopped,
}

/// Summary of one bridged session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeReport {
    pub end: BridgeEnd,
    /// Bytes copied from the transport to the local endpoint.
    pub inbound: u64,
    /// Bytes copied from the local endpoint to the transport.
    pub outbound: u64,
}

/// The multiplexing loop, configured with its liveness tick.
#[derive(Debug, Clone, Copy)]
pub struct Bridge {
    tick: Duration,
}

impl Bridge {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }

    /// Run until a data stream closes or the watch stops the session.
    ///
    /// Read failures and end-of-file on either stream end the loop. A failed
    /// write only drops the chunk being forwarded; the broken descriptor is
    /// expected to report its failure on the next read.
    pub async fn run<T, L, W>(&self, transport: &mut T, local: &mut L, watch: &mut W) -> BridgeReport
    where
        T: AsyncRead + AsyncWrite + Unpin,
        L: AsyncRead + AsyncWrite + Unpin,
        W: Watch,
    {
        let mut from_transport = vec![0u8; CHUNK_SIZE];
        let mut from_local = vec![0u8; CHUNK_SIZE];
        let mut inbound: u64 = 0;
        let mut outbound: u64 = 0;

        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let end = loop {
            tokio::select! {
                read = transport.read(&mut from_transport) => match read {
                    Ok(0) => {
                        debug!("transport closed");
                        break BridgeEnd::TransportClosed;
                    }
                    Ok(n) => {
                        trace!(bytes = n, "transport -> local");
                        match write_fully(local, &from_transport[..n]).await {
                            Ok(()) => inbound += n as u64,
                            Err(e) => debug!(error = %e, "write to local endpoint failed, chunk dropped"),
                        }
                    }
                    Err(e) => {
                        debug!(error = %e, "transport read failed");
                        break BridgeEnd::TransportClosed;
                    }
                },
                read = local.read(&mut from_local) => match read {
                    Ok(0) => {
                        debug!("local endpoint closed");
                        break BridgeEnd::LocalClosed;
                    }
                    Ok(n) => {
                        trace!(bytes = n, "local -> transport");
                        match write_fully(transport, &from_local[..n]).await {
                            Ok(()) => outbound += n as u64,
                            Err(e) => debug!(error = %e, "write to transport failed, chunk dropped"),
                        }
                    }
                    Err(e) => {
                        debug!(error = %e, "local endpoint read failed");
                        break BridgeEnd::LocalClosed;
                    }
                },
                event = watch.next_event() => match event {
                    Some(event) => {
                        if watch.on_event(event) == Control::Stop {
                            break BridgeEnd::Stopped;
                        }
                    }
                    None => {
                        debug!("watch event source closed");
                        break BridgeEnd::Stopped;
                    }
                },
                _ = ticker.tick() => {
                    if watch.on_tick() == Control::Stop {
                        break BridgeEnd::Stopped;
                    }
                }
            }
        };

        BridgeReport {
            end,
            inbound,
            outbound,
        }
    }
}
