//! STOWAWAY Protocol - Packet Order Gate
//!
//! The decode/verify/link pipeline is slow (crypto, storage, possibly a
//! network round-trip) and must not run on the connection's inbound hot
//! path. The surrounding protocol nevertheless requires strict in-order
//! delivery: a packet may only be decodable after an earlier packet has
//! switched the connection state. The gate buffers inbound units while
//! the pipeline runs and flushes them in arrival order once it completes.
//!
//! One gate is scoped per connection. The offer side runs on the
//! connection's delivery path; `enable`/`disable` may run on whatever
//! context completes the pipeline. A single lock over state and queue
//! keeps the two sides agreed so no unit is lost, duplicated or
//! reordered.

use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::trace;

/// Where gated units go once they may proceed.
///
/// Implementations must not call back into the gate.
pub trait PacketSink<T> {
    /// Deliver one unit to the rest of the inbound pipeline.
    fn forward(&self, unit: T);
}

impl<T, F: Fn(T)> PacketSink<T> for F {
    fn forward(&self, unit: T) {
        self(unit)
    }
}

/// Gate lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    /// Units are forwarded immediately; no buffering.
    Passing,
    /// Units are appended to the FIFO queue.
    Blocking,
    /// Buffered units are being flushed in arrival order.
    Draining,
    /// The gate is done; units pass through with no added overhead and
    /// the host should remove it from the pipeline.
    Detached,
}

struct Inner<T> {
    state: GateState,
    queue: VecDeque<T>,
}

/// Per-connection ordering gate.
pub struct PacketGate<T, S: PacketSink<T>> {
    inner: Mutex<Inner<T>>,
    sink: S,
}

impl<T, S: PacketSink<T>> PacketGate<T, S> {
    /// New gate in the initial `Passing` state.
    pub fn new(sink: S) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: GateState::Passing,
                queue: VecDeque::new(),
            }),
            sink,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> GateState {
        self.inner
            .lock()
            .map(|inner| inner.state)
            .unwrap_or(GateState::Detached)
    }

    /// `Passing → Blocking`: start buffering inbound units.
    pub fn enable(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            if inner.state == GateState::Passing {
                inner.state = GateState::Blocking;
                trace!("packet gate enabled");
            }
        }
    }

    /// `Blocking → Draining → Detached`: flush the queue in strict
    /// arrival order, then let later units pass with no overhead.
    pub fn disable(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.state = GateState::Draining;
            while let Some(unit) = inner.queue.pop_front() {
                self.sink.forward(unit);
            }
            inner.state = GateState::Detached;
            trace!("packet gate drained and detached");
        }
    }

    /// Observe one inbound unit: buffer it while blocking, forward it
    /// otherwise. Units racing a concurrent [`disable`](Self::disable)
    /// wait for the drain and are then forwarded after the queue,
    /// preserving arrival order.
    pub fn offer(&self, unit: T) {
        if let Ok(mut inner) = self.inner.lock() {
            match inner.state {
                GateState::Blocking => {
                    inner.queue.push_back(unit);
                }
                GateState::Passing | GateState::Draining | GateState::Detached => {
                    self.sink.forward(unit);
                }
            }
        }
    }

    /// Connection closed while gated: drop the queue without forwarding
    /// anything, ever.
    pub fn discard(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            let dropped = inner.queue.len();
            inner.queue.clear();
            inner.state = GateState::Detached;
            if dropped > 0 {
                trace!(dropped, "packet gate discarded with queued units");
            }
        }
    }
}
