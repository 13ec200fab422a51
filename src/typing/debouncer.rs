//! Local typing signal debouncer
//!
//! Translates raw input-changed events into a minimal stream of start/stop
//! signals. The machine has two states, Idle and Typing; a 2-second idle
//! timer drives the Typing -> Idle transition when the operator pauses.
//! Signals alternate strictly: never two consecutive starts or stops.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::types::frames::TypingSignal;

struct DebounceState {
    /// true while in the Typing state
    typing: bool,
    /// Bumped on every transition; a pending idle timer only fires if its
    /// captured generation still matches
    generation: u64,
    /// Pending idle timer, if armed
    timer: Option<JoinHandle<()>>,
}

/// Debouncer for the local operator's typing signals
///
/// All emissions flow through a single channel so consumers observe the
/// exact signal order. Timers run on tokio time, so tests with a paused
/// clock are fully deterministic.
pub struct TypingDebouncer {
    inner: Arc<Mutex<DebounceState>>,
    signal_tx: mpsc::UnboundedSender<TypingSignal>,
    idle_timeout: Duration,
}

impl TypingDebouncer {
    /// Create a debouncer and the receiver its signals are emitted on
    #[must_use]
    pub fn new(idle_timeout: Duration) -> (Self, mpsc::UnboundedReceiver<TypingSignal>) {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            inner: Arc::new(Mutex::new(DebounceState {
                typing: false,
                generation: 0,
                timer: None,
            })),
            signal_tx,
            idle_timeout,
        };
        (debouncer, signal_rx)
    }

    /// Whether the machine is currently in the Typing state
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.inner.lock().typing
    }

    /// Feed the current input value
    ///
    /// Non-empty input while Idle emits a `start` immediately and arms the
    /// idle timer; every further call re-arms it. Empty input emits a `stop`
    /// immediately regardless of the timer (fast path for a cleared field).
    pub fn on_input_changed(&self, value: &str) {
        let mut state = self.inner.lock();

        if value.is_empty() {
            Self::stop_locked(&mut state, &self.signal_tx);
            return;
        }

        if !state.typing {
            state.typing = true;
            let _ = self.signal_tx.send(TypingSignal::Start);
        }

        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        let generation = state.generation;
        let inner = Arc::clone(&self.inner);
        let tx = self.signal_tx.clone();
        let timeout = self.idle_timeout;
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let mut state = inner.lock();
            if state.generation == generation && state.typing {
                state.typing = false;
                state.timer = None;
                let _ = tx.send(TypingSignal::Stop);
            }
        }));
    }

    /// Notify the debouncer that a message send is in progress
    ///
    /// Emits a `stop` before the message itself when the machine is Typing
    /// and cancels the pending idle timer, so no ghost indicator lingers
    /// after content is delivered.
    pub fn on_send(&self) {
        let mut state = self.inner.lock();
        Self::stop_locked(&mut state, &self.signal_tx);
    }

    /// Flush a pending `stop`, used when the conversation selection changes
    ///
    /// Identical to [`on_send`](Self::on_send); named separately because the
    /// selector calls it with no message in flight.
    pub fn flush(&self) {
        self.on_send();
    }

    fn stop_locked(state: &mut DebounceState, tx: &mpsc::UnboundedSender<TypingSignal>) {
        if !state.typing {
            return;
        }
        state.typing = false;
        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        let _ = tx.send(TypingSignal::Stop);
    }
}

impl Drop for TypingDebouncer {
    fn drop(&mut self) {
        if let Some(timer) = self.inner.lock().timer.take() {
            timer.abort();
        }
    }
}
