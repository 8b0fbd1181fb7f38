//! Emit-after-stability for rapidly changing values.
//!
//! [`Debounce`] is the bare state machine: callers feed it inputs together
//! with the current time and poll it for a settled value. [`Debouncer`] runs
//! the same machine on a tokio task and delivers settled values on a channel.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default delay between the last keystroke and the search settling.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: Duration,
    settled: T,
    pending: Option<(T, Instant)>,
    cancelled: bool,
}

impl<T: Clone + PartialEq> Debounce<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            settled: initial,
            pending: None,
            cancelled: false,
        }
    }

    /// Record a new input value. Restarts the wait.
    pub fn input(&mut self, value: T, now: Instant) {
        if self.cancelled {
            return;
        }
        self.pending = Some((value, now + self.delay));
    }

    /// When the pending value settles, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// Emit the pending value once it has been stable for the full delay.
    ///
    /// Returns `None` while waiting, and also when the stable value equals
    /// the one already settled.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self.deadline().is_some_and(|at| now >= at);
        if !due {
            return None;
        }
        let (value, _) = self.pending.take()?;
        if value == self.settled {
            return None;
        }
        self.settled = value.clone();
        Some(value)
    }

    pub fn settled(&self) -> &T {
        &self.settled
    }

    /// Value waiting to settle, if any.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(v, _)| v)
    }

    /// Drop the pending value and ignore all future input.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Overwrite the settled value without emitting.
    ///
    /// Used when the source of truth changed underneath the input (e.g. the
    /// location was replaced by a pasted link).
    pub fn reset(&mut self, value: T) {
        self.pending = None;
        self.settled = value;
    }
}

/// A [`Debounce`] driven by a background tokio task.
///
/// Dropping the handle tears the task down; nothing is emitted afterwards.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    /// Start the task and return the handle plus the settled-value stream.
    pub fn spawn(initial: T, delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_debounce_loop(
            Debounce::new(initial, delay),
            input_rx,
            output_tx,
        ));
        (
            Debouncer {
                input: input_tx,
                task,
            },
            output_rx,
        )
    }

    /// Feed a new input value. Ignored once the task is gone.
    pub fn send(&self, value: T) {
        if self.input.send(value).is_err() {
            tracing::debug!("debouncer input after teardown ignored");
        }
    }

    /// Tear down the task now.
    pub fn cancel(self) {
        // Drop does the work.
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_debounce_loop<T: Clone + PartialEq>(
    mut state: Debounce<T>,
    mut input: mpsc::UnboundedReceiver<T>,
    output: mpsc::UnboundedSender<T>,
) {
    loop {
        let deadline = state.deadline();
        let wake_at = tokio::time::Instant::from_std(deadline.unwrap_or_else(Instant::now));

        tokio::select! {
            received = input.recv() => match received {
                Some(value) => state.input(value, tokio::time::Instant::now().into_std()),
                None => break,
            },
            _ = tokio::time::sleep_until(wake_at), if deadline.is_some() => {
                if let Some(value) = state.poll(tokio::time::Instant::now().into_std()) {
                    if output.send(value).is_err() {
                        break;
                    }
                }
            }
        }
    }
}
