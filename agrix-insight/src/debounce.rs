//! Input debouncing
//!
//! Coalesces bursts of values (search keystrokes) into the last value of the
//! burst, delivered once no new value arrived for the settling window.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    handle: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Start the debouncer; settled values arrive on the returned receiver
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, mut input) = mpsc::unbounded_channel::<T>();
        let (out_tx, out_rx) = mpsc::unbounded_channel::<T>();

        let handle = tokio::spawn(async move {
            while let Some(mut pending) = input.recv().await {
                loop {
                    tokio::select! {
                        next = input.recv() => match next {
                            Some(value) => pending = value,
                            None => {
                                // Sender dropped: flush and stop
                                let _ = out_tx.send(pending);
                                return;
                            }
                        },
                        _ = tokio::time::sleep(window) => {
                            if out_tx.send(pending).is_err() {
                                return;
                            }
                            break;
                        }
                    }
                }
            }
        });

        (Self { tx, handle }, out_rx)
    }

    /// Submit a value, restarting the settling window
    pub fn push(&self, value: T) {
        let _ = self.tx.send(value);
    }

    /// Flush the pending value and wait for the task to finish
    pub async fn finish(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Debounce task failed");
        }
    }
}
