use std::time::Duration;

use tokio::select;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;

/// Coalesces a rapidly-changing value into one emission per quiet period:
/// `feed` on every edit, and `settled` yields the last fed value once no edit
/// has arrived for `delay`. Nothing is ever emitted mid-burst, and dropping
/// the debouncer cancels any pending emission.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    output: mpsc::UnboundedReceiver<T>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        let (input, in_rx) = mpsc::unbounded_channel();
        let (out_tx, output) = mpsc::unbounded_channel();
        let worker = spawn_worker(delay, in_rx, out_tx);
        Self {
            input,
            output,
            worker,
        }
    }

    /// Record a new value and restart the quiet window.
    pub fn feed(&self, value: T) {
        let _ = self.input.send(value);
    }

    /// Extra feed handle, for feeding from a task that does not own the
    /// debouncer.
    #[must_use]
    pub fn feeder(&self) -> mpsc::UnboundedSender<T> {
        self.input.clone()
    }

    /// Wait for the next settled value. `None` only after teardown.
    pub async fn settled(&mut self) -> Option<T> {
        self.output.recv().await
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

fn spawn_worker<T: Send + 'static>(
    delay: Duration,
    mut input: mpsc::UnboundedReceiver<T>,
    output: mpsc::UnboundedSender<T>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(mut pending) = input.recv().await {
            loop {
                select! {
                    next = input.recv() => match next {
                        // Another edit: the window restarts with the new value.
                        Some(value) => pending = value,
                        // Teardown with an edit still pending: emit nothing.
                        None => return,
                    },
                    () = time::sleep(delay) => {
                        let _ = output.send(pending);
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(750);

    #[tokio::test(start_paused = true)]
    async fn emits_last_value_of_a_burst() {
        let mut deb = Debouncer::new(DELAY);
        let start = time::Instant::now();
        deb.feed("rojba");
        time::sleep(Duration::from_millis(100)).await;
        deb.feed("rojbaş");
        let settled = deb.settled().await;
        assert_eq!(settled, Some("rojbaş"));
        assert!(start.elapsed() >= Duration::from_millis(100) + DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn never_emits_before_the_quiet_period() {
        let mut deb = Debouncer::new(DELAY);
        deb.feed("x");
        let early = time::timeout(Duration::from_millis(749), deb.settled()).await;
        assert!(early.is_err(), "emitted before the delay elapsed");
        assert_eq!(deb.settled().await, Some("x"));
    }

    #[tokio::test(start_paused = true)]
    async fn each_edit_restarts_the_window() {
        let mut deb = Debouncer::new(DELAY);
        let start = time::Instant::now();
        deb.feed("a");
        time::sleep(Duration::from_millis(500)).await;
        deb.feed("ab");
        let settled = deb.settled().await;
        assert_eq!(settled, Some("ab"));
        assert!(start.elapsed() >= Duration::from_millis(500) + DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_bursts_each_settle() {
        let mut deb = Debouncer::new(DELAY);
        deb.feed(1);
        assert_eq!(deb.settled().await, Some(1));
        deb.feed(2);
        deb.feed(3);
        assert_eq!(deb.settled().await, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_cancels_the_pending_emission() {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let worker = spawn_worker(DELAY, in_rx, out_tx);

        in_tx.send("pending").unwrap();
        time::sleep(Duration::from_millis(300)).await;
        drop(in_tx);

        assert_eq!(out_rx.recv().await, None);
        worker.await.unwrap();
    }
}
