use crate::domain::ContainerRecord;
use crate::services::ContainerManager;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

const STOP_POLL: Duration = Duration::from_millis(50);

/// Keeps a worker thread listing containers on a fixed interval.
///
/// Each refresh sends a complete snapshot through the channel returned by
/// [`Refresher::spawn`]; the receiving side replaces its view wholesale. The
/// worker exits when stopped or when the receiver is dropped.
pub struct Refresher {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Refresher {
    pub fn spawn(
        manager: Arc<ContainerManager>,
        interval: Duration,
    ) -> (Self, Receiver<Vec<ContainerRecord>>) {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let worker = thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                if tx.send(manager.list()).is_err() {
                    debug!("refresh receiver dropped, stopping");
                    break;
                }

                let deadline = Instant::now() + interval;
                while !stop_flag.load(Ordering::Relaxed) {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    thread::sleep(STOP_POLL.min(deadline - now));
                }
            }
        });

        (
            Self {
                stop,
                worker: Some(worker),
            },
            rx,
        )
    }

    /// Stops the worker and waits for its current refresh to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
