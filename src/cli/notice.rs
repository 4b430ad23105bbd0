use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::info;

/// Prints a message if an operation is still running after a delay.
///
/// The notice is cancelled by [`finish`](Self::finish) or by dropping it.
pub struct DeferredNotice {
    done: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DeferredNotice {
    pub fn start(message: impl Into<String>, after: Duration) -> Self {
        let message = message.into();
        Self::start_with(after, move || info!("{}", message))
    }

    pub fn start_with<F>(after: Duration, notify: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (done, rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(after) {
                notify();
            }
        });

        Self {
            done: Some(done),
            handle: Some(handle),
        }
    }

    pub fn finish(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DeferredNotice {
    fn drop(&mut self) {
        self.stop();
    }
}
