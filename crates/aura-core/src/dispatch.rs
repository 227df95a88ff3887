//! Marshalling work onto the UI loop
//!
//! Background tasks hold a [`UiHandle`]. The UI loop owns the matching
//! [`UiQueue`] and runs queued work either by draining it once per frame or by
//! driving [`UiQueue::run`]. `invoke` resolves only after the closure has run
//! on the UI loop.

use tokio::sync::{mpsc, oneshot};

use crate::error::CoreError;
use crate::Result;

type UiTask = Box<dyn FnOnce() + Send>;

/// Create a connected handle/queue pair
pub fn ui_channel() -> (UiHandle, UiQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiHandle { tx }, UiQueue { rx })
}

#[derive(Clone, Debug)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiTask>,
}

impl UiHandle {
    /// Run `f` on the UI loop and wait for its result
    pub async fn invoke<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let task: UiTask = Box::new(move || {
            // The caller may have stopped waiting
            let _ = done_tx.send(f());
        });

        self.tx.send(task).map_err(|_| CoreError::UiLoopClosed)?;
        done_rx.await.map_err(|_| CoreError::UiLoopClosed)
    }

    /// Queue `f` on the UI loop without waiting for it
    pub fn post<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx
            .send(Box::new(f))
            .map_err(|_| CoreError::UiLoopClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug)]
pub struct UiQueue {
    rx: mpsc::UnboundedReceiver<UiTask>,
}

impl UiQueue {
    /// Run everything queued so far without waiting. Returns the number of
    /// tasks run.
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!(tasks = ran, "Drained UI queue");
        }
        ran
    }

    /// Run tasks as they arrive until every handle is dropped
    pub async fn run(mut self) {
        while let Some(task) = self.rx.recv().await {
            task();
        }
        tracing::debug!("UI queue closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_invoke_runs_on_queue() {
        let (handle, queue) = ui_channel();
        let ui = tokio::spawn(queue.run());

        let value = handle.invoke(|| 21 * 2).await.unwrap();
        assert_eq!(value, 42);

        drop(handle);
        ui.await.unwrap();
    }

    #[tokio::test]
    async fn test_invoke_fails_without_ui_loop() {
        let (handle, queue) = ui_channel();
        drop(queue);

        assert!(handle.is_closed());
        assert!(matches!(
            handle.invoke(|| ()).await,
            Err(CoreError::UiLoopClosed)
        ));
    }

    #[test]
    fn test_post_runs_on_next_drain() {
        let (handle, mut queue) = ui_channel();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        handle
            .post(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        assert_eq!(queue.drain(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        drop(queue);
        assert!(matches!(handle.post(|| ()), Err(CoreError::UiLoopClosed)));
    }

    #[tokio::test]
    async fn test_drain_runs_pending_tasks() {
        let (handle, mut queue) = ui_channel();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let background = tokio::spawn(async move {
            handle
                .invoke(move || counter.fetch_add(1, Ordering::SeqCst))
                .await
        });

        // Let the background task enqueue its work
        while hits.load(Ordering::SeqCst) == 0 {
            if queue.drain() == 0 {
                tokio::task::yield_now().await;
            }
        }

        assert_eq!(background.await.unwrap().unwrap(), 0);
        assert_eq!(queue.drain(), 0);
    }
}
