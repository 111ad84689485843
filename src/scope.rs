//! Lifetime binding for screen-scoped work.
//!
//! A front end opens one [`ScreenScope`] per visible screen and runs its store
//! and network calls through it. Closing the scope (or dropping it) stops any
//! pending call from delivering a result to a screen that is gone.

use std::future::Future;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
pub struct ScreenScope {
    token: CancellationToken,
}

impl ScreenScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `fut` until it finishes or the scope closes.
    ///
    /// Returns `None` when the scope closed first; the future is dropped at
    /// its next suspension point.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            output = fut => Some(output),
        }
    }

    /// Spawns `fut` onto the runtime, bound to this scope.
    pub fn spawn<F>(&self, fut: F) -> tokio::task::JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                output = fut => Some(output),
            }
        })
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn run_returns_output_while_open() {
        let scope = ScreenScope::new();
        assert_eq!(scope.run(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn run_returns_none_after_close() {
        let scope = ScreenScope::new();
        scope.close();
        assert!(scope.is_closed());
        assert_eq!(scope.run(async { 7 }).await, None);
    }

    #[tokio::test]
    async fn dropping_scope_cancels_spawned_work() {
        let scope = ScreenScope::new();
        let handle = scope.spawn(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            "late"
        });
        drop(scope);
        assert_eq!(handle.await.unwrap(), None);
    }
}
