use std::fmt::Display;
use std::future::Future;

use futures::{Stream, StreamExt};
use log::error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A live query handle: full result snapshots arrive on every change of the
/// underlying data, starting with the current state.
///
/// The subscription owns the producer task. Consumers must call [`cancel`]
/// (or drop the handle) on teardown; dropping aborts the producer so no live
/// connection outlives its consumer.
///
/// [`cancel`]: Subscription::cancel
pub struct Subscription<T> {
    rx: mpsc::Receiver<Vec<T>>,
    producer: JoinHandle<()>,
}

impl<T> Subscription<T> {
    pub fn new(rx: mpsc::Receiver<Vec<T>>, producer: JoinHandle<()>) -> Self {
        Self { rx, producer }
    }

    /// Awaits the next full snapshot. Returns `None` once the subscription is
    /// cancelled or the producer stops.
    pub async fn next(&mut self) -> Option<Vec<T>> {
        self.rx.recv().await
    }

    pub fn cancel(&self) {
        self.producer.abort();
    }

    /// Spawns the producer loop shared by every live query: one snapshot up
    /// front, then a fresh one per change notification. A fetch or change
    /// source failure ends the subscription.
    pub fn run<F, Fut, E, C, CE>(fetch: F, changes: C) -> Self
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<Vec<T>, E>> + Send + 'static,
        E: Display + Send + 'static,
        C: Stream<Item = std::result::Result<(), CE>> + Send + 'static,
        CE: Display + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(8);

        let producer = tokio::spawn(async move {
            let mut changes = Box::pin(changes);

            loop {
                let snapshot = match fetch().await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        error!("failed to refresh live snapshot: {e}");
                        break;
                    }
                };

                if tx.send(snapshot).await.is_err() {
                    break;
                }

                match changes.next().await {
                    Some(Ok(())) => continue,
                    Some(Err(e)) => {
                        error!("live change stream failed: {e}");
                        break;
                    }
                    None => break,
                }
            }
        });

        Self { rx, producer }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.producer.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use futures::future::BoxFuture;
    use futures::{stream, FutureExt};

    use super::*;

    type Fetched = std::result::Result<Vec<usize>, String>;

    fn counting_fetch(
        counter: Arc<AtomicUsize>,
    ) -> impl Fn() -> BoxFuture<'static, Fetched> + Send + 'static {
        move || {
            let counter = counter.clone();
            async move { Ok(vec![counter.fetch_add(1, Ordering::SeqCst)]) }.boxed()
        }
    }

    #[tokio::test]
    async fn refreshes_the_snapshot_on_every_change() {
        let counter = Arc::new(AtomicUsize::new(0));
        let changes = stream::iter(vec![Ok::<(), String>(()), Ok(())]);

        let mut subscription = Subscription::run(counting_fetch(counter), changes);

        // initial state, then one re-query per change notification
        assert_eq!(subscription.next().await, Some(vec![0]));
        assert_eq!(subscription.next().await, Some(vec![1]));
        assert_eq!(subscription.next().await, Some(vec![2]));
        assert_eq!(subscription.next().await, None);
    }

    #[tokio::test]
    async fn change_source_failure_ends_the_subscription() {
        let counter = Arc::new(AtomicUsize::new(0));
        let changes = stream::iter(vec![Err("stream reset".to_owned())]);

        let mut subscription = Subscription::run(counting_fetch(counter.clone()), changes);

        assert_eq!(subscription.next().await, Some(vec![0]));
        assert_eq!(subscription.next().await, None);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn delivers_snapshots_in_order() {
        let (tx, rx) = mpsc::channel(4);
        let producer = tokio::spawn(async move {
            tx.send(vec![1]).await.unwrap();
            tx.send(vec![1, 2]).await.unwrap();
        });
        let mut subscription = Subscription::new(rx, producer);

        assert_eq!(subscription.next().await, Some(vec![1]));
        assert_eq!(subscription.next().await, Some(vec![1, 2]));
        assert_eq!(subscription.next().await, None);
    }

    #[tokio::test]
    async fn cancel_stops_the_producer() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(1);
        let producer = tokio::spawn(async move {
            loop {
                if tx.send(vec![0]).await.is_err() {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        });
        let mut subscription = Subscription::new(rx, producer);

        assert!(subscription.next().await.is_some());
        subscription.cancel();

        // the channel drains, then closes
        while subscription.next().await.is_some() {}
    }
}
