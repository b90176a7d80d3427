// src/sync/poller.rs — Interval refresh with bus-triggered wakeups
//
// A poller runs one fetch per interval tick, and one extra whenever a
// "tasks changed" event arrives on the bus. Fetches never overlap: the loop
// awaits each one before waiting again, and events that pile up meanwhile
// collapse into a single follow-up refresh. Stopping (or dropping) the
// poller cancels the fetch that is in flight.

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::store::{EventBus, StoreEvent};

/// Produces one refresh result. Called again for every tick.
pub type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<'static, T> + Send + Sync>;

pub struct Poller {
    shutdown_tx: Option<broadcast::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawn the polling loop. Results arrive on the returned receiver;
    /// dropping the receiver also ends the loop.
    ///
    /// The first fetch happens after one full interval, since the caller has
    /// normally just loaded the list itself.
    pub fn start<T: Send + 'static>(
        interval: Duration,
        bus: Option<&EventBus>,
        fetch: FetchFn<T>,
    ) -> (Self, mpsc::Receiver<T>) {
        let (result_tx, result_rx) = mpsc::channel(8);
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let mut bus_rx = bus.map(EventBus::subscribe);
        let period = interval.max(Duration::from_millis(10));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            tracing::debug!("Poller started ({:?} interval)", period);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {}
                    event = next_event(&mut bus_rx) => match event {
                        Ok(StoreEvent::TasksChanged(change)) => {
                            tracing::debug!("Refresh triggered by {:?}", change);
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::debug!("Poller lagged {} bus events", n);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            bus_rx = None;
                            continue;
                        }
                    },
                }

                let result = tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    result = fetch() => result,
                };

                // Anything published while we were fetching is covered by the
                // result we just got, except for changes that landed after
                // the server answered. One more refresh handles those.
                let mut pending = false;
                if let Some(rx) = bus_rx.as_mut() {
                    loop {
                        match rx.try_recv() {
                            Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => pending = true,
                            Err(_) => break,
                        }
                    }
                }

                if result_tx.send(result).await.is_err() {
                    break;
                }

                if pending {
                    ticker.reset_immediately();
                }
            }
            tracing::debug!("Poller stopped");
        });

        (
            Self {
                shutdown_tx: Some(shutdown_tx),
                handle: Some(handle),
            },
            result_rx,
        )
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn next_event(
    rx: &mut Option<broadcast::Receiver<StoreEvent>>,
) -> Result<StoreEvent, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskChange;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_fetch(counter: Arc<AtomicUsize>) -> FetchFn<usize> {
        Arc::new(move || {
            let counter = counter.clone();
            async move { counter.fetch_add(1, Ordering::SeqCst) + 1 }.boxed()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_on_each_tick() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (_poller, mut rx) =
            Poller::start(Duration::from_secs(10), None, counting_fetch(counter.clone()));

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_waits_one_interval() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (_poller, mut rx) =
            Poller::start(Duration::from_secs(10), None, counting_fetch(counter.clone()));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bus_event_triggers_refresh() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let (_poller, mut rx) = Poller::start(
            Duration::from_secs(3600),
            Some(&bus),
            counting_fetch(counter.clone()),
        );

        bus.tasks_changed(TaskChange::Assistant);

        let got = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(got, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_loop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (mut poller, mut rx) =
            Poller::start(Duration::from_secs(1), None, counting_fetch(counter.clone()));
        poller.stop();
        assert!(!poller.is_running());
        assert_eq!(rx.recv().await, None);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_do_not_overlap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let fetch: FetchFn<()> = {
            let in_flight = in_flight.clone();
            let max_seen = max_seen.clone();
            Arc::new(move || {
                let in_flight = in_flight.clone();
                let max_seen = max_seen.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    // Slower than the interval.
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }
                .boxed()
            })
        };

        let (_poller, mut rx) = Poller::start(Duration::from_secs(1), None, fetch);
        for _ in 0..3 {
            rx.recv().await.unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
