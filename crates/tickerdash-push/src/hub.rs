//! Push event fan-out.
//!
//! Every mounted widget gets its own receiver; a listener task runs until
//! the widget's cancellation token fires.

use std::future::Future;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::event::PushEvent;

/// Default channel capacity. Slow listeners past this lag and skip events.
pub const DEFAULT_CAPACITY: usize = 256;

/// Broadcast hub for push events. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PushHub {
    tx: broadcast::Sender<PushEvent>,
}

impl PushHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of receivers; zero is not an error.
    pub fn publish(&self, event: PushEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Run `handler` for every event until `token` is cancelled.
    ///
    /// The receiver is created before this returns, so events published
    /// right after the call are not missed.
    pub fn spawn_listener<F, Fut>(
        &self,
        name: &'static str,
        token: CancellationToken,
        mut handler: F,
    ) -> JoinHandle<()>
    where
        F: FnMut(PushEvent) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        debug!(listener = name, "Push listener cancelled");
                        break;
                    }
                    received = rx.recv() => match received {
                        Ok(event) => handler(event).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(listener = name, skipped, "Push listener lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        })
    }
}

impl Default for PushHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn refresh(topic: &str) -> PushEvent {
        PushEvent::DataRefresh {
            topic: topic.to_string(),
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let hub = PushHub::default();
        assert_eq!(hub.publish(refresh("stocks")), 0);
    }

    #[tokio::test]
    async fn test_listener_receives_until_cancelled() {
        let hub = PushHub::default();
        let token = CancellationToken::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = seen.clone();
        let handle = hub.spawn_listener("test", token.clone(), move |event| {
            let counter = counter.clone();
            async move {
                if event.is_refresh_of("stocks") {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        assert_eq!(hub.subscriber_count(), 1);
        hub.publish(refresh("stocks"));
        hub.publish(refresh("closing"));
        hub.publish(refresh("stocks"));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("listener should stop after cancel")
            .unwrap();
        assert_eq!(hub.subscriber_count(), 0);
    }
}
