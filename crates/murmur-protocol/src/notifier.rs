//! Event notifier for accepted signals.
//!
//! One long-lived subscription per feed. The background task decodes each
//! notification and hands the text to the handler; the handle owns the
//! task, and dropping or unsubscribing it releases the external connection.
//! Reconnecting after a transient failure is the feed's concern;
//! deduplicating re-delivered notifications is the handler's.

use async_trait::async_trait;
use murmur_types::{MurmurResult, NewSignal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Stream of accepted-signal notifications from the external verifier.
#[async_trait]
pub trait SignalFeed: Send + 'static {
    /// Next notification; `None` once the stream has ended for good.
    async fn next_signal(&mut self) -> MurmurResult<Option<NewSignal>>;
}

/// Feed over an in-process channel, for tests and local wiring.
pub struct ChannelSignalFeed {
    receiver: mpsc::Receiver<NewSignal>,
}

impl ChannelSignalFeed {
    /// Wrap an existing receiver.
    pub fn new(receiver: mpsc::Receiver<NewSignal>) -> Self {
        Self { receiver }
    }

    /// Create a connected sender/feed pair.
    pub fn channel(capacity: usize) -> (mpsc::Sender<NewSignal>, Self) {
        let (sender, receiver) = mpsc::channel(capacity);
        (sender, Self { receiver })
    }
}

#[async_trait]
impl SignalFeed for ChannelSignalFeed {
    async fn next_signal(&mut self) -> MurmurResult<Option<NewSignal>> {
        Ok(self.receiver.recv().await)
    }
}

/// Callback invoked with the decoded text of each accepted signal.
pub type SignalHandler = Box<dyn Fn(String) + Send + Sync>;

/// Subscribes handlers to a signal feed.
pub struct EventNotifier;

impl EventNotifier {
    /// Start the subscription task. It runs until the feed ends or the
    /// handle is dropped or unsubscribed.
    pub fn subscribe<F>(mut feed: F, handler: SignalHandler) -> SubscriptionHandle
    where
        F: SignalFeed,
    {
        let task = tokio::spawn(async move {
            loop {
                match feed.next_signal().await {
                    Ok(Some(event)) => {
                        debug!("accepted-signal notification received");
                        handler(event.decoded_text());
                    }
                    Ok(None) => {
                        info!("signal feed closed");
                        break;
                    }
                    Err(e) => {
                        // The feed reconnects internally; keep listening.
                        warn!("signal feed error: {}", e);
                    }
                }
            }
        });

        SubscriptionHandle { task }
    }
}

/// Owns the background subscription task.
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Stop the subscription and release the external connection.
    pub fn unsubscribe(self) {
        self.task.abort();
    }

    /// True while the subscription task is still running.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    async fn drain(received: &Arc<Mutex<Vec<String>>>, expected: usize) {
        for _ in 0..100 {
            if received.lock().unwrap().len() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {} notifications", expected);
    }

    #[tokio::test]
    async fn delivers_decoded_signals() {
        let (sender, feed) = ChannelSignalFeed::channel(8);
        let received = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&received);
        let _handle = EventNotifier::subscribe(
            feed,
            Box::new(move |text| sink.lock().unwrap().push(text)),
        );

        let mut padded = b"Hello world!!!".to_vec();
        padded.resize(32, 0);
        sender.send(NewSignal { signal: padded }).await.unwrap();

        drain(&received, 1).await;
        assert_eq!(received.lock().unwrap()[0], "Hello world!!!");
    }

    #[tokio::test]
    async fn closing_the_feed_ends_the_task() {
        let (sender, feed) = ChannelSignalFeed::channel(8);
        let handle = EventNotifier::subscribe(feed, Box::new(|_| {}));

        assert!(handle.is_active());
        drop(sender);

        for _ in 0..100 {
            if !handle.is_active() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("subscription task did not end");
    }

    #[tokio::test]
    async fn unsubscribe_releases_the_subscription() {
        let (sender, feed) = ChannelSignalFeed::channel(8);
        let received = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&received);
        let handle = EventNotifier::subscribe(
            feed,
            Box::new(move |text| sink.lock().unwrap().push(text)),
        );

        handle.unsubscribe();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Sends after unsubscription are never delivered.
        let _ = sender.send(NewSignal { signal: b"late".to_vec() }).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(received.lock().unwrap().is_empty());
    }
}
