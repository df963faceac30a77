//! Simple stateless pub-sub event handler
//!
//! Components of the dispatch service can subscribe to engine events and react to them. The
//! handlers are stateless: all they receive is the event itself, though they may be async.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// The receiving end of one event stream. Each incoming event is handed to the handler on its
/// own task, so a slow reaction does not hold up the stream.
pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, listener) = mpsc::channel(buffer_size);
        Self { listener, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs until every producer has been dropped, then waits for the in-flight handler jobs to
    /// finish before returning.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // The internal sender must go first, otherwise the loop below never sees the channel
        // close.
        drop(self.sender);
        let mut jobs = JoinSet::new();
        while let Some(event) = self.listener.recv().await {
            trace!("📬️ Handling event");
            let handler = Arc::clone(&self.handler);
            jobs.spawn(async move { (handler)(event).await });
        }
        debug!("📬️ Event channel closed. Draining {} handler jobs", jobs.len());
        while let Some(finished) = jobs.join_next().await {
            if let Err(e) = finished {
                warn!("📬️ An event handler job failed: {e}");
            }
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    #[tokio::test]
    async fn every_published_event_reaches_the_handler() {
        let _ = env_logger::try_init();
        let total = Arc::new(AtomicU64::new(0));
        let sink = total.clone();
        let handler = Arc::new(move |v: u64| {
            let sink = sink.clone();
            Box::pin(async move {
                tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
                sink.fetch_add(v, Ordering::SeqCst);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let event_handler = EventHandler::new(4, handler);

        let producer = event_handler.subscribe();
        let publisher = tokio::spawn(async move {
            for v in 1..=10u64 {
                producer.publish_event(v).await;
            }
        });

        // start_handler only returns once the publisher is done and every job has drained.
        event_handler.start_handler().await;
        publisher.await.unwrap();
        assert_eq!(total.load(Ordering::SeqCst), 55);
    }
}
