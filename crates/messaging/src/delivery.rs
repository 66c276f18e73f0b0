//! Inbound message delivery with manual acknowledgment.

use tokio::sync::mpsc;

/// One inbound message plus its acknowledgment handle.
///
/// A handler must settle the delivery with exactly one of [`ack`](Self::ack)
/// or [`nack`](Self::nack) before returning. `ack` commits consumption;
/// `nack` returns the message to the queue for redelivery. A delivery that is
/// dropped unsettled (the handler crashed before reaching its ack step) is
/// requeued, which is what makes processing at-least-once.
#[derive(Debug)]
pub struct Delivery<E: Clone + Send + 'static> {
    event: E,
    attempt: u32,
    requeue: Option<mpsc::UnboundedSender<(E, u32)>>,
}

impl<E: Clone + Send + 'static> Delivery<E> {
    /// Creates a delivery backed by the given requeue channel.
    ///
    /// Used by bus implementations; tests can pair this with
    /// [`EventConsumer::channel`] to observe redelivery.
    pub fn new(event: E, attempt: u32, requeue: mpsc::UnboundedSender<(E, u32)>) -> Self {
        Self {
            event,
            attempt,
            requeue: Some(requeue),
        }
    }

    /// Returns the delivered message.
    pub fn event(&self) -> &E {
        &self.event
    }

    /// Returns the delivery attempt, starting at 1.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Acknowledges the message, removing it from the queue.
    pub fn ack(mut self) {
        self.requeue = None;
    }

    /// Negatively acknowledges the message, requeueing it for redelivery.
    pub fn nack(mut self) {
        self.push_back();
    }

    fn push_back(&mut self) {
        if let Some(requeue) = self.requeue.take() {
            // Send only fails when the consumer side is gone entirely.
            let _ = requeue.send((self.event.clone(), self.attempt + 1));
        }
    }
}

impl<E: Clone + Send + 'static> Drop for Delivery<E> {
    fn drop(&mut self) {
        if self.requeue.is_some() {
            tracing::warn!(attempt = self.attempt, "delivery dropped unsettled, requeueing");
            self.push_back();
        }
    }
}

/// Consuming side of a fire-and-forget channel.
///
/// Each received message is wrapped in a [`Delivery`] whose nack path feeds
/// back into this same queue.
#[derive(Debug)]
pub struct EventConsumer<E: Clone + Send + 'static> {
    rx: mpsc::UnboundedReceiver<(E, u32)>,
    requeue: mpsc::UnboundedSender<(E, u32)>,
}

impl<E: Clone + Send + 'static> EventConsumer<E> {
    /// Creates a queue and its consumer. The returned sender is the publish
    /// side; redeliveries share the same queue.
    pub fn channel() -> (mpsc::UnboundedSender<(E, u32)>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let consumer = Self {
            rx,
            requeue: tx.clone(),
        };
        (tx, consumer)
    }

    /// Receives the next delivery, or `None` once the channel is closed.
    pub async fn recv(&mut self) -> Option<Delivery<E>> {
        let (event, attempt) = self.rx.recv().await?;
        Some(Delivery::new(event, attempt, self.requeue.clone()))
    }

    /// Non-blocking receive, for draining queues in tests.
    pub fn try_recv(&mut self) -> Option<Delivery<E>> {
        let (event, attempt) = self.rx.try_recv().ok()?;
        Some(Delivery::new(event, attempt, self.requeue.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ack_consumes_the_message() {
        let (tx, mut consumer) = EventConsumer::<u32>::channel();
        tx.send((7, 1)).unwrap();

        let delivery = consumer.recv().await.unwrap();
        assert_eq!(*delivery.event(), 7);
        assert_eq!(delivery.attempt(), 1);
        delivery.ack();

        assert!(consumer.try_recv().is_none());
    }

    #[tokio::test]
    async fn nack_requeues_with_incremented_attempt() {
        let (tx, mut consumer) = EventConsumer::<u32>::channel();
        tx.send((7, 1)).unwrap();

        consumer.recv().await.unwrap().nack();

        let redelivered = consumer.recv().await.unwrap();
        assert_eq!(*redelivered.event(), 7);
        assert_eq!(redelivered.attempt(), 2);
        redelivered.ack();
    }

    #[tokio::test]
    async fn dropped_delivery_is_requeued() {
        let (tx, mut consumer) = EventConsumer::<u32>::channel();
        tx.send((7, 1)).unwrap();

        {
            let _delivery = consumer.recv().await.unwrap();
            // Simulated crash: neither ack nor nack.
        }

        let redelivered = consumer.recv().await.unwrap();
        assert_eq!(redelivered.attempt(), 2);
        redelivered.ack();
    }
}
