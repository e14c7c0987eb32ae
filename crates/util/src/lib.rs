//! Thin concurrency plumbing: a bounded producer/consumer channel used to
//! move events from a blocking-read thread to a single-threaded consumer
//! loop without hand-rolled signal handling.

use crossbeam_channel::{Receiver, Sender};

/// A bounded channel plus the join handle of whatever thread is feeding it.
/// Dropping the sender side (by ending the producer thread) causes `recv`
/// on the receiver to return `Err` once the channel drains, which callers
/// use as the shutdown signal.
pub struct EventChannel<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T> EventChannel<T> {
    /// Creates a channel with room for `capacity` buffered events before a
    /// sender blocks.
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Self { sender, receiver }
    }

    #[must_use]
    pub fn sender(&self) -> Sender<T> {
        self.sender.clone()
    }

    #[must_use]
    pub fn receiver(&self) -> Receiver<T> {
        self.receiver.clone()
    }
}

impl<T: Send + 'static> EventChannel<T> {
    /// Spawns `produce` on a dedicated OS thread; it should loop, blocking
    /// on whatever I/O it wraps, and push events into `sender` until told
    /// to stop. Returns the join handle so callers can wait for a clean
    /// shutdown.
    pub fn spawn_producer(
        sender: Sender<T>,
        produce: impl FnOnce(Sender<T>) + Send + 'static,
    ) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || produce(sender))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producer_thread_feeds_the_receiver() {
        let channel = EventChannel::<u32>::bounded(8);
        let sender = channel.sender();
        let handle = EventChannel::spawn_producer(sender, |tx| {
            for i in 0..5 {
                if tx.send(i).is_err() {
                    break;
                }
            }
        });

        let received: Vec<u32> = channel.receiver().iter().take(5).collect();
        assert_eq!(received, vec![0, 1, 2, 3, 4]);
        handle.join().unwrap();
    }

    #[test]
    fn receiver_errs_once_all_senders_are_dropped() {
        let channel = EventChannel::<u32>::bounded(1);
        let receiver = channel.receiver();
        drop(channel);
        assert!(receiver.recv().is_err());
    }
}
