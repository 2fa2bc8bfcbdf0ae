//! Single-producer, single-consumer sample ring.
//!
//! Carries interleaved samples from the capture callback to the playback
//! callback. Slots are `AtomicF32`, so no `unsafe` is needed; the producer
//! publishes with a release store of `tail` and the consumer frees slots with
//! a release store of `head`. Both counters grow monotonically and wrap.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use atomic_float::AtomicF32;

struct Shared {
    slots: Box<[AtomicF32]>,
    /// Total samples consumed
    head: AtomicUsize,
    /// Total samples produced
    tail: AtomicUsize,
}

impl Shared {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head)
    }
}

/// Constructor for a producer/consumer pair.
pub struct SampleRing;

impl SampleRing {
    /// Allocates a ring holding `capacity` samples and splits it.
    ///
    /// This is the only allocation; pushing and popping never allocate.
    pub fn with_capacity(capacity: usize) -> (RingProducer, RingConsumer) {
        let capacity = capacity.max(1);
        let slots = (0..capacity).map(|_| AtomicF32::new(0.0)).collect();
        let shared = Arc::new(Shared {
            slots,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        });
        (
            RingProducer {
                shared: Arc::clone(&shared),
            },
            RingConsumer { shared },
        )
    }
}

/// Writing half of a [`SampleRing`].
pub struct RingProducer {
    shared: Arc<Shared>,
}

impl RingProducer {
    /// Pushes as many samples as fit, returning how many were written.
    pub fn push_slice(&mut self, samples: &[f32]) -> usize {
        let shared = &*self.shared;
        let tail = shared.tail.load(Ordering::Relaxed);
        let head = shared.head.load(Ordering::Acquire);
        let free = shared.capacity() - tail.wrapping_sub(head);
        let count = free.min(samples.len());

        for (offset, &sample) in samples[..count].iter().enumerate() {
            let index = tail.wrapping_add(offset) % shared.capacity();
            shared.slots[index].store(sample, Ordering::Relaxed);
        }
        shared
            .tail
            .store(tail.wrapping_add(count), Ordering::Release);
        count
    }

    /// Samples currently queued.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }
}

/// Reading half of a [`SampleRing`].
pub struct RingConsumer {
    shared: Arc<Shared>,
}

impl RingConsumer {
    /// Pops up to `out.len()` samples into the front of `out`, returning how
    /// many were read. The rest of `out` is left untouched.
    pub fn pop_slice(&mut self, out: &mut [f32]) -> usize {
        let shared = &*self.shared;
        let head = shared.head.load(Ordering::Relaxed);
        let tail = shared.tail.load(Ordering::Acquire);
        let available = tail.wrapping_sub(head);
        let count = available.min(out.len());

        for (offset, slot) in out[..count].iter_mut().enumerate() {
            let index = head.wrapping_add(offset) % shared.capacity();
            *slot = shared.slots[index].load(Ordering::Relaxed);
        }
        shared
            .head
            .store(head.wrapping_add(count), Ordering::Release);
        count
    }

    pub fn len(&self) -> usize {
        self.shared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let (mut tx, mut rx) = SampleRing::with_capacity(8);
        assert_eq!(tx.push_slice(&[1.0, 2.0, 3.0]), 3);
        let mut out = [0.0; 2];
        assert_eq!(rx.pop_slice(&mut out), 2);
        assert_eq!(out, [1.0, 2.0]);
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn test_push_stops_when_full() {
        let (mut tx, mut rx) = SampleRing::with_capacity(4);
        assert_eq!(tx.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), 4);
        assert_eq!(tx.push_slice(&[7.0]), 0);

        let mut out = [0.0; 6];
        assert_eq!(rx.pop_slice(&mut out), 4);
        assert_eq!(&out[..4], &[1.0, 2.0, 3.0, 4.0]);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_pop_leaves_tail_untouched_on_underrun() {
        let (mut tx, mut rx) = SampleRing::with_capacity(4);
        tx.push_slice(&[0.5]);
        let mut out = [9.0; 3];
        assert_eq!(rx.pop_slice(&mut out), 1);
        assert_eq!(out, [0.5, 9.0, 9.0]);
    }

    #[test]
    fn test_wraps_around() {
        let (mut tx, mut rx) = SampleRing::with_capacity(5);
        let mut out = [0.0; 3];
        for round in 0..20 {
            let base = round as f32 * 3.0;
            assert_eq!(tx.push_slice(&[base, base + 1.0, base + 2.0]), 3);
            assert_eq!(rx.pop_slice(&mut out), 3);
            assert_eq!(out, [base, base + 1.0, base + 2.0]);
        }
    }

    #[test]
    fn test_threaded_transfer_preserves_order() {
        let (mut tx, mut rx) = SampleRing::with_capacity(64);
        let total = 10_000usize;

        let producer = thread::spawn(move || {
            let mut next = 0usize;
            while next < total {
                let end = (next + 17).min(total);
                let chunk: Vec<f32> = (next..end).map(|i| i as f32).collect();
                let written = tx.push_slice(&chunk);
                next += written;
                if written == 0 {
                    thread::yield_now();
                }
            }
        });

        let mut received = Vec::with_capacity(total);
        let mut buffer = [0.0f32; 23];
        while received.len() < total {
            let read = rx.pop_slice(&mut buffer);
            received.extend_from_slice(&buffer[..read]);
            if read == 0 {
                thread::yield_now();
            }
        }
        producer.join().unwrap();

        for (i, &sample) in received.iter().enumerate() {
            assert_eq!(sample, i as f32);
        }
    }
}
