//! Lock-free ring buffer tapping processed playback chunks
//!
//! The audio callback offers each processed chunk to the producer end; the
//! UI drains the consumer end on its own timer for the live cine plot. The
//! write is best effort: when the UI falls behind, samples are dropped
//! rather than queued unboundedly.

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

/// SPSC ring carrying processed samples from the callback to the UI.
pub struct ChunkRing;

impl ChunkRing {
    /// Create a ring of `capacity` samples, split into its two ends.
    pub fn new(capacity: usize) -> (ChunkProducer, ChunkConsumer) {
        let rb = HeapRb::<f64>::new(capacity);
        let (producer, consumer) = rb.split();
        (ChunkProducer { producer }, ChunkConsumer { consumer })
    }
}

/// Callback-side end.
pub struct ChunkProducer {
    producer: HeapProducer<f64>,
}

impl ChunkProducer {
    /// Offer samples; returns how many fit. Never blocks.
    pub fn offer(&mut self, samples: &[f64]) -> usize {
        self.producer.push_slice(samples)
    }
}

/// UI-side end.
pub struct ChunkConsumer {
    consumer: HeapConsumer<f64>,
}

impl ChunkConsumer {
    /// Drain up to `out.len()` samples; returns how many were read.
    pub fn drain(&mut self, out: &mut [f64]) -> usize {
        self.consumer.pop_slice(out)
    }

    /// Samples currently buffered.
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}
