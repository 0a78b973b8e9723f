use crate::models::audio_models::Sample;

/// Accumulates variable-size engine chunks and serves fixed-size segments
/// from the front.
///
/// Unlike a circular buffer this never drops samples: capacity grows to fit
/// whatever is appended and is never given back. Consuming a segment
/// compacts the remainder to the front, which is cheap because segments are
/// small (10 ms) and overrun is rare.
#[derive(Debug)]
pub struct SegmentAssembler<S: Sample> {
    buffer: Vec<S>,
    buffered: usize,
    segment_size: usize,
}

impl<S: Sample> SegmentAssembler<S> {
    pub fn new(segment_size: usize) -> Self {
        Self {
            buffer: Vec::new(),
            buffered: 0,
            segment_size,
        }
    }

    pub fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Number of valid samples currently held.
    pub fn buffered(&self) -> usize {
        self.buffered
    }

    /// Physical capacity in samples. Never decreases.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Append `samples` after the buffered ones.
    pub fn append(&mut self, samples: &[S]) {
        let end = self.reserve_tail(samples.len());
        self.buffer[self.buffered..end].copy_from_slice(samples);
        self.buffered = end;
    }

    pub fn has_full_segment(&self) -> bool {
        self.buffered >= self.segment_size
    }

    /// The first segment, if a full one is buffered.
    ///
    /// Valid until the next mutation.
    pub fn take_segment(&self) -> Option<&[S]> {
        self.has_full_segment()
            .then(|| &self.buffer[..self.segment_size])
    }

    /// Mutable view of the first segment, for in-place post-processing.
    pub fn segment_mut(&mut self) -> Option<&mut [S]> {
        if !self.has_full_segment() {
            return None;
        }
        Some(&mut self.buffer[..self.segment_size])
    }

    /// Remove `count` samples from the front, shifting the rest down in order.
    ///
    /// Does nothing if fewer than `count` samples are buffered.
    pub fn consume_front(&mut self, count: usize) {
        if count == 0 || self.buffered < count {
            return;
        }
        self.buffer.copy_within(count..self.buffered, 0);
        self.buffered -= count;
    }

    /// Forget buffered samples, keeping capacity.
    pub fn clear(&mut self) {
        self.buffered = 0;
    }

    fn reserve_tail(&mut self, additional: usize) -> usize {
        let end = self.buffered + additional;
        if end > self.buffer.len() {
            self.buffer.resize(end, S::SILENCE);
        }
        end
    }
}
