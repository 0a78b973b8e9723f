/// Caller-allocated, fixed-capacity output buffer for one engine call.
///
/// Allocated once per session and handed to `produce_chunk` by `&mut`; the
/// engine writes at most `capacity()` bytes and records how many it wrote.
#[derive(Debug, Clone)]
pub struct ChunkBuffer {
    data: Box<[u8]>,
    len: usize,
}

impl ChunkBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bytes written by the last engine call.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Copy `bytes` in, truncating to capacity. Returns the number copied.
    pub fn fill_from(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.data.len());
        self.data[..n].copy_from_slice(&bytes[..n]);
        self.len = n;
        n
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

/// What one `produce_chunk` call yielded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutput {
    /// The buffer holds a chunk.
    ///
    /// `incomplete == true`: more output is ready, call again right away.
    /// `incomplete == false`: drained for now, and the very next call would
    /// block the calling thread, so it must not be issued.
    Ready { incomplete: bool },
    /// Nothing was produced and nothing is pending. Treated as drained.
    NoDataNow,
}

impl ChunkOutput {
    /// Whether the caller must skip its next call into the engine.
    pub fn is_drained(&self) -> bool {
        !matches!(self, Self::Ready { incomplete: true })
    }
}
