use std::sync::Arc;

/// Stateful noise suppressor run once per delivered segment.
///
/// Samples are f32 on the i16 scale ([-32768, 32767]) whatever the
/// session's sample format. State lives as long as the instance; a new
/// session always gets a new instance.
pub trait NoiseSuppressor: Send {
    /// Suppress noise in one segment, in place.
    fn process_segment(&mut self, segment: &mut [f32]);
}

/// Builds a fresh suppressor for a new session, or `None` if one cannot be made.
pub type SuppressorFactory =
    Arc<dyn Fn(i32) -> Option<Box<dyn NoiseSuppressor>> + Send + Sync + 'static>;
