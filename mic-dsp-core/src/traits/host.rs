use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::{AudioFormat, AudioSegment, SampleSlice};

/// Host services read from the audio thread.
///
/// Clocks are monotonic stream clocks supplied by the host, never wall time.
pub trait HostServices: Send + Sync {
    /// Current microphone volume (0.0–1.0, may exceed 1.0).
    fn mic_volume(&self) -> f32;

    /// Milliseconds since the stream started. Drives the push-to-talk deadline.
    fn stream_time_ms(&self) -> u64;

    /// Host audio clock used to timestamp delivered segments.
    fn audio_time(&self) -> u64;
}

/// One segment handed to the host by `AudioSource::next_buffer`.
///
/// Borrowed from the source; valid until the matching `release_buffer`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBuffer<'a> {
    pub samples: SampleSlice<'a>,
    pub frames: usize,
    pub timestamp: u64,
}

/// Pull-based audio source capability registered with the host.
///
/// The host's audio thread calls `next_buffer` until it returns `None`,
/// and calls `release_buffer` exactly once after every `Some`.
pub trait AudioSource: Send {
    fn name(&self) -> &str;

    fn format(&self) -> AudioFormat;

    /// Next full segment, or `None` if none is available without blocking.
    fn next_buffer(&mut self) -> Option<SegmentBuffer<'_>>;

    /// Drop the segment returned by the last `next_buffer`.
    fn release_buffer(&mut self);
}

/// Filter capability attached to the host's own microphone source.
pub trait AudioFilter: Send {
    /// Consume `segment`; return what should continue down the host's chain.
    fn process(&mut self, segment: AudioSegment) -> Option<AudioSegment>;
}

pub type SharedAudioSource = Arc<Mutex<dyn AudioSource>>;

/// Invoked by the host on hotkey transitions; the argument is `key_down`.
pub type HotkeyCallback = Arc<dyn Fn(bool) + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotkeyId(pub u64);

/// Registration services used when a stream starts and stops.
pub trait HostIntegration: HostServices {
    /// Whether the host has a microphone source at all.
    fn mic_capture_enabled(&self) -> bool;

    fn has_audio_source(&self, name: &str) -> bool;

    fn add_mic_filter(&self, filter: Box<dyn AudioFilter>) -> FilterId;

    fn remove_mic_filter(&self, id: FilterId);

    fn add_audio_source(&self, source: SharedAudioSource) -> SourceId;

    fn remove_audio_source(&self, id: SourceId);

    /// Returns `None` if the host refused the registration.
    fn register_hotkey(&self, code: u32, callback: HotkeyCallback) -> Option<HotkeyId>;

    fn unregister_hotkey(&self, id: HotkeyId);
}
