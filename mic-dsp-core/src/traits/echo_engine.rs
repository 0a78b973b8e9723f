use crate::models::audio_models::SampleFormat;
use crate::models::chunk::{ChunkBuffer, ChunkOutput};
use crate::models::device::DevicePair;
use crate::models::error::MicDspError;
use crate::models::state::EngineState;

/// Interface for an acoustic-echo-cancellation engine with a non-blocking,
/// ready/not-ready output call.
///
/// Implemented by:
/// - `VoiceCaptureDmo` (Windows)
///
/// Lifecycle: `Uninitialized → Configured → Streaming → Destroyed`, one way.
/// An instance is initialized at most once.
pub trait EchoCancellationEngine: Send {
    /// Output encoding this instance negotiates in `initialize`.
    fn sample_format(&self) -> SampleFormat;

    fn state(&self) -> EngineState;

    /// Configure the engine for `devices` and allocate streaming resources.
    ///
    /// On failure every partially created resource is released, the engine
    /// ends `Destroyed`, and the error names the failed stage.
    fn initialize(&mut self, devices: DevicePair) -> Result<(), MicDspError>;

    /// Produce one chunk into `buffer`.
    ///
    /// When the result is drained (`Ready { incomplete: false }` or
    /// `NoDataNow`) the caller must not call again immediately: that next
    /// call would block the calling thread.
    fn produce_chunk(&mut self, buffer: &mut ChunkBuffer) -> Result<ChunkOutput, MicDspError>;

    /// Release engine resources. Idempotent.
    fn destroy(&mut self);
}

/// Builds a fresh, uninitialized engine for the requested output encoding.
pub type EngineFactory =
    Box<dyn Fn(SampleFormat) -> Box<dyn EchoCancellationEngine> + Send + Sync + 'static>;
